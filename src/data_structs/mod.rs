pub mod enums;
pub mod record;
pub mod typedef;

pub use enums::{Context, Strand};
pub use record::MethylationRecord;
