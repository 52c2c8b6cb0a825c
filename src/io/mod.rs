pub mod compression;
pub mod driver;

pub use compression::{open_report, Compression};
pub use driver::{FileProgress, FileSetDriver, OpenFailurePolicy};
