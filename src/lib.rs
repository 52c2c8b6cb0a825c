//! Streaming reduction of per-cytosine methylation call reports into small,
//! bounded summary tables: a methylation-level histogram, a read-depth
//! histogram and a per-chromosome coverage table, each broken down by
//! sequence context.

pub mod data_structs;
pub mod io;
pub mod stats;

pub use data_structs::record::MethylationRecord;
pub use io::driver::{FileProgress, FileSetDriver, OpenFailurePolicy};
pub use stats::{Accumulator, CoverageTable, DepthHistogram, LevelHistogram};
