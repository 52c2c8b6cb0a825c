/// Genomic coordinate.
pub type PosType = u32;
/// Per-site read count as it appears in a report column.
pub type ReadCount = u32;
/// Accumulated tally, large enough for whole-genome runs.
pub type Tally = u64;
