pub mod coverage;
pub mod depth;
pub mod distribution;
pub mod registry;

use std::io::Write;

pub use coverage::CoverageTable;
pub use depth::DepthHistogram;
pub use distribution::LevelHistogram;
pub use registry::{ContextCapacityError, ContextRegistry};

use crate::data_structs::record::MethylationRecord;

/// A bounded reduction over parsed methylation records.
///
/// `absorb` is a pure element-wise update over independent buckets, so any
/// partition of the input may be reduced into private instances and folded
/// back together with `merge` without changing the rendered output.
pub trait Accumulator {
    /// Folds one record into the summary tables.
    ///
    /// An `Err` means the bounded context registry is full; the caller must
    /// stop feeding the current input source but keep everything accumulated
    /// so far.
    fn absorb(
        &mut self,
        record: &MethylationRecord<'_>,
    ) -> Result<(), ContextCapacityError>;

    /// Element-wise addition of another instance, unifying contexts by label
    /// so slot order stays first-seen across the merged stream.
    fn merge(
        &mut self,
        other: &Self,
    ) -> Result<(), ContextCapacityError>;

    /// Serializes the accumulated state as a tab-delimited table.
    fn write_tsv<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()>;
}
