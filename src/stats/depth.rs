use std::io::Write;

use itertools::Itertools;

use super::registry::{ContextCapacityError, ContextRegistry};
use super::Accumulator;
use crate::data_structs::record::MethylationRecord;
use crate::data_structs::typedef::Tally;

/// Saturating read-depth cap; anything deeper lands in this bucket.
pub const MAX_DEPTH: usize = 200;

/// Per-context histogram over clamped read depths.
///
/// Buckets cover depths `1..=MAX_DEPTH`; index 0 stays unused because
/// zero-depth records are discarded before they reach a bucket.
#[derive(Debug, Clone, Default)]
pub struct DepthHistogram {
    registry: ContextRegistry,
    counts: Vec<Box<[Tally; MAX_DEPTH + 1]>>,
}

impl DepthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(contexts: usize) -> Self {
        Self {
            registry: ContextRegistry::new(contexts),
            counts: Vec::with_capacity(contexts),
        }
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    /// Count at a (context label, depth) bucket, if the context exists.
    pub fn count(
        &self,
        label: &str,
        depth: usize,
    ) -> Option<Tally> {
        let slot = self.registry.get(label)?;
        self.counts[slot].get(depth).copied()
    }

    fn slot_counts(
        &mut self,
        label: &str,
    ) -> Result<&mut [Tally; MAX_DEPTH + 1], ContextCapacityError> {
        let slot = self.registry.resolve(label)?;
        if slot == self.counts.len() {
            self.counts.push(Box::new([0; MAX_DEPTH + 1]));
        }
        Ok(&mut self.counts[slot])
    }
}

impl Accumulator for DepthHistogram {
    fn absorb(
        &mut self,
        record: &MethylationRecord<'_>,
    ) -> Result<(), ContextCapacityError> {
        let depth = record.total_reads() as usize;
        if depth == 0 {
            return Ok(());
        }
        let counts = self.slot_counts(record.context)?;
        counts[depth.min(MAX_DEPTH)] += 1;
        Ok(())
    }

    fn merge(
        &mut self,
        other: &Self,
    ) -> Result<(), ContextCapacityError> {
        for (label, other_counts) in other.registry.labels().zip(other.counts.iter()) {
            let counts = self.slot_counts(label)?;
            for (count, other_count) in counts.iter_mut().zip(other_counts.iter()) {
                *count += other_count;
            }
        }
        Ok(())
    }

    /// Dense table: one row per depth value, one count column per context,
    /// columns in first-seen order.
    fn write_tsv<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()> {
        let mut table = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        let header = std::iter::once("Depth")
            .chain(self.registry.labels())
            .collect_vec();
        table.write_record(&header)?;

        for depth in 1..=MAX_DEPTH {
            let row = std::iter::once(depth.to_string())
                .chain(self.counts.iter().map(|counts| counts[depth].to_string()))
                .collect_vec();
            table.write_record(&row)?;
        }
        table.flush()?;
        Ok(())
    }
}
