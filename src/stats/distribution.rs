use std::io::Write;

use serde::Serialize;

use super::registry::{ContextCapacityError, ContextRegistry};
use super::Accumulator;
use crate::data_structs::record::MethylationRecord;
use crate::data_structs::typedef::Tally;

/// Number of methylation-level buckets (0..=100 percent, inclusive).
pub const LEVEL_BINS: usize = 101;

/// Counters for one methylation-level bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LevelBucket {
    pub count: Tally,
    pub sum_m: Tally,
    pub sum_total: Tally,
}

/// Per-context histogram over rounded methylation percentages.
///
/// One zeroed 101-entry bucket array is allocated per context slot when the
/// registry first sees its label; buckets live until the run ends.
#[derive(Debug, Clone, Default)]
pub struct LevelHistogram {
    registry: ContextRegistry,
    bins: Vec<Box<[LevelBucket; LEVEL_BINS]>>,
}

#[derive(Serialize)]
struct LevelRow<'a> {
    context: &'a str,
    methylation_level: u8,
    count: Tally,
    #[serde(rename = "readsM")]
    reads_m: Tally,
    #[serde(rename = "readsN")]
    reads_n: Tally,
}

impl LevelHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(contexts: usize) -> Self {
        Self {
            registry: ContextRegistry::new(contexts),
            bins: Vec::with_capacity(contexts),
        }
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    /// Bucket for a (context label, level) pair, if both exist.
    pub fn bucket(
        &self,
        label: &str,
        level: u8,
    ) -> Option<&LevelBucket> {
        let slot = self.registry.get(label)?;
        self.bins[slot].get(level as usize)
    }

    fn slot_bins(
        &mut self,
        label: &str,
    ) -> Result<&mut [LevelBucket; LEVEL_BINS], ContextCapacityError> {
        let slot = self.registry.resolve(label)?;
        if slot == self.bins.len() {
            self.bins.push(Box::new([LevelBucket::default(); LEVEL_BINS]));
        }
        Ok(&mut self.bins[slot])
    }
}

impl Accumulator for LevelHistogram {
    fn absorb(
        &mut self,
        record: &MethylationRecord<'_>,
    ) -> Result<(), ContextCapacityError> {
        let total = record.total_reads();
        if total == 0 {
            return Ok(());
        }
        // The context slot is allocated before the level range check, so a
        // discarded out-of-range level still registers its label.
        let bins = self.slot_bins(record.context)?;
        if let Some(level) = record.level_percent() {
            let bucket = &mut bins[level as usize];
            bucket.count += 1;
            bucket.sum_m += record.count_m as Tally;
            bucket.sum_total += total;
        }
        Ok(())
    }

    fn merge(
        &mut self,
        other: &Self,
    ) -> Result<(), ContextCapacityError> {
        for (label, other_bins) in other.registry.labels().zip(other.bins.iter()) {
            let bins = self.slot_bins(label)?;
            for (bucket, other_bucket) in bins.iter_mut().zip(other_bins.iter()) {
                bucket.count += other_bucket.count;
                bucket.sum_m += other_bucket.sum_m;
                bucket.sum_total += other_bucket.sum_total;
            }
        }
        Ok(())
    }

    fn write_tsv<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()> {
        let mut table = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);
        // Written explicitly so an empty run still yields a header-only
        // table.
        table.write_record(["context", "methylation_level", "count", "readsM", "readsN"])?;
        for (label, bins) in self.registry.labels().zip(self.bins.iter()) {
            for (level, bucket) in bins.iter().enumerate() {
                if bucket.count == 0 {
                    continue;
                }
                table.serialize(LevelRow {
                    context: label,
                    methylation_level: level as u8,
                    count: bucket.count,
                    reads_m: bucket.sum_m,
                    reads_n: bucket.sum_total,
                })?;
            }
        }
        table.flush()?;
        Ok(())
    }
}
