use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;

use super::registry::ContextCapacityError;
use super::Accumulator;
use crate::data_structs::enums::Context;
use crate::data_structs::record::MethylationRecord;
use crate::data_structs::typedef::Tally;

/// Per-context tallies for one chromosome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContextTally {
    pub count: Tally,
    pub covered: Tally,
    pub sum_m: Tally,
    pub sum_total: Tally,
}

/// Chromosome-by-context coverage table.
///
/// Chromosome entries are created on first sight with all three context
/// tallies zeroed and never removed. Iteration order is first-seen, which
/// keeps the rendered table stable across identical runs.
#[derive(Debug, Clone, Default)]
pub struct CoverageTable {
    chroms: IndexMap<String, [ContextTally; 3]>,
}

#[derive(Serialize)]
struct CoverageRow<'a> {
    #[serde(rename = "Chromosome")]
    chromosome: &'a str,
    #[serde(rename = "Context")]
    context: &'static str,
    #[serde(rename = "Count")]
    count: Tally,
    covered: Tally,
    #[serde(rename = "totalReadsM")]
    total_reads_m: Tally,
    #[serde(rename = "totalReadsN")]
    total_reads_n: Tally,
}

impl CoverageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct chromosomes seen so far.
    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    /// Tally for one (chromosome, context) cell, if the chromosome exists.
    pub fn tally(
        &self,
        chr: &str,
        context: Context,
    ) -> Option<&ContextTally> {
        self.chroms.get(chr).map(|tallies| &tallies[context as usize])
    }
}

impl Accumulator for CoverageTable {
    fn absorb(
        &mut self,
        record: &MethylationRecord<'_>,
    ) -> Result<(), ContextCapacityError> {
        // Unknown context labels are discarded before any chromosome entry
        // is created.
        let Some(context) = Context::from_label(record.context) else {
            return Ok(());
        };

        // Index lookup first so the hot path never allocates a key.
        let tallies = match self.chroms.get_index_of(record.chr) {
            Some(index) => &mut self.chroms[index],
            None => self.chroms.entry(record.chr.to_string()).or_default(),
        };

        let total = record.total_reads();
        let tally = &mut tallies[context as usize];
        tally.count += 1;
        tally.sum_m += record.count_m as Tally;
        tally.sum_total += total;
        if total >= 1 {
            tally.covered += 1;
        }
        Ok(())
    }

    fn merge(
        &mut self,
        other: &Self,
    ) -> Result<(), ContextCapacityError> {
        for (chr, other_tallies) in other.chroms.iter() {
            let tallies = self.chroms.entry(chr.clone()).or_default();
            for (tally, other_tally) in tallies.iter_mut().zip(other_tallies.iter()) {
                tally.count += other_tally.count;
                tally.covered += other_tally.covered;
                tally.sum_m += other_tally.sum_m;
                tally.sum_total += other_tally.sum_total;
            }
        }
        Ok(())
    }

    /// Three rows per chromosome in fixed CG, CHG, CHH order, zero rows
    /// included.
    fn write_tsv<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()> {
        let mut table = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);
        table.write_record([
            "Chromosome",
            "Context",
            "Count",
            "covered",
            "totalReadsM",
            "totalReadsN",
        ])?;
        for (chr, tallies) in self.chroms.iter() {
            for context in Context::ALL {
                let tally = &tallies[context as usize];
                table.serialize(CoverageRow {
                    chromosome: chr,
                    context: context.as_str(),
                    count: tally.count,
                    covered: tally.covered,
                    total_reads_m: tally.sum_m,
                    total_reads_n: tally.sum_total,
                })?;
            }
        }
        table.flush()?;
        Ok(())
    }
}
