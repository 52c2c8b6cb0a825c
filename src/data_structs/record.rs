use super::enums::Strand;
use super::typedef::{PosType, ReadCount, Tally};

/// One parsed methylation call from a cytosine report line.
///
/// Borrows the line it was parsed from; records are transient and never
/// outlive the read buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethylationRecord<'a> {
    pub chr: &'a str,
    pub position: PosType,
    pub strand: Strand,
    pub count_m: ReadCount,
    pub count_um: ReadCount,
    pub context: &'a str,
    pub trinuc: &'a str,
}

impl<'a> MethylationRecord<'a> {
    /// Splits a raw report line into exactly seven whitespace-delimited
    /// fields and parses the numeric ones.
    ///
    /// Returns `None` for any malformed line: wrong field count, numeric
    /// parse failure, or a strand token that is not a single character.
    /// Malformed lines carry no diagnostic; they are skipped.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut fields = line.split_whitespace();

        let chr = fields.next()?;
        let position = fields.next()?.parse().ok()?;
        let strand_tok = fields.next()?;
        let count_m = fields.next()?.parse().ok()?;
        let count_um = fields.next()?.parse().ok()?;
        let context = fields.next()?;
        let trinuc = fields.next()?;
        if fields.next().is_some() {
            return None;
        }

        let mut strand_chars = strand_tok.chars();
        let strand = Strand::from(strand_chars.next()?);
        if strand_chars.next().is_some() {
            return None;
        }

        Some(MethylationRecord {
            chr,
            position,
            strand,
            count_m,
            count_um,
            context,
            trinuc,
        })
    }

    /// Total sequencing depth at this site.
    pub fn total_reads(&self) -> Tally {
        self.count_m as Tally + self.count_um as Tally
    }

    /// Rounded methylation percentage, `None` when the site has no reads.
    ///
    /// Rounds half away from zero. Results outside `[0, 100]` cannot arise
    /// from the ratio but are discarded rather than clamped.
    pub fn level_percent(&self) -> Option<u8> {
        let total = self.total_reads();
        if total == 0 {
            return None;
        }
        let level = (self.count_m as f64 / total as f64 * 100.0).round();
        (0.0..=100.0).contains(&level).then_some(level as u8)
    }
}
