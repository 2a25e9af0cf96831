use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::error::Result;
use crate::sequence::{BaseCounts, Sequence};

// Nucleotide masses in hundredths of a Dalton.
const MASS_A: i64 = 31321;
const MASS_T: i64 = 30420;
const MASS_C: i64 = 28918;
const MASS_G: i64 = 32921;
/// 5' phosphate removal.
const PHOSPHATE_ADJUSTMENT: i64 = 6196;

/// Physicochemical summary of one sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsResult {
    pub length: u64,
    /// Wallace rule estimate in degrees Celsius.
    pub tm_celsius: u64,
    /// One decimal place.
    pub gc_percent: f64,
    /// One decimal place.
    pub at_percent: f64,
    /// Daltons, two decimal places.
    pub molecular_weight: f64,
    pub counts: BaseCounts,
}

/// Validates `text` and computes its metrics.
///
/// `N` counts toward the length but not toward Tm, percentages or weight.
pub fn compute_metrics(text: &str) -> Result<MetricsResult> {
    let sequence = Sequence::parse(text)?;
    Ok(metrics_for(&sequence))
}

/// Metrics for an already validated sequence.
pub fn metrics_for(sequence: &Sequence) -> MetricsResult {
    let counts = sequence.counts();
    let length = counts.total();
    MetricsResult {
        length,
        tm_celsius: wallace_tm(&counts),
        gc_percent: percent_one_decimal(counts.gc(), length),
        at_percent: percent_one_decimal(counts.at(), length),
        molecular_weight: molecular_weight_hundredths(&counts) as f64 / 100.0,
        counts,
    }
}

/// `4*(G+C) + 2*(A+T)`; only meaningful for short primers.
pub fn wallace_tm(counts: &BaseCounts) -> u64 {
    4 * counts.gc() + 2 * counts.at()
}

/// `part / whole * 100` to one decimal, rounding ties to even.
///
/// Evaluated on the exact ratio with integers: 1/16 (6.25%) is 6.2 and
/// 15/16 (93.75%) is 93.8, so complementary GC/AT values still sum to 100.
///
/// With N present the rounded GC% + AT% stays below 100 only while the N
/// share is visible at one decimal. Past 1000 bases a single N can vanish:
/// 1000 G + 1000 A + 1 N reports 50.0 + 50.0. The sum never exceeds 100.
pub fn percent_one_decimal(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let scaled = part as u128 * 1000;
    let whole = whole as u128;
    let (quotient, remainder) = (scaled / whole, scaled % whole);
    let tenths = match (2 * remainder).cmp(&whole) {
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient & 1),
        Ordering::Less => quotient,
    };
    tenths as f64 / 10.0
}

/// Single-stranded oligo weight in hundredths of a Dalton. Exact, so the
/// two-decimal result needs no further rounding.
pub fn molecular_weight_hundredths(counts: &BaseCounts) -> i64 {
    counts.a as i64 * MASS_A
        + counts.t as i64 * MASS_T
        + counts.c as i64 * MASS_C
        + counts.g as i64 * MASS_G
        - PHOSPHATE_ADJUSTMENT
}

impl Display for MetricsResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Length:             {}", self.length)?;
        writeln!(f, "Melting Temp (Tm):  {} °C", self.tm_celsius)?;
        writeln!(f, "GC Content:         {:.1}%", self.gc_percent)?;
        writeln!(f, "AT Content:         {:.1}%", self.at_percent)?;
        writeln!(f, "Mol Wt:             {:.2} Da", self.molecular_weight)?;
        write!(
            f,
            "Composition:        A={} T={} G={} C={} N={}",
            self.counts.a, self.counts.t, self.counts.g, self.counts.c, self.counts.n
        )
    }
}
