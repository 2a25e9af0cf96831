/// Reverse complement of a DNA byte string.
///
/// - A ↔ T, G ↔ C, N stays N
/// - input is uppercased first
/// - anything else becomes N
///
/// Never fails; it is not a validity check.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Character-level variant: every char (multi-byte ones included) maps to
/// exactly one output base.
pub fn reverse_complement_str(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| if c.is_ascii() { complement(c as u8) as char } else { 'N' })
        .collect()
}

fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        _ => b'N',
    }
}
