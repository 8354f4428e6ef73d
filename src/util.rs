use anyhow::{bail, Context, Result};

/// Scenario seed from the command line: `0x`-prefixed hex or plain decimal.
pub fn parse_seed(raw: &str) -> Result<u32> {
    let text = raw.trim();
    if text.is_empty() {
        bail!("scenario seed is empty");
    }
    let (digits, radix) = match text.get(..2) {
        Some("0x") | Some("0X") => (&text[2..], 16),
        _ => (text, 10),
    };
    u32::from_str_radix(digits, radix)
        .with_context(|| format!("scenario seed {text:?} is not a 32-bit value"))
}

/// Fixed-width hex label used in logs and benchmark records.
pub fn seed_to_hex(seed: u32) -> String {
    format!("{seed:#010x}")
}

/// `count` seeds spread from `base` by the golden-ratio increment.
pub fn generate_seeds(base: u32, count: usize) -> Vec<u32> {
    (0..count as u32)
        .map(|i| base.wrapping_add(i.wrapping_mul(0x9E37_79B9)))
        .collect()
}
