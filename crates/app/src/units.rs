// Copyright 2025-2026 CEMAXECUTER LLC

/// Parse a frequency or rate in Hz. Accepts plain integers, floats with an
/// exponent (`2.4e9`) and `k`/`M`/`G` suffixes (`440M`, `1.5M`).
pub fn parse_hz(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (num, mult) = match s.char_indices().last() {
        Some((i, 'k' | 'K')) => (&s[..i], 1e3),
        Some((i, 'M')) => (&s[..i], 1e6),
        Some((i, 'G' | 'g')) => (&s[..i], 1e9),
        _ => (s, 1.0),
    };
    let value: f64 = num
        .parse()
        .map_err(|_| format!("invalid frequency '{}'", s))?;
    let hz = value * mult;
    if !hz.is_finite() || hz < 0.0 || hz > u64::MAX as f64 {
        return Err(format!("frequency out of range: '{}'", s));
    }
    Ok(hz.round() as u64)
}

/// `parse_hz` for 32-bit driver parameters (bandwidth, sample rate).
pub fn parse_hz_u32(s: &str) -> Result<u32, String> {
    let hz = parse_hz(s)?;
    u32::try_from(hz).map_err(|_| format!("'{}' does not fit in 32 bits", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hz() {
        assert_eq!(parse_hz("440000000"), Ok(440_000_000));
        assert_eq!(parse_hz("440M"), Ok(440_000_000));
        assert_eq!(parse_hz("1.5M"), Ok(1_500_000));
        assert_eq!(parse_hz("2.4e9"), Ok(2_400_000_000));
        assert_eq!(parse_hz("100k"), Ok(100_000));
        assert_eq!(parse_hz("2G"), Ok(2_000_000_000));
        assert!(parse_hz("fast").is_err());
        assert!(parse_hz("-5M").is_err());
        assert!(parse_hz("").is_err());
    }

    #[test]
    fn test_parse_hz_u32() {
        assert_eq!(parse_hz_u32("40M"), Ok(40_000_000));
        assert!(parse_hz_u32("5G").is_err());
    }
}
