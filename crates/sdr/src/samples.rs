// Copyright 2025-2026 CEMAXECUTER LLC

use byteorder::{ByteOrder, LittleEndian};
use num_complex::Complex32;

/// Full scale of SC16 Q11 samples: [-2048, 2047] maps to [-1.0, 1.0).
pub const SC16_Q11_SCALE: f32 = 2048.0;
/// Largest positive SC16 Q11 value.
pub const SC16_Q11_MAX: i16 = 2047;

/// Decode little-endian interleaved int16 I/Q. A trailing odd byte is dropped.
pub fn sc16_from_bytes(bytes: &[u8]) -> Vec<i16> {
    let mut out = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(&bytes[..out.len() * 2], &mut out);
    out
}

/// Encode interleaved int16 I/Q as little-endian bytes.
pub fn sc16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = vec![0u8; samples.len() * 2];
    LittleEndian::write_i16_into(samples, &mut out);
    out
}

/// Convert the first `num_samples` complex samples of a Q11 buffer to floats.
pub fn to_complex(samples: &[i16], num_samples: usize) -> Vec<Complex32> {
    samples
        .chunks_exact(2)
        .take(num_samples)
        .map(|iq| {
            Complex32::new(
                iq[0] as f32 / SC16_Q11_SCALE,
                iq[1] as f32 / SC16_Q11_SCALE,
            )
        })
        .collect()
}

/// A constant I/Q pair repeated `num_samples` times.
///
/// With `i = q = SC16_Q11_MAX` this is a full-scale DC signal that
/// transmits as a strong LO carrier.
pub fn constant(num_samples: usize, i: i16, q: i16) -> Vec<i16> {
    let mut out = Vec::with_capacity(num_samples * 2);
    for _ in 0..num_samples {
        out.push(i);
        out.push(q);
    }
    out
}

/// A full-scale tone at +Fs/4: I cycles 0,1,0,-1 and Q cycles 1,0,-1,0.
pub fn quarter_rate_tone(num_samples: usize) -> Vec<i16> {
    const I_MASK: [i16; 4] = [0, 1, 0, -1];
    const Q_MASK: [i16; 4] = [1, 0, -1, 0];
    let mut out = Vec::with_capacity(num_samples * 2);
    for n in 0..num_samples {
        out.push(SC16_Q11_MAX * I_MASK[n % 4]);
        out.push(SC16_Q11_MAX * Q_MASK[n % 4]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_little_endian() {
        let bytes = sc16_to_bytes(&[0x0102, -2]);
        assert_eq!(bytes, vec![0x02, 0x01, 0xfe, 0xff]);
        assert_eq!(sc16_from_bytes(&bytes), vec![0x0102, -2]);
        // Odd trailing byte is dropped
        assert_eq!(sc16_from_bytes(&[1, 0, 7]), vec![1]);
    }

    #[test]
    fn test_to_complex_scaling() {
        let c = to_complex(&[2047, -2048, 1024, 0, 5, 5], 2);
        assert_eq!(c.len(), 2);
        assert!((c[0].re - 2047.0 / 2048.0).abs() < 1e-6);
        assert_eq!(c[0].im, -1.0);
        assert_eq!(c[1], Complex32::new(0.5, 0.0));
    }

    #[test]
    fn test_constant_carrier() {
        let s = constant(4, SC16_Q11_MAX, SC16_Q11_MAX);
        assert_eq!(s.len(), 8);
        assert!(s.iter().all(|&v| v == 2047));
    }

    #[test]
    fn test_quarter_rate_tone_has_unit_magnitude() {
        let tone = quarter_rate_tone(8);
        for c in to_complex(&tone, 8) {
            assert!((c.norm() - 2047.0 / 2048.0).abs() < 1e-6);
        }
    }
}
