// Copyright 2025-2026 CEMAXECUTER LLC

//! In-band metadata for `Format::Sc16Q11Meta` buffers.
//!
//! The async interface hands these buffers over raw: every 1024-sample block
//! starts with a 16-byte little-endian header in place of its first four
//! samples. The sync interface packs and unpacks this itself.

use byteorder::{ByteOrder, LittleEndian};

/// Sample slots per metadata block.
pub const BLOCK_SAMPLES: usize = 1024;
/// Bytes per metadata block (SC16: 4 bytes per sample).
pub const BLOCK_BYTES: usize = BLOCK_SAMPLES * 4;
/// Header bytes at the start of each block.
pub const HEADER_BYTES: usize = 16;
/// Usable sample slots per block after the header.
pub const PAYLOAD_SAMPLES: usize = BLOCK_SAMPLES - HEADER_BYTES / 4;

/// Per-block header: `u32` reserved, `u64` timestamp, `u32` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub timestamp: u64,
    pub flags: u32,
}

impl BlockHeader {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_BYTES {
            return None;
        }
        Some(Self {
            timestamp: LittleEndian::read_u64(&bytes[4..12]),
            flags: LittleEndian::read_u32(&bytes[12..16]),
        })
    }

    pub fn encode(&self) -> [u8; HEADER_BYTES] {
        let mut raw = [0u8; HEADER_BYTES];
        LittleEndian::write_u64(&mut raw[4..12], self.timestamp);
        LittleEndian::write_u32(&mut raw[12..16], self.flags);
        raw
    }

    /// Write the header to the start of `out`. Returns `None` if `out` is
    /// shorter than a header.
    pub fn write(&self, out: &mut [u8]) -> Option<()> {
        out.get_mut(..HEADER_BYTES)?.copy_from_slice(&self.encode());
        Some(())
    }
}

/// One decoded block: its header and the interleaved I/Q payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub samples: Vec<i16>,
}

/// Split a raw META buffer into blocks. A trailing partial block is ignored.
pub fn unpack(buf: &[u8]) -> Vec<Block> {
    buf.chunks_exact(BLOCK_BYTES)
        .filter_map(|chunk| {
            let header = BlockHeader::parse(chunk)?;
            let payload = &chunk[HEADER_BYTES..];
            let mut samples = vec![0i16; payload.len() / 2];
            LittleEndian::read_i16_into(payload, &mut samples);
            Some(Block { header, samples })
        })
        .collect()
}

/// Pack interleaved I/Q into META blocks starting at `timestamp`.
///
/// Each block's timestamp advances by its payload sample count. The last
/// block is zero-padded.
pub fn pack(samples: &[i16], timestamp: u64, flags: u32) -> Vec<u8> {
    let per_block = PAYLOAD_SAMPLES * 2;
    let num_blocks = (samples.len() + per_block - 1) / per_block;
    let mut out = vec![0u8; num_blocks * BLOCK_BYTES];

    for (i, (chunk, block)) in samples
        .chunks(per_block)
        .zip(out.chunks_exact_mut(BLOCK_BYTES))
        .enumerate()
    {
        let header = BlockHeader {
            timestamp: timestamp + (i * PAYLOAD_SAMPLES) as u64,
            flags,
        };
        block[..HEADER_BYTES].copy_from_slice(&header.encode());
        LittleEndian::write_i16_into(chunk, &mut block[HEADER_BYTES..HEADER_BYTES + chunk.len() * 2]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let mut raw = [0u8; HEADER_BYTES];
        raw[0..4].copy_from_slice(&0xdead_beefu32.to_le_bytes()); // reserved, ignored
        raw[4..12].copy_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        raw[12..16].copy_from_slice(&0x8000_0001u32.to_le_bytes());

        let hdr = BlockHeader::parse(&raw).unwrap();
        assert_eq!(hdr.timestamp, 0x0102_0304_0506_0708);
        assert_eq!(hdr.flags, 0x8000_0001);
        assert!(BlockHeader::parse(&raw[..15]).is_none());
    }

    #[test]
    fn test_header_write_checks_length() {
        let hdr = BlockHeader { timestamp: 0x1122_3344, flags: 0x8000_0001 };
        let mut short = [0u8; HEADER_BYTES - 1];
        assert!(hdr.write(&mut short).is_none());

        let mut raw = [0xffu8; HEADER_BYTES + 4];
        assert!(hdr.write(&mut raw).is_some());
        assert_eq!(&raw[0..4], &[0, 0, 0, 0]);
        assert_eq!(BlockHeader::parse(&raw), Some(hdr));
        assert_eq!(&raw[HEADER_BYTES..], &[0xff; 4]);
    }

    #[test]
    fn test_payload_size() {
        assert_eq!(PAYLOAD_SAMPLES, 1020);
        assert_eq!(BLOCK_BYTES, 4096);
    }

    #[test]
    fn test_pack_spans_blocks_with_advancing_timestamps() {
        // 1500 samples need two blocks: 1020 + 480 (padded)
        let samples: Vec<i16> = (0..3000).map(|v| (v % 2048) as i16).collect();
        let raw = pack(&samples, 5000, 0);
        assert_eq!(raw.len(), 2 * BLOCK_BYTES);

        let blocks = unpack(&raw);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].header.timestamp, 5000);
        assert_eq!(blocks[1].header.timestamp, 5000 + PAYLOAD_SAMPLES as u64);
        assert_eq!(&blocks[0].samples[..], &samples[..PAYLOAD_SAMPLES * 2]);
        assert_eq!(&blocks[1].samples[..960], &samples[PAYLOAD_SAMPLES * 2..]);
        assert!(blocks[1].samples[960..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_unpack_ignores_partial_block() {
        let raw = vec![0u8; BLOCK_BYTES + 100];
        assert_eq!(unpack(&raw).len(), 1);
    }
}
