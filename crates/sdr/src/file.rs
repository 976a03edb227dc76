// Copyright 2025-2026 CEMAXECUTER LLC

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use crossbeam::channel::Sender;

use crate::error::{Error, Result};
use crate::{SampleBuf, SdrSource};

/// IQ sample format for file input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// bladeRF SC16 Q11: pairs of little-endian i16 in [-2048, 2047],
    /// as written by the recorder
    Sc16,
    /// Complex int8 (CS8): pairs of i8
    Ci8,
    /// Complex float32 (CF32): pairs of little-endian f32 in [-1, 1]
    Cf32,
}

impl FileFormat {
    /// Bytes per complex sample on disk.
    pub fn sample_bytes(self) -> usize {
        match self {
            FileFormat::Ci8 => 2,
            FileFormat::Sc16 => 4,
            FileFormat::Cf32 => 8,
        }
    }

    /// Convert raw file bytes to SC16 Q11 values.
    fn decode(self, raw: &[u8]) -> Vec<i16> {
        match self {
            FileFormat::Sc16 => {
                let mut out = vec![0i16; raw.len() / 2];
                LittleEndian::read_i16_into(raw, &mut out);
                out
            }
            // 8-bit to 12-bit
            FileFormat::Ci8 => raw.iter().map(|&b| (b as i8 as i16) << 4).collect(),
            FileFormat::Cf32 => {
                let mut floats = vec![0f32; raw.len() / 4];
                LittleEndian::read_f32_into(raw, &mut floats);
                floats
                    .iter()
                    .map(|&v| (v * 2048.0).round().clamp(-2048.0, 2047.0) as i16)
                    .collect()
            }
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sc16" | "ci16" | "sc16_q11" => Ok(FileFormat::Sc16),
            "ci8" | "cs8" => Ok(FileFormat::Ci8),
            "cf32" => Ok(FileFormat::Cf32),
            other => Err(Error::InvalidArgument(format!(
                "unknown sample format: {} (use sc16, ci8, or cf32)",
                other
            ))),
        }
    }
}

/// Read until `buf` is full or the reader hits EOF.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// IQ file reader: plays a recording back as SampleBuf blocks.
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
    sample_rate: u32,
    center_freq: u64,
    /// Complex samples per block
    block_size: usize,
    repeat: bool,
    running: Arc<AtomicBool>,
}

impl FileSource {
    pub fn new(
        path: impl Into<PathBuf>,
        format: FileFormat,
        sample_rate: u32,
        center_freq: u64,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            sample_rate,
            center_freq,
            block_size: 65536,
            repeat: false,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_block_size(&mut self, size: usize) {
        self.block_size = size.max(1);
    }

    /// Rewind at end of file instead of stopping.
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

impl SdrSource for FileSource {
    fn start(&mut self, tx: Sender<SampleBuf>) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| {
            Error::Source(format!("failed to open {}: {}", self.path.display(), e))
        })?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let mut raw = vec![0u8; self.block_size * self.format.sample_bytes()];
        let mut offset: u64 = 0;

        self.running.store(true, Ordering::SeqCst);
        log::info!(
            "reading IQ from {} ({:?}, {} Hz, {} MHz)",
            self.path.display(),
            self.format,
            self.sample_rate,
            self.center_freq / 1_000_000
        );

        while self.running.load(Ordering::SeqCst) {
            let n = fill(&mut reader, &mut raw)
                .map_err(|e| Error::Source(format!("read error: {}", e)))?;
            let whole = n - n % self.format.sample_bytes();

            if whole == 0 {
                if self.repeat && offset > 0 {
                    reader
                        .seek(SeekFrom::Start(0))
                        .map_err(|e| Error::Source(format!("rewind failed: {}", e)))?;
                    continue;
                }
                log::info!("end of file: {}", self.path.display());
                break;
            }

            let data = self.format.decode(&raw[..whole]);
            let num_samples = data.len() / 2;
            let buf = SampleBuf {
                data,
                num_samples,
                timestamp: Some(offset),
            };
            offset += num_samples as u64;

            if tx.send(buf).is_err() {
                break; // receiver dropped
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn center_frequency(&self) -> u64 {
        self.center_freq
    }
}
