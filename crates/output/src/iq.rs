// Copyright 2025-2026 CEMAXECUTER LLC

use std::fs::File;
use std::io::{self, BufWriter, Write};

use byteorder::{LittleEndian, WriteBytesExt};

/// Raw SC16 Q11 recorder: little-endian i16 pairs, no header.
pub struct IqWriter<W: Write> {
    writer: W,
    samples: u64,
    bytes: u64,
}

impl<W: Write> IqWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            samples: 0,
            bytes: 0,
        }
    }

    /// Write interleaved I/Q values. A trailing unpaired value is dropped.
    pub fn write_samples(&mut self, iq: &[i16]) -> io::Result<()> {
        let whole = iq.len() - iq.len() % 2;
        for &v in &iq[..whole] {
            self.writer.write_i16::<LittleEndian>(v)?;
        }
        self.samples += (whole / 2) as u64;
        self.bytes += (whole * 2) as u64;
        Ok(())
    }

    /// Complex samples written so far
    pub fn samples_written(&self) -> u64 {
        self.samples
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Open a recorder on `path`, or on stdout when `path` is `-`.
pub fn create(path: &str) -> io::Result<IqWriter<Box<dyn Write + Send>>> {
    let sink: Box<dyn Write + Send> = if path == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::with_capacity(1 << 20, File::create(path)?))
    };
    Ok(IqWriter::new(sink))
}
