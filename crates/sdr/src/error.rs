// Copyright 2025-2026 CEMAXECUTER LLC

use std::os::raw::c_int;

/// Errors surfaced by the bladeRF bindings.
///
/// Driver failures map one-to-one onto the `BLADERF_ERR_*` codes from
/// `libbladeRF.h`. Nothing is retried: every nonzero return code becomes an
/// error for the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unexpected error")]
    Unexpected,
    #[error("provided parameter is out of range")]
    Range,
    #[error("invalid operation or parameter")]
    Inval,
    #[error("a memory allocation error occurred")]
    Mem,
    #[error("file or device I/O failure")]
    Io,
    #[error("operation timed out")]
    Timeout,
    #[error("no devices available")]
    NoDev,
    #[error("operation not supported")]
    Unsupported,
    #[error("misaligned flash access")]
    Misaligned,
    #[error("invalid checksum")]
    Checksum,
    #[error("file not found")]
    NoFile,
    #[error("an FPGA update is required")]
    UpdateFpga,
    #[error("a firmware update is required")]
    UpdateFw,
    #[error("requested timestamp is in the past")]
    TimePast,
    #[error("could not enqueue data into a full queue")]
    QueueFull,
    #[error("an FPGA operation reported a failure")]
    FpgaOp,
    #[error("insufficient permissions for the requested operation")]
    Permission,
    #[error("operation would block, no buffer available")]
    WouldBlock,
    #[error("device insufficiently initialized for operation")]
    NotInit,
    #[error("unknown libbladeRF error code {0}")]
    Unknown(i32),
    #[error("unknown {kind} value {value}")]
    UnknownValue { kind: &'static str, value: i32 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("sample source: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Translate a nonzero driver return code.
    pub fn from_code(code: c_int) -> Self {
        match code {
            -1 => Error::Unexpected,
            -2 => Error::Range,
            -3 => Error::Inval,
            -4 => Error::Mem,
            -5 => Error::Io,
            -6 => Error::Timeout,
            -7 => Error::NoDev,
            -8 => Error::Unsupported,
            -9 => Error::Misaligned,
            -10 => Error::Checksum,
            -11 => Error::NoFile,
            -12 => Error::UpdateFpga,
            -13 => Error::UpdateFw,
            -14 => Error::TimePast,
            -15 => Error::QueueFull,
            -16 => Error::FpgaOp,
            -17 => Error::Permission,
            -18 => Error::WouldBlock,
            -19 => Error::NotInit,
            other => Error::Unknown(other),
        }
    }

    /// The driver return code this error was built from, if any.
    pub fn code(&self) -> Option<c_int> {
        let code = match self {
            Error::Unexpected => -1,
            Error::Range => -2,
            Error::Inval => -3,
            Error::Mem => -4,
            Error::Io => -5,
            Error::Timeout => -6,
            Error::NoDev => -7,
            Error::Unsupported => -8,
            Error::Misaligned => -9,
            Error::Checksum => -10,
            Error::NoFile => -11,
            Error::UpdateFpga => -12,
            Error::UpdateFw => -13,
            Error::TimePast => -14,
            Error::QueueFull => -15,
            Error::FpgaOp => -16,
            Error::Permission => -17,
            Error::WouldBlock => -18,
            Error::NotInit => -19,
            Error::Unknown(code) => *code,
            Error::UnknownValue { .. } | Error::InvalidArgument(_) | Error::Source(_) => return None,
        };
        Some(code)
    }
}

/// Check a driver return code: zero is success, anything else is an error.
pub fn check(code: c_int) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(Error::from_code(code))
    }
}
