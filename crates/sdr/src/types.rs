// Copyright 2025-2026 CEMAXECUTER LLC

//! Enumerations mirrored from `libbladeRF.h`.
//!
//! Discriminants are the driver's integer values and must not be reordered.

use std::fmt;
use std::os::raw::c_int;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! abi_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Raw value passed across the FFI boundary.
            pub fn as_raw(self) -> c_int {
                self as c_int
            }
        }

        impl TryFrom<c_int> for $name {
            type Error = Error;

            fn try_from(value: c_int) -> Result<Self, Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(Error::UnknownValue { kind: $kind, value }),
                }
            }
        }
    };
}

abi_enum! {
    /// Signal chain selection: receive or transmit.
    ///
    /// Also used where the driver asks for a direction or a single-channel
    /// stream layout; the values coincide (`RX_X1 = 0`, `TX_X1 = 1`).
    Module, "module" {
        Rx = 0,
        Tx = 1,
    }
}

abi_enum! {
    /// Sampling connection.
    Sampling, "sampling" {
        /// Unable to determine connection type
        Unknown = 0,
        /// Sample from RX/TX connector
        Internal = 1,
        /// Sample from J60 or J61
        External = 2,
    }
}

abi_enum! {
    /// LNA gain options.
    LnaGain, "lna gain" {
        Unknown = 0,
        /// LNA bypassed, 0 dB
        Bypass = 1,
        /// Max gain minus 6 dB
        Mid = 2,
        Max = 3,
    }
}

abi_enum! {
    /// Low-pass filter mode.
    LpfMode, "lpf mode" {
        Normal = 0,
        Bypassed = 1,
        Disabled = 2,
    }
}

abi_enum! {
    /// Expansion boards.
    ExpansionBoard, "expansion board" {
        None = 0,
        Xb100 = 1,
        Xb200 = 2,
        Xb300 = 3,
    }
}

abi_enum! {
    /// XB-200 filterbanks.
    Xb200Filter, "xb200 filter" {
        Mhz50 = 0,
        Mhz144 = 1,
        Mhz222 = 2,
        Custom = 3,
    }
}

abi_enum! {
    /// XB-200 signal paths.
    Xb200Path, "xb200 path" {
        Bypass = 0,
        Mix = 1,
    }
}

abi_enum! {
    /// DC calibration modules.
    CalModule, "calibration module" {
        LpfTuning = 0,
        TxLpf = 1,
        RxLpf = 2,
        RxVga2 = 3,
    }
}

abi_enum! {
    /// Correction parameters for `get/set_correction`.
    ///
    /// DC offsets take [-2048, 2048]; phase and gain take [-4096, 4096].
    Correction, "correction" {
        DcOffI = 0,
        DcOffQ = 1,
        Phase = 2,
        Gain = 3,
    }
}

abi_enum! {
    /// Sample formats.
    Format, "format" {
        /// Interleaved little-endian Q11 int16 I/Q, [-2048, 2047]
        Sc16Q11 = 0,
        /// SC16 Q11 with a 16-byte metadata header per 1024-sample block
        Sc16Q11Meta = 1,
        PacketMeta = 2,
        /// Interleaved Q7 int8 I/Q
        Sc8Q7 = 3,
        Sc8Q7Meta = 4,
    }
}

abi_enum! {
    /// libbladeRF log verbosity.
    LogLevel, "log level" {
        Verbose = 0,
        Debug = 1,
        Info = 2,
        Warning = 3,
        Error = 4,
        Critical = 5,
        Silent = 6,
    }
}

impl Module {
    pub fn name(self) -> &'static str {
        match self {
            Module::Rx => "RX",
            Module::Tx => "TX",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LnaGain {
    type Err = Error;

    /// Accepts `bypass`, `mid`, `max` and the driver spellings
    /// (`LNA_GAIN_MAX`, `BLADERF_LNA_GAIN_MAX`).
    fn from_str(s: &str) -> Result<Self, Error> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper
            .strip_prefix("BLADERF_")
            .unwrap_or(&upper);
        let name = name.strip_prefix("LNA_GAIN_").unwrap_or(name);
        match name {
            "BYPASS" => Ok(LnaGain::Bypass),
            "MID" => Ok(LnaGain::Mid),
            "MAX" => Ok(LnaGain::Max),
            _ => Err(Error::InvalidArgument(format!("unknown LNA gain '{}'", s))),
        }
    }
}

impl Format {
    /// Bytes occupied by one complex sample.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Format::Sc8Q7 | Format::Sc8Q7Meta => 2,
            Format::Sc16Q11 | Format::Sc16Q11Meta | Format::PacketMeta => 4,
        }
    }

    /// Minimum buffer size in bytes for `num_samples` complex samples.
    pub fn buffer_bytes(self, num_samples: usize) -> usize {
        num_samples * self.bytes_per_sample()
    }

    pub fn has_metadata(self) -> bool {
        matches!(
            self,
            Format::Sc16Q11Meta | Format::PacketMeta | Format::Sc8Q7Meta
        )
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sc16" | "sc16_q11" => Ok(Format::Sc16Q11),
            "sc16_meta" | "sc16_q11_meta" => Ok(Format::Sc16Q11Meta),
            "packet_meta" => Ok(Format::PacketMeta),
            "sc8" | "sc8_q7" => Ok(Format::Sc8Q7),
            "sc8_meta" | "sc8_q7_meta" => Ok(Format::Sc8Q7Meta),
            _ => Err(Error::InvalidArgument(format!("unknown sample format '{}'", s))),
        }
    }
}

impl From<log::LevelFilter> for LogLevel {
    fn from(level: log::LevelFilter) -> Self {
        match level {
            log::LevelFilter::Off => LogLevel::Silent,
            log::LevelFilter::Error => LogLevel::Error,
            log::LevelFilter::Warn => LogLevel::Warning,
            log::LevelFilter::Info => LogLevel::Info,
            log::LevelFilter::Debug => LogLevel::Debug,
            log::LevelFilter::Trace => LogLevel::Verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values() {
        assert_eq!(Module::Rx.as_raw(), 0);
        assert_eq!(Module::Tx.as_raw(), 1);
        assert_eq!(LnaGain::Max.as_raw(), 3);
        assert_eq!(Xb200Filter::Custom.as_raw(), 3);
        assert_eq!(Format::Sc16Q11Meta.as_raw(), 1);
        assert_eq!(Format::Sc8Q7.as_raw(), 3);
        assert_eq!(LogLevel::Silent.as_raw(), 6);
    }

    #[test]
    fn test_try_from_rejects_unknown() {
        assert_eq!(LpfMode::try_from(2), Ok(LpfMode::Disabled));
        assert_eq!(
            LpfMode::try_from(3),
            Err(Error::UnknownValue { kind: "lpf mode", value: 3 })
        );
        for &xb in ExpansionBoard::ALL {
            assert_eq!(ExpansionBoard::try_from(xb.as_raw()), Ok(xb));
        }
    }

    #[test]
    fn test_lna_gain_names() {
        assert_eq!("max".parse::<LnaGain>(), Ok(LnaGain::Max));
        assert_eq!("LNA_GAIN_MAX".parse::<LnaGain>(), Ok(LnaGain::Max));
        assert_eq!("BLADERF_LNA_GAIN_BYPASS".parse::<LnaGain>(), Ok(LnaGain::Bypass));
        assert_eq!("Mid".parse::<LnaGain>(), Ok(LnaGain::Mid));
        assert!("loud".parse::<LnaGain>().is_err());
    }

    #[test]
    fn test_format_sizes() {
        // 1024 SC16 samples need 4096 bytes
        assert_eq!(Format::Sc16Q11.buffer_bytes(1024), 4096);
        assert_eq!(Format::Sc8Q7.buffer_bytes(1024), 2048);
        assert!(Format::Sc16Q11Meta.has_metadata());
        assert!(!Format::Sc16Q11.has_metadata());
        assert_eq!("sc16_q11_meta".parse::<Format>(), Ok(Format::Sc16Q11Meta));
    }

    #[test]
    fn test_log_level_from_filter() {
        assert_eq!(LogLevel::from(log::LevelFilter::Warn), LogLevel::Warning);
        assert_eq!(LogLevel::from(log::LevelFilter::Off), LogLevel::Silent);
    }
}
