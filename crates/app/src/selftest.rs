// Copyright 2025-2026 CEMAXECUTER LLC

use std::fmt;

use clap::Args;

#[derive(Args, Debug)]
pub struct SelftestArgs {
    #[arg(short = 'd', long, default_value = "")]
    pub device: String,

    #[arg(long, default_value_t = 3500)]
    pub timeout_ms: u32,
}

/// Outcome of one set-and-read-back check.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub name: String,
    pub expected: u64,
    /// `Err` when the driver call itself failed
    pub actual: Result<u64, String>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.actual.as_ref().map_or(false, |&v| v == self.expected)
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verdict = if self.passed() { "ok  " } else { "FAIL" };
        match self.actual {
            Ok(v) => write!(f, "[{}] {}: expected {}, got {}", verdict, self.name, self.expected, v),
            Err(ref e) => write!(f, "[{}] {}: expected {}, {}", verdict, self.name, self.expected, e),
        }
    }
}

/// Print every check and fail if any did not pass.
pub fn report(checks: &[Check]) -> Result<(), String> {
    for check in checks {
        println!("{}", check);
    }
    let failed = checks.iter().filter(|c| !c.passed()).count();
    if failed == 0 {
        println!("{} checks passed", checks.len());
        Ok(())
    } else {
        Err(format!("{} of {} checks failed", failed, checks.len()))
    }
}

#[cfg(feature = "bladerf")]
pub fn run(args: &SelftestArgs) -> Result<(), String> {
    use brf_sdr::{Channel, Device, Format, Module, SyncConfig};

    fn round_trip(ch: Channel<'_>, freq: u64, bw: u32, rate: u32) -> Vec<Check> {
        let name = |what: &str| format!("{} {}", ch.module(), what);
        vec![
            Check {
                name: name("frequency"),
                expected: freq,
                actual: ch
                    .set_frequency(freq)
                    .and_then(|_| ch.frequency())
                    .map_err(|e| e.to_string()),
            },
            Check {
                name: name("bandwidth"),
                expected: bw.into(),
                actual: ch
                    .set_bandwidth(bw)
                    .and_then(|_| ch.bandwidth())
                    .map(u64::from)
                    .map_err(|e| e.to_string()),
            },
            Check {
                name: name("sample rate"),
                expected: rate.into(),
                actual: ch
                    .set_sample_rate(rate)
                    .and_then(|_| ch.sample_rate())
                    .map(u64::from)
                    .map_err(|e| e.to_string()),
            },
        ]
    }

    let dev = Device::open(&args.device).map_err(|e| format!("failed to open device: {}", e))?;
    let mut checks = round_trip(dev.channel(Module::Rx), 1 << 28, 1_500_000, 1 << 20);
    checks.extend(round_trip(dev.channel(Module::Tx), 1_234_000_000, 1_500_000, 1 << 20));

    let rx = dev.rx();
    let received = rx
        .configure_sync(&SyncConfig::default())
        .and_then(|_| rx.set_enabled(true))
        .and_then(|_| rx.receive_bytes(1024, args.timeout_ms))
        .map(|bytes| bytes.len() as u64)
        .map_err(|e| e.to_string());
    if let Err(e) = rx.set_enabled(false) {
        log::warn!("failed to disable RX: {}", e);
    }
    checks.push(Check {
        name: "RX 1024-sample receive bytes".to_string(),
        expected: Format::Sc16Q11.buffer_bytes(1024) as u64,
        actual: received,
    });

    report(&checks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(expected: u64, actual: Result<u64, String>) -> Check {
        Check { name: "rx frequency".to_string(), expected, actual }
    }

    #[test]
    fn test_check_verdicts() {
        assert!(check(5, Ok(5)).passed());
        assert!(!check(5, Ok(4)).passed());
        assert!(!check(5, Err("timeout".into())).passed());
        assert_eq!(
            check(4096, Ok(4096)).to_string(),
            "[ok  ] rx frequency: expected 4096, got 4096"
        );
        assert_eq!(
            check(1, Err("timeout".into())).to_string(),
            "[FAIL] rx frequency: expected 1, timeout"
        );
    }

    #[test]
    fn test_report_fails_on_mismatch() {
        assert!(report(&[check(1, Ok(1))]).is_ok());
        let err = report(&[check(1, Ok(1)), check(2, Ok(3))]).unwrap_err();
        assert_eq!(err, "1 of 2 checks failed");
    }
}
