// Copyright 2025-2026 CEMAXECUTER LLC

mod display;
mod live_fft;
mod units;

// Only their argument types are reachable without the driver
#[cfg_attr(not(feature = "bladerf"), allow(dead_code))]
mod freq_response;
#[cfg_attr(not(feature = "bladerf"), allow(dead_code))]
mod probe;
#[cfg_attr(not(feature = "bladerf"), allow(dead_code))]
mod rx;
#[cfg_attr(not(feature = "bladerf"), allow(dead_code))]
mod selftest;
#[cfg_attr(not(feature = "bladerf"), allow(dead_code))]
mod sync_fft;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bladerf-tools")]
#[command(about = "Receive, spectrum and sweep tools for the Nuand bladeRF")]
struct Cli {
    /// Verbose output (debug logging, driver verbosity follows)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices and print the settings of one
    Probe(probe::ProbeArgs),
    /// Record raw SC16 Q11 samples to a file or stdout
    Rx(rx::RxArgs),
    /// Live averaged spectrum from an async stream or a recording
    LiveFft(live_fft::LiveFftArgs),
    /// Live averaged spectrum using synchronous receives with metadata
    SyncFft(sync_fft::SyncFftArgs),
    /// Sweep a TX carrier and measure the RX response
    FreqResponse(freq_response::FreqResponseArgs),
    /// Set and read back RX/TX settings, then check a receive
    Selftest(selftest::SelftestArgs),
}

/// Error for hardware commands in a build without the driver.
#[cfg(not(feature = "bladerf"))]
fn no_hardware(command: &str) -> String {
    format!(
        "{} needs bladeRF hardware support; rebuild with `--features bladerf`",
        command
    )
}

fn init_logging(verbose: bool) -> log::LevelFilter {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
    log::max_level()
}

#[cfg(feature = "bladerf")]
fn dispatch(command: &Command, level: log::LevelFilter) -> Result<(), String> {
    let driver = if level >= log::LevelFilter::Debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    brf_sdr::device::set_log_level(driver.into());
    match command {
        Command::Probe(args) => probe::run(args),
        Command::Rx(args) => rx::run(args),
        Command::LiveFft(args) => live_fft::run(args),
        Command::SyncFft(args) => sync_fft::run(args),
        Command::FreqResponse(args) => freq_response::run(args),
        Command::Selftest(args) => selftest::run(args),
    }
}

#[cfg(not(feature = "bladerf"))]
fn dispatch(command: &Command, _level: log::LevelFilter) -> Result<(), String> {
    match command {
        Command::LiveFft(args) => live_fft::run(args),
        Command::Probe(_) => Err(no_hardware("probe")),
        Command::Rx(_) => Err(no_hardware("rx")),
        Command::SyncFft(_) => Err(no_hardware("sync-fft")),
        Command::FreqResponse(_) => Err(no_hardware("freq-response")),
        Command::Selftest(_) => Err(no_hardware("selftest")),
    }
}

fn main() {
    let cli = Cli::parse();
    let level = init_logging(cli.verbose);
    log::debug!("{:?}", cli.command);

    if let Err(e) = dispatch(&cli.command, level) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brf_sdr::LnaGain;

    #[test]
    fn test_rx_defaults() {
        let cli = Cli::try_parse_from(["bladerf-tools", "rx", "915M"]).unwrap();
        let Command::Rx(args) = cli.command else {
            panic!("expected rx");
        };
        assert_eq!(args.frequency, 915_000_000);
        assert_eq!(args.file, "-");
        assert_eq!(args.bandwidth, 7_000_000);
        assert_eq!(args.sample_rate, 10_000_000);
        assert_eq!(args.num_buffers, 32);
        assert_eq!(args.num_transfers, 1);
        assert_eq!(args.num_samples, 4096);
        assert_eq!(args.lna_gain, LnaGain::Max);
        assert_eq!(args.vga1_gain, 21);
        assert_eq!(args.vga2_gain, 17);
        assert_eq!(args.squelch, 0.0);
    }

    #[test]
    fn test_rx_negative_squelch() {
        let cli = Cli::try_parse_from(["bladerf-tools", "rx", "100000000", "-q", "-35", "-g", "mid"])
            .unwrap();
        let Command::Rx(args) = cli.command else {
            panic!("expected rx");
        };
        assert_eq!(args.squelch, -35.0);
        assert_eq!(args.lna_gain, LnaGain::Mid);
    }

    #[test]
    fn test_live_fft_defaults() {
        let cli = Cli::try_parse_from(["bladerf-tools", "-v", "live-fft"]).unwrap();
        assert!(cli.verbose);
        let Command::LiveFft(args) = cli.command else {
            panic!("expected live-fft");
        };
        assert_eq!(args.frequency, 440_000_000);
        assert_eq!(args.bandwidth, 28_000_000);
        assert_eq!(args.sample_rate, 40_000_000);
        assert_eq!(args.num_buffers, 16);
        assert_eq!(args.num_transfers, 16);
        assert_eq!(args.num_samples, 65536);
        assert_eq!(args.averaging, 10);
        assert!(args.file.is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["bladerf-tools", "rx"]).is_err());
        assert!(Cli::try_parse_from(["bladerf-tools", "rx", "fast"]).is_err());
        assert!(Cli::try_parse_from(["bladerf-tools", "live-fft", "--window", "blackman"]).is_err());
    }

    #[test]
    fn test_rejects_empty_fft() {
        assert!(Cli::try_parse_from(["bladerf-tools", "live-fft", "-f", "cap.bin", "-l", "0"]).is_err());
        assert!(Cli::try_parse_from(["bladerf-tools", "live-fft", "-l", "1"]).is_ok());
        assert!(Cli::try_parse_from(["bladerf-tools", "sync-fft", "--buffer-size", "1"]).is_err());
        assert!(Cli::try_parse_from(["bladerf-tools", "freq-response", "--num-samples", "0"]).is_err());
    }

    #[cfg(not(feature = "bladerf"))]
    #[test]
    fn test_hardware_commands_need_feature() {
        let cli = Cli::try_parse_from(["bladerf-tools", "selftest"]).unwrap();
        let err = dispatch(&cli.command, log::LevelFilter::Info).unwrap_err();
        assert!(err.contains("--features bladerf"));
    }
}
