// Copyright 2025-2026 CEMAXECUTER LLC

//! Round-trip checks against attached hardware.
//!
//! Run with `cargo test -p brf-sdr --features bladerf -- --ignored`.

use brf_sdr::{Device, Format};

#[test]
#[ignore = "requires an attached bladeRF"]
fn test_rx_settings_round_trip() {
    let dev = Device::open("").expect("open device");
    let rx = dev.rx();

    rx.set_frequency(1 << 28).unwrap();
    assert_eq!(rx.frequency().unwrap(), 1 << 28);
    rx.set_bandwidth(1_500_000).unwrap();
    assert_eq!(rx.bandwidth().unwrap(), 1_500_000);
    rx.set_sample_rate(1 << 20).unwrap();
    assert_eq!(rx.sample_rate().unwrap(), 1 << 20);
}

#[test]
#[ignore = "requires an attached bladeRF"]
fn test_tx_settings_round_trip() {
    let dev = Device::open("").expect("open device");
    let tx = dev.tx();

    tx.set_frequency(1_234_000_000).unwrap();
    assert_eq!(tx.frequency().unwrap(), 1_234_000_000);
    tx.set_bandwidth(1_500_000).unwrap();
    assert_eq!(tx.bandwidth().unwrap(), 1_500_000);
    tx.set_sample_rate(1 << 20).unwrap();
    assert_eq!(tx.sample_rate().unwrap(), 1 << 20);
}

#[test]
#[ignore = "requires an attached bladeRF"]
fn test_receive_returns_full_buffer() {
    let dev = Device::open("").expect("open device");
    let rx = dev.rx();
    rx.configure_sync(&Default::default()).unwrap();
    rx.set_enabled(true).unwrap();

    let bytes = rx.receive_bytes(1024, 3500).unwrap();
    assert_eq!(bytes.len(), Format::Sc16Q11.buffer_bytes(1024));
    assert_eq!(bytes.len(), 4096);

    rx.set_enabled(false).unwrap();
}
