// Copyright 2025-2026 CEMAXECUTER LLC

use clap::Args;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Open this device and print its settings; empty picks the first one
    #[arg(short = 'd', long)]
    pub device: Option<String>,

    /// Only list devices
    #[arg(long)]
    pub list: bool,
}

#[cfg(feature = "bladerf")]
pub fn run(args: &ProbeArgs) -> Result<(), String> {
    use brf_sdr::device::{self, Device};

    println!("libbladeRF {}", device::library_version());

    let devices = device::list_devices().map_err(|e| format!("failed to list devices: {}", e))?;
    if devices.is_empty() {
        println!("no bladeRF devices found");
        return match args.device {
            Some(ref id) if !id.is_empty() => Err(format!("device '{}' not found", id)),
            _ => Ok(()),
        };
    }
    for d in &devices {
        println!(
            "  {} bus {} addr {} instance {} ({} {})",
            d.serial, d.usb_bus, d.usb_addr, d.instance, d.manufacturer, d.product
        );
    }
    if args.list {
        return Ok(());
    }

    let id = args.device.clone().unwrap_or_default();
    let dev = Device::open(&id).map_err(|e| format!("failed to open device: {}", e))?;
    let serial = dev.serial().map_err(|e| e.to_string())?;
    println!("\n{} ({})", dev.board_name(), serial);
    match dev.is_fpga_configured() {
        Ok(loaded) => println!("  FPGA loaded:     {}", if loaded { "yes" } else { "no" }),
        Err(e) => println!("  FPGA loaded:     unknown ({})", e),
    }
    match dev.expansion_attached() {
        Ok(xb) => println!("  expansion board: {:?}", xb),
        Err(e) => println!("  expansion board: unknown ({})", e),
    }
    if let Ok(gain) = dev.lna_gain() {
        println!("  LNA gain:        {:?}", gain);
    }

    for ch in [dev.rx(), dev.tx()] {
        let freq = ch.frequency().map_err(|e| format!("{} frequency: {}", ch.module(), e))?;
        let bw = ch.bandwidth().map_err(|e| format!("{} bandwidth: {}", ch.module(), e))?;
        let rate = ch.sample_rate().map_err(|e| format!("{} sample rate: {}", ch.module(), e))?;
        println!(
            "  {}: {} Hz, bw {} Hz, {} S/s",
            ch.module(),
            freq,
            bw,
            rate
        );
    }
    Ok(())
}
