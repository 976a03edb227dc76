// Copyright 2025-2026 CEMAXECUTER LLC

// libbladeRF C API (manual, limited to what the bindings use).
// Enumerations cross the boundary as c_int; see `types`.

use std::os::raw::{c_char, c_int, c_uint, c_void};

use crate::metadata::Metadata;

pub type BladerfDevice = c_void;
pub type BladerfStream = c_void;

pub const SERIAL_LENGTH: usize = 33;
pub const DESCRIPTION_LENGTH: usize = 33;

/// Returned from a stream callback to end the stream.
pub const STREAM_SHUTDOWN: *mut c_void = std::ptr::null_mut();

#[repr(C)]
pub struct BladerfDevinfo {
    pub backend: c_int,
    pub serial: [c_char; SERIAL_LENGTH],
    pub usb_bus: u8,
    pub usb_addr: u8,
    pub instance: c_uint,
    pub manufacturer: [c_char; DESCRIPTION_LENGTH],
    pub product: [c_char; DESCRIPTION_LENGTH],
}

#[repr(C)]
pub struct BladerfVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub describe: *const c_char,
}

pub type BladerfStreamCb = unsafe extern "C" fn(
    dev: *mut BladerfDevice,
    stream: *mut BladerfStream,
    meta: *mut Metadata,
    samples: *mut c_void,
    num_samples: usize,
    user_data: *mut c_void,
) -> *mut c_void;

extern "C" {
    // Library
    pub fn bladerf_version(version: *mut BladerfVersion);
    pub fn bladerf_log_set_verbosity(level: c_int);
    pub fn bladerf_strerror(error: c_int) -> *const c_char;

    // Discovery and lifetime
    pub fn bladerf_get_device_list(devices: *mut *mut BladerfDevinfo) -> c_int;
    pub fn bladerf_free_device_list(devices: *mut BladerfDevinfo);
    pub fn bladerf_open(device: *mut *mut BladerfDevice, identifier: *const c_char) -> c_int;
    pub fn bladerf_close(device: *mut BladerfDevice);

    // Device information
    pub fn bladerf_get_serial(dev: *mut BladerfDevice, serial: *mut c_char) -> c_int;
    pub fn bladerf_get_board_name(dev: *mut BladerfDevice) -> *const c_char;
    pub fn bladerf_is_fpga_configured(dev: *mut BladerfDevice) -> c_int;

    // Module control
    pub fn bladerf_enable_module(dev: *mut BladerfDevice, module: c_int, enable: bool) -> c_int;
    pub fn bladerf_set_frequency(dev: *mut BladerfDevice, module: c_int, frequency: u64) -> c_int;
    pub fn bladerf_get_frequency(dev: *mut BladerfDevice, module: c_int, frequency: *mut u64) -> c_int;
    pub fn bladerf_select_band(dev: *mut BladerfDevice, module: c_int, frequency: u64) -> c_int;
    pub fn bladerf_set_sample_rate(
        dev: *mut BladerfDevice,
        module: c_int,
        rate: c_uint,
        actual: *mut c_uint,
    ) -> c_int;
    pub fn bladerf_get_sample_rate(dev: *mut BladerfDevice, module: c_int, rate: *mut c_uint) -> c_int;
    pub fn bladerf_set_bandwidth(
        dev: *mut BladerfDevice,
        module: c_int,
        bandwidth: c_uint,
        actual: *mut c_uint,
    ) -> c_int;
    pub fn bladerf_get_bandwidth(dev: *mut BladerfDevice, module: c_int, bandwidth: *mut c_uint) -> c_int;
    pub fn bladerf_set_lpf_mode(dev: *mut BladerfDevice, module: c_int, mode: c_int) -> c_int;
    pub fn bladerf_get_lpf_mode(dev: *mut BladerfDevice, module: c_int, mode: *mut c_int) -> c_int;
    pub fn bladerf_get_timestamp(dev: *mut BladerfDevice, direction: c_int, value: *mut u64) -> c_int;
    pub fn bladerf_set_stream_timeout(dev: *mut BladerfDevice, direction: c_int, timeout: c_uint) -> c_int;
    pub fn bladerf_get_stream_timeout(dev: *mut BladerfDevice, direction: c_int, timeout: *mut c_uint) -> c_int;

    // Sampling and gain stages
    pub fn bladerf_set_sampling(dev: *mut BladerfDevice, sampling: c_int) -> c_int;
    pub fn bladerf_get_sampling(dev: *mut BladerfDevice, sampling: *mut c_int) -> c_int;
    pub fn bladerf_set_lna_gain(dev: *mut BladerfDevice, gain: c_int) -> c_int;
    pub fn bladerf_get_lna_gain(dev: *mut BladerfDevice, gain: *mut c_int) -> c_int;
    pub fn bladerf_set_rxvga1(dev: *mut BladerfDevice, gain: c_int) -> c_int;
    pub fn bladerf_get_rxvga1(dev: *mut BladerfDevice, gain: *mut c_int) -> c_int;
    pub fn bladerf_set_rxvga2(dev: *mut BladerfDevice, gain: c_int) -> c_int;
    pub fn bladerf_get_rxvga2(dev: *mut BladerfDevice, gain: *mut c_int) -> c_int;
    pub fn bladerf_set_txvga1(dev: *mut BladerfDevice, gain: c_int) -> c_int;
    pub fn bladerf_get_txvga1(dev: *mut BladerfDevice, gain: *mut c_int) -> c_int;
    pub fn bladerf_set_txvga2(dev: *mut BladerfDevice, gain: c_int) -> c_int;
    pub fn bladerf_get_txvga2(dev: *mut BladerfDevice, gain: *mut c_int) -> c_int;

    // Calibration and correction
    pub fn bladerf_calibrate_dc(dev: *mut BladerfDevice, module: c_int) -> c_int;
    pub fn bladerf_set_correction(dev: *mut BladerfDevice, module: c_int, corr: c_int, value: i16) -> c_int;
    pub fn bladerf_get_correction(dev: *mut BladerfDevice, module: c_int, corr: c_int, value: *mut i16) -> c_int;

    // Expansion boards
    pub fn bladerf_expansion_attach(dev: *mut BladerfDevice, xb: c_int) -> c_int;
    pub fn bladerf_expansion_get_attached(dev: *mut BladerfDevice, xb: *mut c_int) -> c_int;
    pub fn bladerf_xb200_set_filterbank(dev: *mut BladerfDevice, module: c_int, filter: c_int) -> c_int;
    pub fn bladerf_xb200_get_filterbank(dev: *mut BladerfDevice, module: c_int, filter: *mut c_int) -> c_int;
    pub fn bladerf_xb200_set_path(dev: *mut BladerfDevice, module: c_int, path: c_int) -> c_int;
    pub fn bladerf_xb200_get_path(dev: *mut BladerfDevice, module: c_int, path: *mut c_int) -> c_int;

    // Synchronous interface
    pub fn bladerf_sync_config(
        dev: *mut BladerfDevice,
        layout: c_int,
        format: c_int,
        num_buffers: c_uint,
        buffer_size: c_uint,
        num_transfers: c_uint,
        stream_timeout: c_uint,
    ) -> c_int;
    pub fn bladerf_sync_rx(
        dev: *mut BladerfDevice,
        samples: *mut c_void,
        num_samples: c_uint,
        metadata: *mut Metadata,
        timeout_ms: c_uint,
    ) -> c_int;
    pub fn bladerf_sync_tx(
        dev: *mut BladerfDevice,
        samples: *const c_void,
        num_samples: c_uint,
        metadata: *mut Metadata,
        timeout_ms: c_uint,
    ) -> c_int;

    // Asynchronous interface
    pub fn bladerf_init_stream(
        stream: *mut *mut BladerfStream,
        dev: *mut BladerfDevice,
        callback: BladerfStreamCb,
        buffers: *mut *mut *mut c_void,
        num_buffers: usize,
        format: c_int,
        samples_per_buffer: usize,
        num_transfers: usize,
        user_data: *mut c_void,
    ) -> c_int;
    pub fn bladerf_stream(stream: *mut BladerfStream, layout: c_int) -> c_int;
    pub fn bladerf_deinit_stream(stream: *mut BladerfStream);
}
