// Copyright 2025-2026 CEMAXECUTER LLC

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr;

use crate::config::{StreamConfig, SyncConfig};
use crate::error::{check, Error, Result};
use crate::ffi::{self, BladerfDevice, BladerfDevinfo, BladerfVersion};
use crate::metadata::Metadata;
use crate::stream::{Stream, StreamHandler};
use crate::types::{
    CalModule, Correction, ExpansionBoard, Format, LnaGain, LogLevel, LpfMode, Module, Sampling,
    Xb200Filter, Xb200Path,
};

const BLADERF_ERR_NODEV: c_int = -7;

fn c_chars_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// SAFETY: `p` must be null or a NUL-terminated string owned by libbladeRF.
unsafe fn c_str_to_string(p: *const c_char) -> String {
    if p.is_null() {
        String::new()
    } else {
        CStr::from_ptr(p).to_string_lossy().into_owned()
    }
}

/// libbladeRF's own description of a return code.
pub fn strerror(code: c_int) -> String {
    unsafe { c_str_to_string(ffi::bladerf_strerror(code)) }
}

/// Version of the linked libbladeRF, e.g. "2.5.0".
pub fn library_version() -> String {
    let mut v = BladerfVersion {
        major: 0,
        minor: 0,
        patch: 0,
        describe: ptr::null(),
    };
    unsafe {
        ffi::bladerf_version(&mut v);
        let describe = c_str_to_string(v.describe);
        if describe.is_empty() {
            format!("{}.{}.{}", v.major, v.minor, v.patch)
        } else {
            describe
        }
    }
}

/// Set the driver's internal log verbosity.
pub fn set_log_level(level: LogLevel) {
    unsafe { ffi::bladerf_log_set_verbosity(level.as_raw()) }
}

/// A device found by `list_devices`.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub backend: i32,
    pub serial: String,
    pub usb_bus: u8,
    pub usb_addr: u8,
    pub instance: u32,
    pub manufacturer: String,
    pub product: String,
}

impl DeviceInfo {
    /// Identifier string that opens exactly this device.
    pub fn identifier(&self) -> String {
        format!("*:serial={}", self.serial)
    }
}

/// List attached devices. No devices is an empty list, not an error.
pub fn list_devices() -> Result<Vec<DeviceInfo>> {
    let mut devs: *mut BladerfDevinfo = ptr::null_mut();
    let count = unsafe { ffi::bladerf_get_device_list(&mut devs) };

    if count == BLADERF_ERR_NODEV {
        return Ok(Vec::new());
    }
    if count < 0 {
        return Err(Error::from_code(count));
    }
    if devs.is_null() {
        return Ok(Vec::new());
    }

    let mut devices = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let dev = unsafe { &*devs.add(i) };
        devices.push(DeviceInfo {
            backend: dev.backend,
            serial: c_chars_to_string(&dev.serial),
            usb_bus: dev.usb_bus,
            usb_addr: dev.usb_addr,
            instance: dev.instance,
            manufacturer: c_chars_to_string(&dev.manufacturer),
            product: c_chars_to_string(&dev.product),
        });
    }

    unsafe { ffi::bladerf_free_device_list(devs) };
    Ok(devices)
}

/// An open bladeRF. Closed on drop.
pub struct Device {
    dev: *mut BladerfDevice,
}

// libbladeRF serializes access to a device handle internally.
unsafe impl Send for Device {}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").field("dev", &self.dev).finish()
    }
}

impl Device {
    /// Open a device by identifier, e.g. `*:serial=...` or `*:instance=0`.
    /// An empty identifier opens the first device found.
    pub fn open(identifier: &str) -> Result<Self> {
        let id = if identifier.is_empty() {
            None
        } else {
            Some(
                CString::new(identifier)
                    .map_err(|_| Error::InvalidArgument(format!("identifier contains NUL: {:?}", identifier)))?,
            )
        };

        let mut dev: *mut BladerfDevice = ptr::null_mut();
        let r = unsafe {
            ffi::bladerf_open(&mut dev, id.as_ref().map_or(ptr::null(), |s| s.as_ptr()))
        };
        check(r)?;

        log::debug!("bladeRF opened ({})", if identifier.is_empty() { "first available" } else { identifier });
        Ok(Self { dev })
    }

    pub(crate) fn raw(&self) -> *mut BladerfDevice {
        self.dev
    }

    pub fn rx(&self) -> Channel<'_> {
        Channel { device: self, module: Module::Rx }
    }

    pub fn tx(&self) -> Channel<'_> {
        Channel { device: self, module: Module::Tx }
    }

    pub fn channel(&self, module: Module) -> Channel<'_> {
        Channel { device: self, module }
    }

    pub fn serial(&self) -> Result<String> {
        let mut buf = [0 as c_char; ffi::SERIAL_LENGTH];
        check(unsafe { ffi::bladerf_get_serial(self.dev, buf.as_mut_ptr()) })?;
        Ok(c_chars_to_string(&buf))
    }

    pub fn board_name(&self) -> String {
        unsafe { c_str_to_string(ffi::bladerf_get_board_name(self.dev)) }
    }

    pub fn is_fpga_configured(&self) -> Result<bool> {
        let r = unsafe { ffi::bladerf_is_fpga_configured(self.dev) };
        if r < 0 {
            return Err(Error::from_code(r));
        }
        Ok(r > 0)
    }

    pub fn lna_gain(&self) -> Result<LnaGain> {
        let mut gain: c_int = 0;
        check(unsafe { ffi::bladerf_get_lna_gain(self.dev, &mut gain) })?;
        LnaGain::try_from(gain)
    }

    pub fn set_lna_gain(&self, gain: LnaGain) -> Result<()> {
        check(unsafe { ffi::bladerf_set_lna_gain(self.dev, gain.as_raw()) })
    }

    pub fn sampling(&self) -> Result<Sampling> {
        let mut sampling: c_int = 0;
        check(unsafe { ffi::bladerf_get_sampling(self.dev, &mut sampling) })?;
        Sampling::try_from(sampling)
    }

    pub fn set_sampling(&self, sampling: Sampling) -> Result<()> {
        check(unsafe { ffi::bladerf_set_sampling(self.dev, sampling.as_raw()) })
    }

    pub fn expansion_attach(&self, xb: ExpansionBoard) -> Result<()> {
        check(unsafe { ffi::bladerf_expansion_attach(self.dev, xb.as_raw()) })
    }

    pub fn expansion_attached(&self) -> Result<ExpansionBoard> {
        let mut xb: c_int = 0;
        check(unsafe { ffi::bladerf_expansion_get_attached(self.dev, &mut xb) })?;
        ExpansionBoard::try_from(xb)
    }

    /// Run the driver's DC offset calibration for one block.
    pub fn calibrate_dc(&self, module: CalModule) -> Result<()> {
        check(unsafe { ffi::bladerf_calibrate_dc(self.dev, module.as_raw()) })
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe { ffi::bladerf_close(self.dev) };
        log::debug!("bladeRF closed");
    }
}

/// One signal chain (RX or TX) of an open device.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    device: &'a Device,
    module: Module,
}

impl<'a> Channel<'a> {
    pub fn module(&self) -> Module {
        self.module
    }

    pub fn device(&self) -> &'a Device {
        self.device
    }

    fn dev(&self) -> *mut BladerfDevice {
        self.device.raw()
    }

    fn ch(&self) -> c_int {
        self.module.as_raw()
    }

    pub fn set_enabled(&self, enable: bool) -> Result<()> {
        check(unsafe { ffi::bladerf_enable_module(self.dev(), self.ch(), enable) })
    }

    pub fn frequency(&self) -> Result<u64> {
        let mut freq: u64 = 0;
        check(unsafe { ffi::bladerf_get_frequency(self.dev(), self.ch(), &mut freq) })?;
        Ok(freq)
    }

    pub fn set_frequency(&self, hz: u64) -> Result<()> {
        check(unsafe { ffi::bladerf_set_frequency(self.dev(), self.ch(), hz) })
    }

    /// Switch the RF band (low/high) without retuning.
    pub fn select_band(&self, hz: u64) -> Result<()> {
        check(unsafe { ffi::bladerf_select_band(self.dev(), self.ch(), hz) })
    }

    pub fn bandwidth(&self) -> Result<u32> {
        let mut bw: c_uint = 0;
        check(unsafe { ffi::bladerf_get_bandwidth(self.dev(), self.ch(), &mut bw) })?;
        Ok(bw)
    }

    /// Returns the bandwidth actually selected.
    pub fn set_bandwidth(&self, hz: u32) -> Result<u32> {
        let mut actual: c_uint = 0;
        check(unsafe { ffi::bladerf_set_bandwidth(self.dev(), self.ch(), hz, &mut actual) })?;
        Ok(actual)
    }

    pub fn sample_rate(&self) -> Result<u32> {
        let mut rate: c_uint = 0;
        check(unsafe { ffi::bladerf_get_sample_rate(self.dev(), self.ch(), &mut rate) })?;
        Ok(rate)
    }

    /// Returns the rate actually selected.
    pub fn set_sample_rate(&self, rate: u32) -> Result<u32> {
        let mut actual: c_uint = 0;
        check(unsafe { ffi::bladerf_set_sample_rate(self.dev(), self.ch(), rate, &mut actual) })?;
        Ok(actual)
    }

    pub fn lpf_mode(&self) -> Result<LpfMode> {
        let mut mode: c_int = 0;
        check(unsafe { ffi::bladerf_get_lpf_mode(self.dev(), self.ch(), &mut mode) })?;
        LpfMode::try_from(mode)
    }

    pub fn set_lpf_mode(&self, mode: LpfMode) -> Result<()> {
        check(unsafe { ffi::bladerf_set_lpf_mode(self.dev(), self.ch(), mode.as_raw()) })
    }

    /// RXVGA1 or TXVGA1 gain, depending on the module.
    pub fn vga1(&self) -> Result<i32> {
        let mut gain: c_int = 0;
        let r = unsafe {
            match self.module {
                Module::Rx => ffi::bladerf_get_rxvga1(self.dev(), &mut gain),
                Module::Tx => ffi::bladerf_get_txvga1(self.dev(), &mut gain),
            }
        };
        check(r)?;
        Ok(gain)
    }

    pub fn set_vga1(&self, gain: i32) -> Result<()> {
        check(unsafe {
            match self.module {
                Module::Rx => ffi::bladerf_set_rxvga1(self.dev(), gain),
                Module::Tx => ffi::bladerf_set_txvga1(self.dev(), gain),
            }
        })
    }

    /// RXVGA2 or TXVGA2 gain, depending on the module.
    pub fn vga2(&self) -> Result<i32> {
        let mut gain: c_int = 0;
        let r = unsafe {
            match self.module {
                Module::Rx => ffi::bladerf_get_rxvga2(self.dev(), &mut gain),
                Module::Tx => ffi::bladerf_get_txvga2(self.dev(), &mut gain),
            }
        };
        check(r)?;
        Ok(gain)
    }

    pub fn set_vga2(&self, gain: i32) -> Result<()> {
        check(unsafe {
            match self.module {
                Module::Rx => ffi::bladerf_set_rxvga2(self.dev(), gain),
                Module::Tx => ffi::bladerf_set_txvga2(self.dev(), gain),
            }
        })
    }

    /// Current hardware sample counter of this module.
    pub fn timestamp(&self) -> Result<u64> {
        let mut ts: u64 = 0;
        check(unsafe { ffi::bladerf_get_timestamp(self.dev(), self.ch(), &mut ts) })?;
        Ok(ts)
    }

    pub fn correction(&self, corr: Correction) -> Result<i16> {
        let mut value: i16 = 0;
        check(unsafe { ffi::bladerf_get_correction(self.dev(), self.ch(), corr.as_raw(), &mut value) })?;
        Ok(value)
    }

    pub fn set_correction(&self, corr: Correction, value: i16) -> Result<()> {
        check(unsafe { ffi::bladerf_set_correction(self.dev(), self.ch(), corr.as_raw(), value) })
    }

    pub fn xb200_filterbank(&self) -> Result<Xb200Filter> {
        let mut filter: c_int = 0;
        check(unsafe { ffi::bladerf_xb200_get_filterbank(self.dev(), self.ch(), &mut filter) })?;
        Xb200Filter::try_from(filter)
    }

    pub fn set_xb200_filterbank(&self, filter: Xb200Filter) -> Result<()> {
        check(unsafe { ffi::bladerf_xb200_set_filterbank(self.dev(), self.ch(), filter.as_raw()) })
    }

    pub fn xb200_path(&self) -> Result<Xb200Path> {
        let mut path: c_int = 0;
        check(unsafe { ffi::bladerf_xb200_get_path(self.dev(), self.ch(), &mut path) })?;
        Xb200Path::try_from(path)
    }

    pub fn set_xb200_path(&self, path: Xb200Path) -> Result<()> {
        check(unsafe { ffi::bladerf_xb200_set_path(self.dev(), self.ch(), path.as_raw()) })
    }

    pub fn stream_timeout(&self) -> Result<u32> {
        let mut timeout: c_uint = 0;
        check(unsafe { ffi::bladerf_get_stream_timeout(self.dev(), self.ch(), &mut timeout) })?;
        Ok(timeout)
    }

    pub fn set_stream_timeout(&self, timeout_ms: u32) -> Result<()> {
        check(unsafe { ffi::bladerf_set_stream_timeout(self.dev(), self.ch(), timeout_ms) })
    }

    /// Configure the synchronous interface for this module.
    pub fn configure_sync(&self, config: &SyncConfig) -> Result<()> {
        log::debug!("{} sync config: {:?}", self.module, config);
        check(unsafe {
            ffi::bladerf_sync_config(
                self.dev(),
                self.ch(),
                config.format.as_raw(),
                config.num_buffers,
                config.buffer_size,
                config.num_transfers,
                config.timeout_ms,
            )
        })
    }

    /// Receive `samples.len() / 2` complex samples into an SC16 buffer.
    pub fn receive(&self, samples: &mut [i16], metadata: Option<&mut Metadata>, timeout_ms: u32) -> Result<()> {
        let num_samples = iq_count(samples.len())?;
        let meta = metadata.map_or(ptr::null_mut(), |m| m as *mut Metadata);
        check(unsafe {
            ffi::bladerf_sync_rx(
                self.dev(),
                samples.as_mut_ptr() as *mut c_void,
                num_samples,
                meta,
                timeout_ms,
            )
        })
    }

    /// Transmit interleaved SC16 samples.
    pub fn transmit(&self, samples: &[i16], metadata: Option<&mut Metadata>, timeout_ms: u32) -> Result<()> {
        let num_samples = iq_count(samples.len())?;
        let meta = metadata.map_or(ptr::null_mut(), |m| m as *mut Metadata);
        check(unsafe {
            ffi::bladerf_sync_tx(
                self.dev(),
                samples.as_ptr() as *const c_void,
                num_samples,
                meta,
                timeout_ms,
            )
        })
    }

    /// Receive `num_samples` SC16 samples as raw little-endian bytes.
    pub fn receive_bytes(&self, num_samples: usize, timeout_ms: u32) -> Result<Vec<u8>> {
        let mut samples = vec![0i16; num_samples * 2];
        self.receive(&mut samples, None, timeout_ms)?;
        let bytes = crate::samples::sc16_to_bytes(&samples);
        debug_assert_eq!(bytes.len(), Format::Sc16Q11.buffer_bytes(num_samples));
        Ok(bytes)
    }

    /// Set up an asynchronous stream on this module. Nothing moves until
    /// `Stream::run` is called.
    pub fn stream<H: StreamHandler + 'static>(&self, handler: H, config: &StreamConfig) -> Result<Stream<'a>> {
        Stream::new(self.device, self.module, Box::new(handler), config)
    }
}

fn iq_count(values: usize) -> Result<c_uint> {
    if values % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "interleaved I/Q buffer has odd length {}",
            values
        )));
    }
    c_uint::try_from(values / 2)
        .map_err(|_| Error::InvalidArgument(format!("{} samples exceed one transfer", values / 2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iq_count() {
        assert_eq!(iq_count(2048), Ok(1024));
        assert!(matches!(iq_count(3), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_c_chars_stop_at_nul() {
        let raw: Vec<c_char> = b"abc\0def".iter().map(|&b| b as c_char).collect();
        assert_eq!(c_chars_to_string(&raw), "abc");
    }
}
