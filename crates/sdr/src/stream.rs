// Copyright 2025-2026 CEMAXECUTER LLC

use std::marker::PhantomData;
use std::os::raw::c_void;
use std::ptr;

use crate::config::StreamConfig;
use crate::device::Device;
use crate::error::{check, Error, Result};
use crate::ffi::{self, BladerfDevice, BladerfStream, STREAM_SHUTDOWN};
use crate::metadata::Metadata;
use crate::ring::{BufferSet, Dispatcher};
use crate::types::{Format, Module};

pub use crate::ring::{StreamControl, StreamHandler};

/// Driver-allocated sample buffers, addressed by index.
struct RawBuffers {
    ptrs: Vec<*mut c_void>,
    values_per_buffer: usize,
}

impl RawBuffers {
    fn index_of(&self, p: *mut c_void) -> Option<usize> {
        if p.is_null() {
            return None;
        }
        self.ptrs.iter().position(|&b| b == p)
    }
}

impl BufferSet for RawBuffers {
    fn buffer(&mut self, idx: usize) -> &mut [i16] {
        // SAFETY: each pointer is a driver buffer of `values_per_buffer` i16s,
        // valid until the stream is deinitialized.
        unsafe { std::slice::from_raw_parts_mut(self.ptrs[idx] as *mut i16, self.values_per_buffer) }
    }
}

/// State reachable from the C callback through `user_data`.
struct StreamContext {
    dispatcher: Dispatcher,
    buffers: RawBuffers,
}

unsafe extern "C" fn stream_callback(
    _dev: *mut BladerfDevice,
    _stream: *mut BladerfStream,
    meta: *mut Metadata,
    samples: *mut c_void,
    num_samples: usize,
    user_data: *mut c_void,
) -> *mut c_void {
    let ctx = &mut *(user_data as *mut StreamContext);
    if ctx.buffers.ptrs.is_empty() {
        return STREAM_SHUTDOWN;
    }

    // Non-META formats leave the metadata pointer unset
    let meta = if meta.is_null() { Metadata::default() } else { *meta };
    let completed = ctx.buffers.index_of(samples);

    match ctx
        .dispatcher
        .on_transfer(&meta, completed, num_samples, &mut ctx.buffers)
    {
        Some(idx) => ctx.buffers.ptrs[idx],
        None => STREAM_SHUTDOWN,
    }
}

/// An initialized asynchronous stream. Deinitialized on drop.
pub struct Stream<'a> {
    stream: *mut BladerfStream,
    ctx: *mut StreamContext,
    module: Module,
    control: StreamControl,
    _device: PhantomData<&'a Device>,
}

impl<'a> Stream<'a> {
    pub(crate) fn new(
        device: &'a Device,
        module: Module,
        handler: Box<dyn StreamHandler>,
        config: &StreamConfig,
    ) -> Result<Self> {
        if !matches!(config.format, Format::Sc16Q11 | Format::Sc16Q11Meta) {
            return Err(Error::InvalidArgument(format!(
                "streams carry SC16 samples, not {:?}",
                config.format
            )));
        }
        if config.num_buffers == 0 || config.num_transfers > config.num_buffers {
            return Err(Error::InvalidArgument(format!(
                "more transfers than buffers (buffers={}, transfers={})",
                config.num_buffers, config.num_transfers
            )));
        }

        let dispatcher = Dispatcher::new(handler, module, config.num_buffers, config.num_transfers);
        let control = dispatcher.control();
        let ctx = Box::into_raw(Box::new(StreamContext {
            dispatcher,
            buffers: RawBuffers {
                ptrs: Vec::new(),
                values_per_buffer: config.values_per_buffer(),
            },
        }));

        let mut stream: *mut BladerfStream = ptr::null_mut();
        let mut buffers: *mut *mut c_void = ptr::null_mut();
        let r = unsafe {
            ffi::bladerf_init_stream(
                &mut stream,
                device.raw(),
                stream_callback,
                &mut buffers,
                config.num_buffers,
                config.format.as_raw(),
                config.samples_per_buffer,
                config.num_transfers,
                ctx as *mut c_void,
            )
        };
        if let Err(e) = check(r) {
            unsafe { drop(Box::from_raw(ctx)) };
            return Err(e);
        }

        unsafe {
            (*ctx).buffers.ptrs = (0..config.num_buffers).map(|i| *buffers.add(i)).collect();
        }

        log::debug!(
            "{} stream initialized ({} buffers x {} samples, {} transfers, {:?})",
            module,
            config.num_buffers,
            config.samples_per_buffer,
            config.num_transfers,
            config.format,
        );

        Ok(Self {
            stream,
            ctx,
            module,
            control,
            _device: PhantomData,
        })
    }

    pub fn control(&self) -> StreamControl {
        self.control.clone()
    }

    /// Stream until the handler or a `StreamControl` shuts it down.
    /// The module must already be enabled.
    pub fn run(&mut self) -> Result<()> {
        log::debug!("{} stream running", self.module);
        let r = unsafe { ffi::bladerf_stream(self.stream, self.module.as_raw()) };
        self.control.stop();
        check(r)
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        self.control.stop();
        unsafe {
            ffi::bladerf_deinit_stream(self.stream);
            drop(Box::from_raw(self.ctx));
        }
    }
}
