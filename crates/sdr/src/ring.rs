// Copyright 2025-2026 CEMAXECUTER LLC

//! Buffer bookkeeping for asynchronous streams, in terms of buffer indices.
//!
//! The driver owns `num_transfers` buffers at any moment. A buffer handed
//! back to it must never be one it still owns, so the ring tracks which
//! buffers are free rather than assuming a rotation order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::metadata::Metadata;
use crate::types::Module;

/// What a stream callback wants submitted next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Release the completed buffer and submit the next free one.
    Advance,
    /// Resubmit the completed buffer, e.g. to drop a squelched RX buffer.
    Rearm,
    /// Stop the stream.
    Shutdown,
}

/// Free list over a fixed set of stream buffers.
#[derive(Debug, Clone)]
pub struct BufferRing {
    len: usize,
    free: VecDeque<usize>,
}

impl BufferRing {
    /// `in_flight` buffers (`0..in_flight`) are already owned by the driver.
    pub fn new(len: usize, in_flight: usize) -> Self {
        assert!(len > 0, "buffer ring needs at least one buffer");
        Self {
            len,
            free: (in_flight.min(len)..len).collect(),
        }
    }

    /// Buffers not currently owned by the driver.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Return a buffer the driver is done with.
    pub fn release(&mut self, idx: usize) {
        if idx < self.len && !self.free.contains(&idx) {
            self.free.push_back(idx);
        }
    }

    /// Claim the oldest free buffer.
    pub fn take(&mut self) -> Option<usize> {
        self.free.pop_front()
    }

    /// Index of the buffer to submit after `completed` came back, or `None`
    /// to shut down.
    pub fn next_for(&mut self, completed: Option<usize>, disposition: Disposition) -> Option<usize> {
        match disposition {
            Disposition::Shutdown => None,
            Disposition::Rearm => completed.or_else(|| self.take()),
            Disposition::Advance => {
                if let Some(idx) = completed {
                    self.release(idx);
                }
                self.take()
            }
        }
    }
}

/// Receives every completed transfer of an asynchronous stream.
///
/// Runs on the driver's stream thread. For RX, `samples` is the buffer that
/// was just filled and the return value decides whether it is resubmitted.
/// For TX, `samples` is the buffer about to be submitted and must be filled
/// in place; `Rearm` and `Advance` both submit it.
pub trait StreamHandler: Send {
    fn on_buffer(&mut self, meta: &Metadata, samples: &mut [i16]) -> Disposition;
}

impl<F> StreamHandler for F
where
    F: FnMut(&Metadata, &mut [i16]) -> Disposition + Send,
{
    fn on_buffer(&mut self, meta: &Metadata, samples: &mut [i16]) -> Disposition {
        self(meta, samples)
    }
}

/// Cloneable stop switch for a running stream.
#[derive(Debug, Clone)]
pub struct StreamControl {
    running: Arc<AtomicBool>,
}

impl StreamControl {
    /// The next callback returns the shutdown sentinel and the stream ends.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Sample memory of a stream's buffers, by index.
pub trait BufferSet {
    fn buffer(&mut self, idx: usize) -> &mut [i16];
}

impl BufferSet for Vec<Vec<i16>> {
    fn buffer(&mut self, idx: usize) -> &mut [i16] {
        &mut self[idx]
    }
}

/// Per-callback decisions of one stream: which buffer the handler sees and
/// which buffer goes back to the driver.
pub struct Dispatcher {
    handler: Box<dyn StreamHandler>,
    ring: BufferRing,
    module: Module,
    running: Arc<AtomicBool>,
}

impl Dispatcher {
    /// RX streams start with `num_transfers` buffers submitted by the driver;
    /// TX streams ask for every buffer through the callback.
    pub fn new(
        handler: Box<dyn StreamHandler>,
        module: Module,
        num_buffers: usize,
        num_transfers: usize,
    ) -> Self {
        let in_flight = match module {
            Module::Rx => num_transfers,
            Module::Tx => 0,
        };
        Self {
            handler,
            ring: BufferRing::new(num_buffers, in_flight),
            module,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn control(&self) -> StreamControl {
        StreamControl {
            running: self.running.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Handle one callback. `completed` is the buffer the driver returned
    /// (`None` when it passed no buffer) holding `num_samples` samples.
    /// Returns the buffer to submit next, or `None` to shut down.
    pub fn on_transfer<B: BufferSet>(
        &mut self,
        meta: &Metadata,
        completed: Option<usize>,
        num_samples: usize,
        buffers: &mut B,
    ) -> Option<usize> {
        if !self.is_running() {
            return None;
        }

        let next = match self.module {
            Module::Rx => {
                let disposition = match completed {
                    Some(idx) => {
                        let buf = buffers.buffer(idx);
                        let len = (num_samples * 2).min(buf.len());
                        self.handler.on_buffer(meta, &mut buf[..len])
                    }
                    None => Disposition::Advance,
                };
                self.ring.next_for(completed, disposition)
            }
            Module::Tx => {
                if let Some(idx) = completed {
                    self.ring.release(idx);
                }
                self.ring.take().and_then(|idx| {
                    match self.handler.on_buffer(meta, buffers.buffer(idx)) {
                        Disposition::Shutdown => None,
                        Disposition::Advance | Disposition::Rearm => Some(idx),
                    }
                })
            }
        };

        if next.is_none() {
            self.running.store(false, Ordering::SeqCst);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Driver model: owns `in_flight`, completes the oldest first and
    /// submits whatever the callback returns.
    struct Driver {
        in_flight: VecDeque<usize>,
    }

    impl Driver {
        fn new(num_transfers: usize) -> Self {
            Self {
                in_flight: (0..num_transfers).collect(),
            }
        }

        fn complete(&mut self) -> usize {
            self.in_flight.pop_front().unwrap()
        }

        fn submit(&mut self, idx: usize) {
            assert!(
                !self.in_flight.contains(&idx),
                "buffer {} submitted while still in flight {:?}",
                idx,
                self.in_flight
            );
            self.in_flight.push_back(idx);
        }
    }

    fn run_rx(num_buffers: usize, num_transfers: usize, pattern: &[Disposition]) {
        let mut ring = BufferRing::new(num_buffers, num_transfers);
        let mut driver = Driver::new(num_transfers);
        for step in 0..num_buffers * 4 {
            let done = driver.complete();
            let disposition = pattern[step % pattern.len()];
            let next = ring.next_for(Some(done), disposition).unwrap();
            if disposition == Disposition::Rearm {
                assert_eq!(next, done);
            }
            driver.submit(next);
        }
    }

    #[test]
    fn test_never_resubmits_in_flight_buffers() {
        use Disposition::{Advance, Rearm};
        // live-fft defaults and rx with several transfers
        run_rx(16, 16, &[Advance]);
        run_rx(32, 4, &[Advance]);
        run_rx(32, 1, &[Advance]);
        run_rx(2, 1, &[Advance, Rearm, Rearm]);
        run_rx(16, 16, &[Advance, Rearm]);
        run_rx(8, 3, &[Rearm, Advance, Advance]);
    }

    #[test]
    fn test_first_advance_skips_submitted_buffers() {
        let mut ring = BufferRing::new(4, 2);
        assert_eq!(ring.free_count(), 2);
        assert_eq!(ring.next_for(Some(0), Disposition::Advance), Some(2));
        assert_eq!(ring.next_for(Some(1), Disposition::Advance), Some(3));
        assert_eq!(ring.next_for(Some(2), Disposition::Advance), Some(0));
        assert_eq!(ring.next_for(Some(3), Disposition::Shutdown), None);
    }

    #[test]
    fn test_release_ignores_duplicates() {
        let mut ring = BufferRing::new(3, 3);
        ring.release(1);
        ring.release(1);
        ring.release(7);
        assert_eq!(ring.free_count(), 1);
        assert_eq!(ring.take(), Some(1));
        assert_eq!(ring.take(), None);
    }

    #[test]
    #[should_panic]
    fn test_empty_ring_panics() {
        let _ = BufferRing::new(0, 0);
    }

    fn buffers(n: usize, len: usize) -> Vec<Vec<i16>> {
        (0..n).map(|i| vec![i as i16; len]).collect()
    }

    #[test]
    fn test_rx_dispatch_shows_completed_buffer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let handler = move |_meta: &Metadata, samples: &mut [i16]| -> Disposition {
            log.lock().unwrap().push((samples[0], samples.len()));
            if samples[0] == 1 {
                Disposition::Rearm
            } else {
                Disposition::Advance
            }
        };
        let mut bufs = buffers(4, 8);
        let mut d = Dispatcher::new(Box::new(handler), Module::Rx, 4, 2);
        let meta = Metadata::default();

        assert_eq!(d.on_transfer(&meta, Some(0), 4, &mut bufs), Some(2));
        // Squelched buffer goes straight back
        assert_eq!(d.on_transfer(&meta, Some(1), 4, &mut bufs), Some(1));
        // Driver passed nothing: hand out a free buffer without calling the handler
        assert_eq!(d.on_transfer(&meta, None, 0, &mut bufs), Some(3));

        assert_eq!(*seen.lock().unwrap(), vec![(0, 8), (1, 8)]);
    }

    #[test]
    fn test_tx_dispatch_fills_buffer_before_submit() {
        let mut count = 0i16;
        let handler = move |_meta: &Metadata, samples: &mut [i16]| -> Disposition {
            count += 1;
            samples.iter_mut().for_each(|s| *s = 100 + count);
            if count == 4 {
                Disposition::Shutdown
            } else {
                Disposition::Advance
            }
        };
        let mut bufs = buffers(2, 4);
        let mut d = Dispatcher::new(Box::new(handler), Module::Tx, 2, 2);
        let meta = Metadata::default();

        // Initial requests claim every buffer in turn
        assert_eq!(d.on_transfer(&meta, None, 0, &mut bufs), Some(0));
        assert_eq!(d.on_transfer(&meta, None, 0, &mut bufs), Some(1));
        assert_eq!(bufs[0], vec![101; 4]);
        assert_eq!(bufs[1], vec![102; 4]);
        // No buffer free until one completes
        assert_eq!(d.on_transfer(&meta, Some(0), 4, &mut bufs), Some(0));
        assert_eq!(bufs[0], vec![103; 4]);
        assert!(d.is_running());

        assert_eq!(d.on_transfer(&meta, Some(1), 4, &mut bufs), None);
        assert!(!d.is_running());
    }

    #[test]
    fn test_stop_shuts_down_next_callback() {
        let handler = |_meta: &Metadata, _samples: &mut [i16]| -> Disposition { Disposition::Advance };
        let mut bufs = buffers(4, 4);
        let mut d = Dispatcher::new(Box::new(handler), Module::Rx, 4, 1);
        let control = d.control();
        let meta = Metadata::default();

        assert_eq!(d.on_transfer(&meta, Some(0), 2, &mut bufs), Some(1));
        control.stop();
        assert!(!control.is_running());
        assert_eq!(d.on_transfer(&meta, Some(1), 2, &mut bufs), None);
    }

    #[test]
    fn test_handler_shutdown_stops_stream() {
        let handler = |_meta: &Metadata, _samples: &mut [i16]| -> Disposition { Disposition::Shutdown };
        let mut bufs = buffers(2, 4);
        let mut d = Dispatcher::new(Box::new(handler), Module::Rx, 2, 1);
        let control = d.control();
        assert_eq!(d.on_transfer(&Metadata::default(), Some(0), 2, &mut bufs), None);
        assert!(!control.is_running());
    }
}
