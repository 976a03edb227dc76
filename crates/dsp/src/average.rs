// Copyright 2025-2026 CEMAXECUTER LLC

use std::collections::VecDeque;

/// Rolling mean over the most recent `depth` spectra.
///
/// Frames containing NaN or infinity, or of the wrong length, are rejected
/// so one bad capture cannot poison the average.
pub struct SpectrumAverager {
    depth: usize,
    bins: usize,
    frames: VecDeque<Vec<f32>>,
    sum: Vec<f64>,
}

impl SpectrumAverager {
    pub fn new(depth: usize, bins: usize) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            bins,
            frames: VecDeque::with_capacity(depth),
            sum: vec![0.0; bins],
        }
    }

    /// Add a frame, evicting the oldest once full. Returns false if rejected.
    pub fn push(&mut self, frame: Vec<f32>) -> bool {
        if frame.len() != self.bins || frame.iter().any(|v| !v.is_finite()) {
            return false;
        }
        if self.frames.len() == self.depth {
            if let Some(old) = self.frames.pop_front() {
                for (s, v) in self.sum.iter_mut().zip(&old) {
                    *s -= f64::from(*v);
                }
            }
        }
        for (s, v) in self.sum.iter_mut().zip(&frame) {
            *s += f64::from(*v);
        }
        self.frames.push_back(frame);
        true
    }

    /// Current average, or `None` before the first frame.
    pub fn mean(&self) -> Option<Vec<f32>> {
        if self.frames.is_empty() {
            return None;
        }
        let n = self.frames.len() as f64;
        Some(self.sum.iter().map(|s| (s / n) as f32).collect())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.sum.iter_mut().for_each(|s| *s = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean() {
        let mut avg = SpectrumAverager::new(2, 3);
        assert!(avg.mean().is_none());

        assert!(avg.push(vec![1.0, 2.0, 3.0]));
        assert_eq!(avg.mean().unwrap(), vec![1.0, 2.0, 3.0]);

        assert!(avg.push(vec![3.0, 4.0, 5.0]));
        assert_eq!(avg.mean().unwrap(), vec![2.0, 3.0, 4.0]);

        // Oldest frame drops out
        assert!(avg.push(vec![5.0, 6.0, 7.0]));
        assert_eq!(avg.len(), 2);
        assert_eq!(avg.mean().unwrap(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_rejects_bad_frames() {
        let mut avg = SpectrumAverager::new(4, 2);
        assert!(!avg.push(vec![f32::NAN, 0.0]));
        assert!(!avg.push(vec![0.0, f32::NEG_INFINITY]));
        assert!(!avg.push(vec![0.0]));
        assert!(avg.is_empty());

        avg.push(vec![-10.0, -20.0]);
        avg.clear();
        assert!(avg.mean().is_none());
    }
}
