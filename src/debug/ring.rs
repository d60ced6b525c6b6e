/// Fixed-capacity rolling window of frame times (seconds).
/// Pre-allocated, no heap allocs after init.
pub struct FrameHistory {
    buf: Vec<f64>,
    head: usize,
    len: usize,
}

/// Aggregate over the frames currently in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub fps: f64,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, dt: f64) {
        let cap = self.buf.len();
        self.buf[self.head] = dt;
        self.head = (self.head + 1) % cap;
        if self.len < cap {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.buf.len();
        let start = if self.len < cap { 0 } else { self.head };
        (0..self.len).map(move |i| self.buf[(start + i) % cap])
    }

    pub fn summary(&self) -> Option<FrameSummary> {
        if self.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        for t in self.iter() {
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }
        let avg = sum / self.len as f64;
        let fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };
        Some(FrameSummary { avg, min, max, fps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_newest_in_order() {
        let mut h = FrameHistory::new(3);
        for t in [1.0, 2.0, 3.0, 4.0, 5.0] {
            h.push(t);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn summary_over_window() {
        let mut h = FrameHistory::new(4);
        assert!(h.summary().is_none());
        for t in [0.010, 0.020, 0.030] {
            h.push(t);
        }
        let s = h.summary().unwrap();
        assert!((s.avg - 0.020).abs() < 1e-12);
        assert_eq!(s.min, 0.010);
        assert_eq!(s.max, 0.030);
        assert!((s.fps - 50.0).abs() < 1e-9);
    }
}
