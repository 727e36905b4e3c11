// =============================================================================
// Rolling mean — fixed-size sliding accumulator
// =============================================================================
//
// Keeps a running sum plus an exact count of non-zero members so that each
// push is O(1).  When every member of the window is zero the mean is exactly
// 0.0, independent of any floating-point residue left in the running sum by
// earlier add/subtract pairs.  Callers (RSI) rely on that to detect flat
// windows.
// =============================================================================

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
    sum: f64,
    non_zero: usize,
}

impl RollingMean {
    /// `window` must be positive; callers validate it up front.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window + 1),
            sum: 0.0,
            non_zero: 0,
        }
    }

    /// Push the next value and return the mean of the trailing window once it
    /// holds `window` values.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;
        if value != 0.0 {
            self.non_zero += 1;
        }

        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                if old != 0.0 {
                    self.non_zero -= 1;
                }
            }
        }

        if self.values.len() < self.window {
            return None;
        }

        if self.non_zero == 0 {
            self.sum = 0.0;
            return Some(0.0);
        }

        Some(self.sum / self.window as f64)
    }
}
