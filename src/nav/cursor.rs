use serde::{Deserialize, Serialize};

/// Clamped scroll index over a list-like pane.
///
/// `down`/`up` never wrap; they report `false` at a boundary so callers can
/// hand focus to a sibling pane instead. With a step of 2 the cursor walks
/// interleaved name/value slots and always lands on a name slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedCursor {
    index: usize,
    len: usize,
    step: usize,
}

impl Default for BoundedCursor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BoundedCursor {
    pub fn new(len: usize) -> Self {
        Self::with_step(len, 1)
    }

    pub fn with_step(len: usize, step: usize) -> Self {
        Self {
            index: 0,
            len,
            step: step.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_active(&self) -> bool {
        self.len > 0
    }

    /// `None` when the sequence is empty.
    pub fn upper_bound(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    fn row_start(&self) -> usize {
        self.index - self.index % self.step
    }

    pub fn down(&mut self) -> bool {
        let Some(upper) = self.upper_bound() else {
            return false;
        };
        let next = self.row_start() + self.step;
        if next > upper {
            return false;
        }
        self.index = next;
        true
    }

    pub fn up(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let start = self.row_start();
        if start < self.step {
            return false;
        }
        self.index = start - self.step;
        true
    }

    /// Single-slot move regardless of step (name -> value within a pair).
    pub fn next_slot(&mut self) -> bool {
        match self.upper_bound() {
            Some(upper) if self.index < upper => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    pub fn prev_slot(&mut self) -> bool {
        if self.is_active() && self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn set(&mut self, index: usize) {
        self.index = match self.upper_bound() {
            Some(upper) => index.min(upper),
            None => 0,
        };
    }

    /// Re-point the cursor after the owning sequence changed length.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        self.set(self.index);
    }
}
