//! Command history ring
//!
//! Static allocation, 10 lines of 50 bytes each. The lines form a ring:
//! stepping "older" is `index + 1`, stepping "newer" is `index - 1`, both
//! modulo [`HISTORY_SIZE`]. `head` is the slot of the line being entered;
//! `active` is the slot shown on screen, which moves away from `head`
//! while browsing.
//!
//! The line being edited *is* the history slot: recalling an older line
//! and editing it edits the entry in place. On the next line start the
//! edited entry is moved next to `head`, so it becomes the newest.

use super::line_buffer::LineBuffer;

/// Line buffer capacity, including the terminator.
pub const LINE_SIZE: usize = 50;

/// Number of history slots.
pub const HISTORY_SIZE: usize = 10;

/// Command history ring buffer
pub struct History {
    lines: [LineBuffer; HISTORY_SIZE],
    /// Insertion slot: the line currently being entered
    head: usize,
    /// Slot currently displayed/edited
    active: usize,
}

#[inline]
fn older(idx: usize) -> usize {
    (idx + 1) % HISTORY_SIZE
}

#[inline]
fn newer(idx: usize) -> usize {
    (idx + HISTORY_SIZE - 1) % HISTORY_SIZE
}

impl History {
    /// Create empty history
    pub const fn new() -> Self {
        Self {
            lines: [LineBuffer::new(); HISTORY_SIZE],
            head: 0,
            active: 0,
        }
    }

    /// Forget all entries.
    pub fn reset(&mut self) {
        for line in self.lines.iter_mut() {
            line.clear();
        }
        self.head = 0;
        self.active = 0;
    }

    /// Rotate the ring for a fresh input line.
    ///
    /// Keeps the line just submitted, recycles empty lines instead of
    /// accumulating them, and leaves `active == head` on a cleared slot.
    pub fn begin_line(&mut self) {
        if self.active == self.head {
            // Reuse the stale slot on the far side of the ring.
            self.head = newer(self.head);
        } else {
            self.promote_active();
        }

        if self.lines[older(self.head)].is_empty() {
            self.head = older(self.head);
        }

        self.active = self.head;
        self.lines[self.active].clear();
    }

    /// Move `active` to sit directly older than `head`.
    ///
    /// Equivalent to unlinking the node and reinserting it next to `head`;
    /// the slots in between shift one step older.
    fn promote_active(&mut self) {
        let steps = (self.active + HISTORY_SIZE - self.head) % HISTORY_SIZE;
        for k in (1..steps).rev() {
            let a = (self.head + k) % HISTORY_SIZE;
            self.lines.swap(a, older(a));
        }
        self.active = older(self.head);
    }

    /// Step to the next older entry.
    ///
    /// Returns `false` at the oldest entry (never wraps onto `head`).
    pub fn older(&mut self) -> bool {
        if older(self.active) == self.head {
            return false;
        }
        self.active = older(self.active);
        true
    }

    /// Step to the next newer entry.
    ///
    /// Returns `false` at `head`.
    pub fn newer(&mut self) -> bool {
        if self.active == self.head {
            return false;
        }
        self.active = newer(self.active);
        true
    }

    /// True while an older entry is displayed.
    pub fn is_browsing(&self) -> bool {
        self.active != self.head
    }

    /// Line currently displayed.
    pub fn active_line(&self) -> &LineBuffer {
        &self.lines[self.active]
    }

    pub fn active_line_mut(&mut self) -> &mut LineBuffer {
        &mut self.lines[self.active]
    }

    /// Entry `n` steps older than `head` (0 = head itself).
    pub fn entry(&self, n: usize) -> &str {
        self.lines[(self.head + n) % HISTORY_SIZE].as_str()
    }

    /// Number of non-empty slots.
    pub fn stored(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_empty()).count()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
