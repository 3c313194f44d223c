//! Per-chunk completion accounting shared with the DMA interrupt.

use crate::sync::CriticalSectionCell;

/// Snapshot of the current chunk's completion counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkProgress {
    /// Terminal-count interrupts seen this chunk
    pub completed: u8,
    /// Terminal-count interrupts that make the chunk done
    pub expected: u8,
    /// Error interrupts seen this chunk
    pub errors: u32,
}

impl ChunkProgress {
    /// Every active direction finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.expected > 0 && self.completed >= self.expected
    }
}

#[derive(Default)]
struct TrackerState {
    progress: ChunkProgress,
    armed: bool,
}

/// Completion and error counters written by the DMA interrupt bridge and
/// read by the transfer engine.
///
/// Counts are ignored while no chunk is armed, so a late interrupt after
/// cleanup cannot leak into the next transfer.
pub struct ChunkTracker {
    state: CriticalSectionCell<TrackerState>,
}

impl ChunkTracker {
    /// Create an idle tracker (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(TrackerState {
                progress: ChunkProgress {
                    completed: 0,
                    expected: 0,
                    errors: 0,
                },
                armed: false,
            }),
        }
    }

    /// Reset the counters for a new chunk expecting `expected` completions.
    pub(crate) fn arm(&self, expected: u8) {
        self.state.with(|s| {
            s.progress = ChunkProgress {
                completed: 0,
                expected,
                errors: 0,
            };
            s.armed = true;
        });
    }

    /// Stop counting and zero everything.
    pub(crate) fn disarm(&self) {
        self.state.reset();
    }

    /// Count one terminal-count interrupt.
    ///
    /// Returns `true` exactly when this completion finishes the chunk.
    pub fn record_completion(&self) -> bool {
        self.state.with(|s| {
            if !s.armed {
                return false;
            }
            s.progress.completed = s.progress.completed.saturating_add(1);
            s.progress.completed == s.progress.expected
        })
    }

    /// Count one error interrupt.
    ///
    /// Returns `false` if no chunk is armed.
    pub fn record_error(&self) -> bool {
        self.state.with(|s| {
            if s.armed {
                s.progress.errors = s.progress.errors.saturating_add(1);
            }
            s.armed
        })
    }

    /// Current counters.
    pub fn progress(&self) -> ChunkProgress {
        self.state.read(|s| s.progress)
    }

    /// Whether a chunk is armed.
    pub fn is_armed(&self) -> bool {
        self.state.read(|s| s.armed)
    }
}

impl Default for ChunkTracker {
    fn default() -> Self {
        Self::new()
    }
}
