//! Interrupt Bridge
//!
//! The only code meant to run in interrupt context. Each handler
//! acknowledges the hardware first, updates a counter or flag, and queues at
//! most one deferred event. No business logic, no host calls.
//!
//! # Example
//!
//! ```ignore
//! static QUEUE: EventQueue = EventQueue::new();
//! static TRACKER: ChunkTracker = ChunkTracker::new();
//! static RADIO_IRQ: RadioIrqLatch = RadioIrqLatch::new();
//!
//! #[interrupt]
//! fn DMA() {
//!     for channel in DmaChannel::ALL {
//!         on_dma_interrupt(&GPDMA_STATUS, channel, &TRACKER, &QUEUE);
//!     }
//! }
//!
//! #[interrupt]
//! fn PIN_INT7() {
//!     RADIO_IRQ.on_edge(&RADIO_IRQ_LINE, &QUEUE);
//! }
//! ```

use crate::event::{DeferredEvent, EventQueue};
use crate::hal::{DmaChannel, DmaInterrupts, IrqLine};
use crate::spi::ChunkTracker;
use crate::sync::CriticalSectionCell;

// =============================================================================
// DMA
// =============================================================================

/// Service one GPDMA channel's interrupt status.
///
/// A terminal count is counted toward the current chunk and queues
/// `SpiChunk` once every active direction has finished. An error is counted
/// and queues `SpiChunk` unconditionally. Both are cleared before anything
/// else happens.
///
/// Returns `true` if `SpiChunk` was queued.
pub fn on_dma_interrupt<I: DmaInterrupts + ?Sized>(
    dma: &I,
    channel: DmaChannel,
    tracker: &ChunkTracker,
    queue: &EventQueue,
) -> bool {
    let mut schedule = false;

    if dma.terminal_count_pending(channel) {
        dma.clear_terminal_count(channel);
        schedule |= tracker.record_completion();
    }
    if dma.error_pending(channel) {
        dma.clear_error(channel);
        schedule |= tracker.record_error();
    }

    if schedule {
        queue.trigger(DeferredEvent::SpiChunk);
    }
    schedule
}

// =============================================================================
// Radio IRQ
// =============================================================================

#[derive(Default)]
struct LatchState {
    /// Edge seen since the deferred handler last consumed it
    pending: bool,
    /// A `RadioIrq` event is queued or running
    outstanding: bool,
    /// Every handler invocation
    invocations: u32,
}

/// Coalesces radio IRQ edges into at most one outstanding `RadioIrq` event.
pub struct RadioIrqLatch {
    state: CriticalSectionCell<LatchState>,
}

impl RadioIrqLatch {
    /// Create an idle latch (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(LatchState {
                pending: false,
                outstanding: false,
                invocations: 0,
            }),
        }
    }

    /// Falling-edge interrupt handler.
    ///
    /// Returns `true` if a new `RadioIrq` event was queued.
    pub fn on_edge<L: IrqLine + ?Sized>(&self, line: &L, queue: &EventQueue) -> bool {
        self.state.with(|s| {
            s.invocations = s.invocations.wrapping_add(1);
            if !line.edge_pending() {
                return false;
            }
            line.clear_edge();
            s.pending = true;
            if s.outstanding {
                return false;
            }
            s.outstanding = true;
            queue.trigger(DeferredEvent::RadioIrq)
        })
    }

    /// Start of the deferred handler: consume the pending flag.
    ///
    /// Returns whether an edge was pending, i.e. whether the radio needs
    /// servicing.
    pub fn begin_service(&self) -> bool {
        self.state.with(|s| core::mem::take(&mut s.pending))
    }

    /// End of the deferred handler.
    ///
    /// If another edge arrived while servicing, queue exactly one more
    /// `RadioIrq` and return `true`; otherwise go idle.
    pub fn finish_service(&self, queue: &EventQueue) -> bool {
        self.state.with(|s| {
            if s.pending {
                queue.trigger(DeferredEvent::RadioIrq);
                true
            } else {
                s.outstanding = false;
                false
            }
        })
    }

    /// A `RadioIrq` event is queued or running.
    pub fn is_outstanding(&self) -> bool {
        self.state.read(|s| s.outstanding)
    }

    /// Number of times the edge handler ran (diagnostic).
    pub fn irq_count(&self) -> u32 {
        self.state.read(|s| s.invocations)
    }
}

impl Default for RadioIrqLatch {
    fn default() -> Self {
        Self::new()
    }
}
