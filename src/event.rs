//! Deferred Events
//!
//! Interrupt handlers never run business logic. They arm a [`DeferredEvent`]
//! on the shared [`EventQueue`] and return; the cooperative scheduler
//! (see [`Runtime`](crate::runtime::Runtime)) later pops each event and runs
//! the matching handler outside interrupt context.
//!
//! Two mechanisms keep the scheduler alive:
//!
//! - **Pending events**: a triggered event sits in the FIFO until popped.
//!   Triggering an event that is already pending is a no-op, so each
//!   trigger-to-dispatch cycle runs its handler exactly once.
//! - **References**: [`EventQueue::arm`] holds an event open while work is
//!   outstanding (for example a whole SPI transfer) even though nothing is
//!   queued yet. [`EventQueue::disarm`] releases it. An event with zero
//!   references and no pending trigger is inert.

use heapless::Deque;

use crate::sync::CriticalSectionCell;

/// Number of distinct deferred events.
pub const EVENT_COUNT: usize = 6;

/// Identity of a deferred unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeferredEvent {
    /// Every active DMA direction finished (or failed) the current chunk
    SpiChunk = 0,
    /// SPI transfer reached terminal completion
    SpiComplete = 1,
    /// Radio IRQ line fell; the radio chip needs servicing
    RadioIrq = 2,
    /// A connect request resolved (success or failure)
    WifiConnect = 3,
    /// The link went down
    WifiDisconnect = 4,
    /// The radio chip stopped responding
    WifiHang = 5,
}

impl DeferredEvent {
    /// All events, in index order.
    pub const ALL: [DeferredEvent; EVENT_COUNT] = [
        DeferredEvent::SpiChunk,
        DeferredEvent::SpiComplete,
        DeferredEvent::RadioIrq,
        DeferredEvent::WifiConnect,
        DeferredEvent::WifiDisconnect,
        DeferredEvent::WifiHang,
    ];

    #[inline(always)]
    const fn index(self) -> usize {
        self as usize
    }
}

struct QueueState {
    refs: [u8; EVENT_COUNT],
    queued: [bool; EVENT_COUNT],
    fifo: Deque<DeferredEvent, EVENT_COUNT>,
}

impl QueueState {
    const fn new() -> Self {
        Self {
            refs: [0; EVENT_COUNT],
            queued: [false; EVENT_COUNT],
            fifo: Deque::new(),
        }
    }
}

/// ISR-safe FIFO of pending deferred events with per-event reference counts.
///
/// Safe to place in a `static`; every method takes `&self`.
pub struct EventQueue {
    state: CriticalSectionCell<QueueState>,
}

impl EventQueue {
    /// Create an empty queue (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(QueueState::new()),
        }
    }

    /// Take a reference on `event`, keeping the scheduler alive until the
    /// matching [`disarm`](Self::disarm).
    pub fn arm(&self, event: DeferredEvent) {
        self.state.with(|s| {
            let refs = &mut s.refs[event.index()];
            *refs = refs.saturating_add(1);
        });
    }

    /// Release a reference on `event`. Releasing an unreferenced event is a no-op.
    pub fn disarm(&self, event: DeferredEvent) {
        self.state.with(|s| {
            let refs = &mut s.refs[event.index()];
            *refs = refs.saturating_sub(1);
        });
    }

    /// Queue `event` for one dispatch.
    ///
    /// Returns `false` if it was already pending (the trigger coalesces).
    /// O(1) and callable from interrupt context.
    pub fn trigger(&self, event: DeferredEvent) -> bool {
        self.state.with(|s| {
            if s.queued[event.index()] {
                return false;
            }
            // Capacity equals the number of events and each event is queued
            // at most once, so the push cannot fail.
            if s.fifo.push_back(event).is_err() {
                return false;
            }
            s.queued[event.index()] = true;
            true
        })
    }

    /// Remove and return the oldest pending event.
    pub fn pop(&self) -> Option<DeferredEvent> {
        self.state.with(|s| {
            let event = s.fifo.pop_front()?;
            s.queued[event.index()] = false;
            Some(event)
        })
    }

    /// Drop a pending `event` without dispatching it.
    ///
    /// The order of the other pending events is kept. Returns `false` if
    /// `event` was not pending.
    pub fn retract(&self, event: DeferredEvent) -> bool {
        self.state.with(|s| {
            if !s.queued[event.index()] {
                return false;
            }
            for _ in 0..s.fifo.len() {
                if let Some(pending) = s.fifo.pop_front()
                    && pending != event
                {
                    // Just popped one, so there is room for it.
                    let pushed = s.fifo.push_back(pending);
                    debug_assert!(pushed.is_ok());
                }
            }
            s.queued[event.index()] = false;
            true
        })
    }

    /// Whether `event` is waiting for dispatch.
    pub fn is_pending(&self, event: DeferredEvent) -> bool {
        self.state.read(|s| s.queued[event.index()])
    }

    /// Current reference count of `event`.
    pub fn refs(&self, event: DeferredEvent) -> u8 {
        self.state.read(|s| s.refs[event.index()])
    }

    /// Whether the scheduler has any reason to keep running.
    pub fn is_active(&self) -> bool {
        self.state
            .read(|s| !s.fifo.is_empty() || s.refs.iter().any(|&r| r > 0))
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
