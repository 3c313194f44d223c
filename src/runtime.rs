//! Cooperative Scheduler
//!
//! [`Runtime`] owns the transfer engine, the link state machine and the
//! host, and runs every deferred event popped from the shared
//! [`EventQueue`]. It is the only place business logic executes.
//!
//! # Example
//!
//! ```ignore
//! static QUEUE: EventQueue = EventQueue::new();
//! static TRACKER: ChunkTracker = ChunkTracker::new();
//! static RADIO_IRQ: RadioIrqLatch = RadioIrqLatch::new();
//!
//! let spi = SpiAsync::new(gpdma, pins.clone(), delay, &QUEUE, &TRACKER);
//! let mut link = WifiLink::new(cc3000, pins, &QUEUE, LinkConfig::new(LINK_PINS));
//! link.init();
//!
//! let mut runtime = Runtime::new(&QUEUE, &RADIO_IRQ, spi, link, host);
//! loop {
//!     runtime.run_pending();
//!     if frame_elapsed() {
//!         runtime.tick();
//!     }
//! }
//! ```

use embedded_hal::delay::DelayNs;

use crate::error::Result;
use crate::event::{DeferredEvent, EventQueue};
use crate::hal::{DigitalPins, Gpdma, RadioChip};
use crate::host::Host;
use crate::internal::constants::DEFAULT_CHAIN_CAPACITY;
use crate::interrupt::RadioIrqLatch;
use crate::spi::{AutoAdvance, ChunkHandler, SpiAsync, SpiTransfer};
use crate::wifi::WifiLink;

/// Deferred event dispatcher.
///
/// # Type Parameters
///
/// * `G`, `P`, `D`, `C`, `N` - see [`SpiAsync`]
/// * `R` - Radio chip
/// * `L` - Pins driven by the link (LEDs, radio enable)
/// * `H` - Embedding host
///
/// The runtime owns the engine and its descriptor chains, so it must not be
/// moved while a transfer is in flight.
pub struct Runtime<
    'a,
    G,
    P,
    D,
    R,
    L,
    H,
    C = AutoAdvance,
    const N: usize = DEFAULT_CHAIN_CAPACITY,
> {
    queue: &'a EventQueue,
    radio_irq: &'a RadioIrqLatch,
    spi: SpiAsync<'a, G, P, D, C, N>,
    link: WifiLink<'a, R, L>,
    host: H,
    frame: usize,
}

impl<'a, G, P, D, R, L, H, C, const N: usize> Runtime<'a, G, P, D, R, L, H, C, N>
where
    G: Gpdma,
    P: DigitalPins,
    D: DelayNs,
    R: RadioChip,
    L: DigitalPins,
    H: Host,
    C: ChunkHandler,
{
    /// Tie the subsystems together.
    ///
    /// `queue` must be the queue both subsystems and the interrupt bridge
    /// were built with.
    pub fn new(
        queue: &'a EventQueue,
        radio_irq: &'a RadioIrqLatch,
        spi: SpiAsync<'a, G, P, D, C, N>,
        link: WifiLink<'a, R, L>,
        host: H,
    ) -> Self {
        Self {
            queue,
            radio_irq,
            spi,
            link,
            host,
            frame: 0,
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Run the oldest pending event, if any.
    pub fn run_once(&mut self) -> Option<DeferredEvent> {
        let event = self.queue.pop()?;
        self.dispatch(event);
        Some(event)
    }

    /// Run pending events until the queue is empty, including events queued
    /// by the handlers themselves. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while self.run_once().is_some() {
            ran += 1;
        }
        ran
    }

    /// Run the handler for one event.
    pub fn dispatch(&mut self, event: DeferredEvent) {
        trace!("runtime: dispatch {:?}", event);
        match event {
            DeferredEvent::SpiChunk => self.spi.on_chunk(),
            DeferredEvent::SpiComplete => {
                if let Err(e) = self.spi.finish(&mut self.host) {
                    debug!("runtime: transfer ended with {}", e.as_str());
                }
            }
            DeferredEvent::RadioIrq => {
                if self.radio_irq.begin_service() {
                    self.link.service_radio(&mut self.host);
                }
                self.radio_irq.finish_service(self.queue);
            }
            DeferredEvent::WifiConnect
            | DeferredEvent::WifiDisconnect
            | DeferredEvent::WifiHang => {
                self.link.deliver(event, &mut self.host);
            }
        }
    }

    /// Something is queued, or outstanding work holds a reference.
    pub fn is_active(&self) -> bool {
        self.queue.is_active()
    }

    /// Advance the link LED animation by one frame.
    pub fn tick(&mut self) {
        self.link.tick(self.frame);
        self.frame = self.frame.wrapping_add(1);
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Start an SPI transfer. See [`SpiAsync::start`].
    ///
    /// # Errors
    ///
    /// Any error from [`SpiAsync::start`].
    pub fn start_transfer(&mut self, request: SpiTransfer) -> Result<()> {
        self.spi.start(request)
    }

    /// Abort the current transfer and release its buffers without a
    /// completion notification.
    pub fn cancel_transfer(&mut self) {
        self.spi.cleanup(&mut self.host);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Transfer engine.
    pub fn spi(&self) -> &SpiAsync<'a, G, P, D, C, N> {
        &self.spi
    }

    /// Transfer engine, mutably.
    pub fn spi_mut(&mut self) -> &mut SpiAsync<'a, G, P, D, C, N> {
        &mut self.spi
    }

    /// Link state machine.
    pub fn link(&self) -> &WifiLink<'a, R, L> {
        &self.link
    }

    /// Link state machine, mutably.
    pub fn link_mut(&mut self) -> &mut WifiLink<'a, R, L> {
        &mut self.link
    }

    /// Embedding host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Embedding host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::hal::{DmaChannel, RadioEvent, Security, SpiPort};
    use crate::interrupt::on_dma_interrupt;
    use crate::spi::{ChunkTracker, DmaRegion};
    use crate::test_utils::{
        MockDelay, MockGpdma, MockHost, MockPins, MockRadio, Op, Timeline, sample_addresses,
    };
    use crate::wifi::{LinkConfig, LinkPins, LinkState};

    const PINS: LinkPins = LinkPins {
        connection_led: 20,
        error_led: 21,
        radio_enable: 22,
    };

    type TestRuntime<'a> =
        Runtime<'a, MockGpdma, MockPins, MockDelay, MockRadio, MockPins, MockHost, AutoAdvance, 4>;

    struct Bench {
        timeline: Timeline,
        dma: MockGpdma,
        radio: MockRadio,
        host: MockHost,
        queue: EventQueue,
        tracker: ChunkTracker,
        latch: RadioIrqLatch,
    }

    impl Bench {
        fn new() -> Self {
            let timeline = Timeline::new();
            Self {
                dma: MockGpdma::new(&timeline),
                radio: MockRadio::new(),
                host: MockHost::new(),
                queue: EventQueue::new(),
                tracker: ChunkTracker::new(),
                latch: RadioIrqLatch::new(),
                timeline,
            }
        }

        fn runtime(&self) -> TestRuntime<'_> {
            let pins = MockPins::new(&self.timeline);
            let spi = SpiAsync::new(
                self.dma.clone(),
                pins.clone(),
                MockDelay::new(&self.timeline),
                &self.queue,
                &self.tracker,
            );
            let link = WifiLink::new(
                self.radio.clone(),
                pins,
                &self.queue,
                LinkConfig::new(PINS).with_boot_ticks(3),
            );
            Runtime::new(&self.queue, &self.latch, spi, link, self.host.clone())
        }

        fn complete_chunk(&self) {
            self.complete_on(&DmaChannel::ALL);
        }

        fn complete_on(&self, channels: &[DmaChannel]) {
            for &channel in channels {
                self.dma.raise_terminal_count(channel);
                on_dma_interrupt(&self.dma, channel, &self.tracker, &self.queue);
            }
        }

        fn radio_edge(&self) {
            self.radio.raise_edge();
            self.latch.on_edge(&self.radio, &self.queue);
        }
    }

    #[test]
    fn idle_runtime_has_nothing_to_do() {
        let bench = Bench::new();
        let mut runtime = bench.runtime();
        assert!(!runtime.is_active());
        assert_eq!(runtime.run_pending(), 0);
        assert_eq!(runtime.run_once(), None);
    }

    #[test]
    fn transfer_keeps_scheduler_alive_until_notified() {
        static TX: [u8; 64] = [0; 64];
        static RX: [u8; 64] = [0; 64];
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        runtime
            .start_transfer(
                SpiTransfer::new(SpiPort::Ssp0, 64)
                    .with_tx(DmaRegion::from_static(&TX))
                    .with_rx(DmaRegion::from_static(&RX))
                    .with_chunk_size(16),
            )
            .unwrap();

        // Nothing queued yet, but the transfer holds a reference
        assert_eq!(runtime.run_pending(), 0);
        assert!(runtime.is_active());

        for _ in 0..4 {
            bench.complete_chunk();
            runtime.run_pending();
        }

        let done = bench.host.notifications_tagged("spi_async_complete");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].code, 0);
        assert!(runtime.spi().is_idle());
        assert!(!runtime.is_active());
    }

    #[test]
    fn single_chunk_transfer_waits_for_dma() {
        static TX: [u8; 16] = [0; 16];
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        runtime
            .start_transfer(SpiTransfer::new(SpiPort::Ssp0, 16).with_tx(DmaRegion::from_static(&TX)))
            .unwrap();

        // The chunk is still on the wire: no notification, no channel halt
        assert_eq!(runtime.run_pending(), 0);
        assert!(bench.host.notifications().is_empty());
        assert_eq!(bench.timeline.count(|op| matches!(op, Op::Cancel(_))), 0);
        assert!(!runtime.spi().is_idle());
        assert!(runtime.is_active());

        bench.complete_on(&[DmaChannel::Tx]);
        runtime.run_pending();

        let done = bench.host.notifications_tagged("spi_async_complete");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].code, 0);
        assert!(runtime.spi().is_idle());
        assert!(!runtime.is_active());
    }

    #[test]
    fn cancelled_transfer_does_not_end_the_next_one() {
        static FIRST: [u8; 16] = [0; 16];
        static SECOND: [u8; 64] = [0; 64];
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        runtime
            .start_transfer(
                SpiTransfer::new(SpiPort::Ssp0, 16).with_tx(DmaRegion::from_static(&FIRST)),
            )
            .unwrap();
        bench.complete_on(&[DmaChannel::Tx]);
        runtime.cancel_transfer();

        runtime
            .start_transfer(
                SpiTransfer::new(SpiPort::Ssp0, 64)
                    .with_tx(DmaRegion::from_static(&SECOND))
                    .with_chunk_size(16)
                    .with_repeat(2),
            )
            .unwrap();
        assert_eq!(runtime.run_pending(), 0);
        assert!(!runtime.spi().is_idle());

        for _ in 0..8 {
            assert!(bench.host.notifications().is_empty());
            bench.complete_on(&[DmaChannel::Tx]);
            runtime.run_pending();
        }

        assert_eq!(bench.timeline.begins(DmaChannel::Tx).len(), 1 + 8);
        let done = bench.host.notifications_tagged("spi_async_complete");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].code, 0);
        assert!(runtime.spi().is_idle());
    }

    #[test]
    fn dma_error_is_reported_with_count() {
        static TX: [u8; 64] = [0; 64];
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        runtime
            .start_transfer(
                SpiTransfer::new(SpiPort::Ssp1, 64)
                    .with_tx(DmaRegion::from_static(&TX))
                    .with_chunk_size(16),
            )
            .unwrap();
        bench.dma.raise_error(DmaChannel::Tx);
        on_dma_interrupt(&bench.dma, DmaChannel::Tx, &bench.tracker, &bench.queue);
        runtime.run_pending();

        let done = bench.host.notifications_tagged("spi_async_complete");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].code, 1);
        assert!(!runtime.is_active());
    }

    #[test]
    fn cancel_transfer_goes_idle_silently() {
        static TX: [u8; 64] = [0; 64];
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        runtime
            .start_transfer(
                SpiTransfer::new(SpiPort::Ssp0, 64)
                    .with_tx(DmaRegion::from_static(&TX))
                    .with_chunk_size(16),
            )
            .unwrap();
        runtime.cancel_transfer();

        assert!(runtime.spi().is_idle());
        assert!(!runtime.is_active());
        assert!(bench.host.notifications().is_empty());
    }

    #[test]
    fn radio_irq_runs_link_callbacks_and_follow_up_notifications() {
        let bench = Bench::new();
        let mut runtime = bench.runtime();
        runtime.link_mut().enable();
        runtime
            .link_mut()
            .connect(Security::Wpa2, "lab", "pw")
            .unwrap();

        bench.radio.queue_event(RadioEvent::Connected);
        bench.radio.queue_event(RadioEvent::DhcpSuccess);
        bench.radio.go_online(sample_addresses(), "lab");
        bench.radio_edge();

        // RadioIrq, then the WifiConnect it queued
        assert_eq!(runtime.run_pending(), 2);
        assert_eq!(runtime.link().state(), LinkState::Online);
        let done = bench.host.notifications_tagged("wifi_connect_complete");
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].code, 0);
        assert!(!bench.latch.is_outstanding());
        assert!(!runtime.is_active());
    }

    #[test]
    fn edge_burst_before_dispatch_services_radio_once() {
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        for _ in 0..3 {
            bench.radio_edge();
        }
        assert_eq!(runtime.run_pending(), 1);
        assert_eq!(bench.radio.services(), 1);
        assert!(!bench.latch.is_outstanding());
        assert_eq!(bench.latch.irq_count(), 3);

        // A later edge starts a fresh cycle
        bench.radio_edge();
        assert_eq!(runtime.run_pending(), 1);
        assert_eq!(bench.radio.services(), 2);
    }

    #[test]
    fn hang_and_disconnect_reach_host_in_order() {
        let bench = Bench::new();
        let mut runtime = bench.runtime();

        bench.radio.queue_event(RadioEvent::Hang);
        bench.radio.queue_event(RadioEvent::Disconnected);
        bench.radio_edge();
        runtime.run_pending();

        let tags: Vec<&str> = bench.host.notifications().iter().map(|n| n.tag).collect();
        assert_eq!(tags, ["wifi_hang", "wifi_disconnect_complete"]);
    }

    #[test]
    fn tick_advances_animation_frames() {
        let bench = Bench::new();
        let mut host = bench.host.clone();
        let mut runtime = bench.runtime();
        runtime.link_mut().enable();
        runtime
            .link_mut()
            .handle_radio_event(RadioEvent::Acquire, &mut host);

        runtime.tick();
        runtime.tick();
        assert!(runtime.link().is_blinking());
        runtime.tick();
        assert!(!runtime.link().is_blinking());
        assert_eq!(runtime.link().state(), LinkState::Disconnected);
    }
}
