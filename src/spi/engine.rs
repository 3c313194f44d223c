//! The transfer engine.

use embedded_hal::delay::DelayNs;

use super::{
    AutoAdvance, ChunkAction, ChunkHandler, ChunkTracker, SpiTransfer, TransferState, TransferStatus,
};
use crate::dma::{DescriptorChain, Direction};
use crate::error::{ConfigError, DmaError, DmaResult, Result};
use crate::event::{DeferredEvent, EventQueue};
use crate::hal::{ChannelConfig, DigitalPins, DmaChannel, Gpdma};
use crate::host::{Host, Notification};
use crate::internal::constants::DEFAULT_CHAIN_CAPACITY;

/// DMA-driven chunked SPI transfer engine.
///
/// One instance per board; it enforces the single-transfer rule itself.
/// `N` is the descriptor pool size per direction.
///
/// # Type Parameters
///
/// * `G` - GPDMA controller
/// * `P` - Digital pins (chip-select)
/// * `D` - Delay provider for chip-select settle time
/// * `C` - Per-chunk handler, consulted after every chunk
/// * `N` - Descriptors per direction
///
/// # Placement
///
/// The GPDMA walks the descriptor chains stored inside the engine, so the
/// engine must not be moved while a transfer is in flight. Give it a
/// `'static` home (or keep it in one stack frame) before calling
/// [`start`](Self::start).
pub struct SpiAsync<'a, G, P, D, C = AutoAdvance, const N: usize = DEFAULT_CHAIN_CAPACITY> {
    dma: G,
    pins: P,
    delay: D,
    queue: &'a EventQueue,
    tracker: &'a ChunkTracker,
    status: TransferStatus,
    handler: C,
    tx_chain: DescriptorChain<N>,
    rx_chain: DescriptorChain<N>,
    /// Chunks that could not be programmed; reported as errors
    faults: u32,
}

impl<'a, G, P, D, const N: usize> SpiAsync<'a, G, P, D, AutoAdvance, N> {
    /// Create an idle engine that walks every chunk of every transfer.
    ///
    /// `tracker` must be the same instance the DMA interrupt bridge feeds.
    pub fn new(dma: G, pins: P, delay: D, queue: &'a EventQueue, tracker: &'a ChunkTracker) -> Self {
        Self::with_handler(dma, pins, delay, queue, tracker, AutoAdvance)
    }
}

impl<'a, G, P, D, C, const N: usize> SpiAsync<'a, G, P, D, C, N> {
    /// Create an idle engine that asks `handler` after every chunk.
    pub fn with_handler(
        dma: G,
        pins: P,
        delay: D,
        queue: &'a EventQueue,
        tracker: &'a ChunkTracker,
        handler: C,
    ) -> Self {
        Self {
            dma,
            pins,
            delay,
            queue,
            tracker,
            status: TransferStatus::IDLE,
            handler,
            tx_chain: DescriptorChain::new(),
            rx_chain: DescriptorChain::new(),
            faults: 0,
        }
    }

    /// The per-chunk handler.
    pub fn handler(&self) -> &C {
        &self.handler
    }

    /// Mutable access to the per-chunk handler.
    pub fn handler_mut(&mut self) -> &mut C {
        &mut self.handler
    }
}

impl<'a, G, P, D, C, const N: usize> SpiAsync<'a, G, P, D, C, N>
where
    G: Gpdma,
    P: DigitalPins,
    D: DelayNs,
    C: ChunkHandler,
{
    /// Current transfer state.
    #[inline]
    pub fn status(&self) -> &TransferStatus {
        &self.status
    }

    /// No transfer in flight.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.status.state == TransferState::Idle
    }

    /// Transmit descriptor chain.
    pub fn tx_chain(&self) -> &DescriptorChain<N> {
        &self.tx_chain
    }

    /// Receive descriptor chain.
    pub fn rx_chain(&self) -> &DescriptorChain<N> {
        &self.rx_chain
    }

    /// Start a transfer and issue its first chunk.
    ///
    /// Returns as soon as the first chunk's DMA programs are running;
    /// completion arrives as a `spi_async_complete` notification once the
    /// last chunk's DMA interrupts have been seen. A zero-length transfer
    /// moves no data and completes on the next dispatch.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TransferInProgress`] if the engine is busy
    /// - any error from [`SpiTransfer::validate`]
    /// - [`DmaError::ChainTooLong`] if a chain does not fit the pool
    ///
    /// On error nothing has been started and the host keeps its handles.
    pub fn start(&mut self, request: SpiTransfer) -> Result<()> {
        if !self.is_idle() {
            return Err(ConfigError::TransferInProgress.into());
        }
        request.validate()?;

        if let Err(e) = self.build_chains(&request) {
            warn!("spi: chain build failed for {} bytes", request.length);
            self.tx_chain.release();
            self.rx_chain.release();
            return Err(e.into());
        }

        if let Some(cs) = request.chip_select {
            self.pins.set_output(cs.pin);
            self.pins.write(cs.pin, true);
        }
        if request.rx.is_some() {
            self.dma.configure(DmaChannel::Rx, &ChannelConfig::receive(request.port));
        }
        if request.tx.is_some() {
            self.dma.configure(DmaChannel::Tx, &ChannelConfig::transmit(request.port));
        }

        self.status = TransferStatus {
            state: TransferState::Armed,
            port: request.port,
            buffer_length: request.length,
            chunk_offset: 0,
            chunk_size: request.chunk_size,
            repeat: request.repeat,
            chip_select: request.chip_select,
            tx: request.tx,
            rx: request.rx,
            chunks_issued: 0,
            final_chunk: request.is_single_chunk(),
        };
        self.faults = 0;
        self.queue.arm(DeferredEvent::SpiComplete);

        info!(
            "spi: start {} bytes, chunk {}, repeat {}",
            request.length, request.chunk_size, request.repeat
        );

        if let Err(e) = self.step() {
            self.abort_start();
            return Err(e.into());
        }
        if request.length == 0 {
            self.terminate();
        }
        Ok(())
    }

    /// Handle the `SpiChunk` deferred event.
    ///
    /// Stale events (after termination or cleanup) are ignored.
    pub fn on_chunk(&mut self) {
        if self.status.state != TransferState::InFlight {
            return;
        }

        let progress = self.tracker.progress();
        if progress.errors > 0 {
            warn!(
                "spi: DMA error at offset {}, {} error(s)",
                self.status.chunk_offset, progress.errors
            );
            self.terminate();
            return;
        }
        if !progress.is_done() {
            return;
        }

        self.status.state = TransferState::ChunkDone;
        match self.handler.chunk_complete(&self.status) {
            ChunkAction::Advance if !self.status.final_chunk => self.advance_chunk(),
            ChunkAction::Advance | ChunkAction::Finish => self.terminate(),
        }
    }

    /// Handle the `SpiComplete` deferred event: clean up, then tell the host.
    ///
    /// Does nothing unless the transfer reached terminal completion, so a
    /// late event cannot end a transfer that is still running.
    ///
    /// # Errors
    ///
    /// Returns [`DmaError::TransferFailed`] if any DMA error was recorded.
    /// The host has been notified either way.
    pub fn finish<H: Host>(&mut self, host: &mut H) -> DmaResult<()> {
        if self.status.state != TransferState::Terminal {
            return Ok(());
        }

        let errors = self.tracker.progress().errors.saturating_add(self.faults);
        let issued = self.status.chunks_issued;
        self.cleanup(host);
        host.notify(Notification::SpiAsyncComplete { errors });

        if errors > 0 {
            warn!("spi: transfer failed after {} chunk(s), {} error(s)", issued, errors);
            Err(DmaError::TransferFailed)
        } else {
            info!("spi: transfer complete, {} chunk(s)", issued);
            Ok(())
        }
    }

    /// Halt both DMA channels immediately.
    pub fn cancel(&mut self) {
        for channel in DmaChannel::ALL {
            self.dma.cancel(channel);
        }
    }

    /// Release host handles and chains, reset to idle, halt DMA and drop the
    /// terminal event's reference.
    ///
    /// Chunk and terminal events still queued for this transfer are dropped.
    ///
    /// Safe to call at any time, including with no transfer active.
    pub fn cleanup<H: Host>(&mut self, host: &mut H) {
        let was_active = !self.is_idle();

        if let Some(cs) = self.status.chip_select {
            self.pins.write(cs.pin, true);
        }
        for region in [self.status.tx, self.status.rx].into_iter().flatten() {
            if let Some(handle) = region.handle() {
                host.release(handle);
            }
        }

        self.tx_chain.release();
        self.rx_chain.release();
        self.status = TransferStatus::IDLE;
        self.faults = 0;
        self.tracker.disarm();
        self.cancel();
        self.queue.retract(DeferredEvent::SpiChunk);
        self.queue.retract(DeferredEvent::SpiComplete);

        if was_active {
            self.queue.disarm(DeferredEvent::SpiComplete);
        }
    }

    fn build_chains(&mut self, request: &SpiTransfer) -> DmaResult<()> {
        if request.rx.is_some() {
            self.rx_chain.build(request.length)?;
        }
        if request.tx.is_some() {
            self.tx_chain.build(request.length)?;
        }
        Ok(())
    }

    /// Issue the chunk at the current offset on every active direction.
    fn step(&mut self) -> DmaResult<()> {
        let status = self.status;
        if let Some(cs) = status.chip_select {
            self.pins.write(cs.pin, false);
            self.delay.delay_us(cs.delay_us);
        }

        let length = status.current_chunk_len();
        self.tracker.arm(status.expected_completions());

        if let Some(rx) = status.rx {
            let source = self.dma.connection_address(status.port.rx_connection());
            let destination = rx.address_at(status.chunk_offset);
            self.rx_chain.populate(length, source, destination, Direction::Receive)?;
            if let Some(head) = self.rx_chain.head() {
                self.dma.begin(DmaChannel::Rx, head);
            }
        }
        if let Some(tx) = status.tx {
            let source = tx.address_at(status.chunk_offset);
            let destination = self.dma.connection_address(status.port.tx_connection());
            self.tx_chain.populate(length, source, destination, Direction::Transmit)?;
            if let Some(head) = self.tx_chain.head() {
                self.dma.begin(DmaChannel::Tx, head);
            }
        }

        self.status.state = TransferState::InFlight;
        self.status.chunks_issued = self.status.chunks_issued.saturating_add(1);
        trace!("spi: chunk at {} ({} bytes)", status.chunk_offset, length);
        Ok(())
    }

    /// Move to the next chunk, wrapping into the next repeat at the buffer end.
    fn advance_chunk(&mut self) {
        if let Some(cs) = self.status.chip_select {
            self.pins.write(cs.pin, true);
        }

        self.status.chunk_offset += self.status.chunk_size;
        if self.status.chunk_offset >= self.status.buffer_length {
            self.status.chunk_offset = 0;
            self.status.repeat = self.status.repeat.saturating_sub(1);
            if self.status.repeat == 0 {
                self.terminate();
                return;
            }
            debug!("spi: {} repeat(s) left", self.status.repeat);
        }
        self.status.final_chunk = self.status.repeat == 1
            && self.status.chunk_offset + self.status.chunk_size >= self.status.buffer_length;

        if let Some(cs) = self.status.chip_select {
            self.delay.delay_us(cs.delay_us);
        }
        if self.step().is_err() {
            warn!("spi: could not program chunk at {}", self.status.chunk_offset);
            self.faults = self.faults.saturating_add(1);
            self.terminate();
        }
    }

    /// Queue terminal completion once.
    fn terminate(&mut self) {
        if self.status.state == TransferState::Terminal {
            return;
        }
        self.status.state = TransferState::Terminal;
        self.queue.trigger(DeferredEvent::SpiComplete);
    }

    /// Undo a start whose first chunk could not be issued.
    fn abort_start(&mut self) {
        if let Some(cs) = self.status.chip_select {
            self.pins.write(cs.pin, true);
        }
        self.cancel();
        self.tracker.disarm();
        self.tx_chain.release();
        self.rx_chain.release();
        self.status = TransferStatus::IDLE;
        self.queue.disarm(DeferredEvent::SpiComplete);
    }
}
