//! SPI Async Transfer Engine
//!
//! Drives one SSP port through the two GPDMA channels, chunk by chunk and
//! repeat by repeat, without ever blocking.
//!
//! # Flow
//!
//! ```text
//!  start() ──► Armed ──► step() ──► InFlight ──(DMA IRQ per direction)──┐
//!                          ▲                                            │
//!                          │                                     SpiChunk event
//!                          │                                            │
//!                     advance_chunk() ◄── ChunkDone ◄── on_chunk() ◄────┘
//!                          │
//!              (final chunk done, DMA error or handler Finish)
//!                          ▼
//!                      Terminal ──SpiComplete event──► finish() ──► Idle
//! ```
//!
//! The interrupt bridge only counts completions in a shared
//! [`ChunkTracker`]; every state change above happens in the scheduler.
//!
//! # Ownership
//!
//! The engine owns its descriptor chains and the in-flight
//! [`TransferStatus`]. Buffers are described by [`DmaRegion`]s whose memory
//! the host guarantees until the `spi_async_complete` notification.

mod engine;
mod tracker;
mod transfer;

pub use engine::SpiAsync;
pub use tracker::{ChunkProgress, ChunkTracker};
pub use transfer::{AutoAdvance, ChipSelect, ChunkAction, ChunkHandler, DmaRegion, SpiTransfer};

use crate::hal::SpiPort;

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// No transfer
    #[default]
    Idle,
    /// Channels configured, first chunk not yet issued
    Armed,
    /// A chunk's DMA programs are running
    InFlight,
    /// Every direction finished the chunk; deciding what comes next
    ChunkDone,
    /// Terminal completion pending delivery
    Terminal,
}

/// State of the single in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStatus {
    /// Engine state
    pub state: TransferState,
    /// SSP port
    pub port: SpiPort,
    /// Total buffer length in bytes
    pub buffer_length: usize,
    /// Offset of the current chunk
    pub chunk_offset: usize,
    /// Bytes per chunk
    pub chunk_size: usize,
    /// Passes over the buffer still to run, including the current one
    pub repeat: u32,
    /// Chip-select framing, if any
    pub chip_select: Option<ChipSelect>,
    /// Transmit region
    pub tx: Option<DmaRegion>,
    /// Receive region
    pub rx: Option<DmaRegion>,
    /// Chunk programs issued so far
    pub chunks_issued: u32,
    /// The chunk in flight ends the transfer
    pub final_chunk: bool,
}

impl TransferStatus {
    /// Idle defaults.
    pub const IDLE: Self = Self {
        state: TransferState::Idle,
        port: SpiPort::Ssp0,
        buffer_length: 0,
        chunk_offset: 0,
        chunk_size: 0,
        repeat: 0,
        chip_select: None,
        tx: None,
        rx: None,
        chunks_issued: 0,
        final_chunk: false,
    };

    /// Completions that make one chunk done: one per active direction.
    #[inline]
    #[must_use]
    pub fn expected_completions(&self) -> u8 {
        u8::from(self.tx.is_some()) + u8::from(self.rx.is_some())
    }

    /// Length of the chunk at the current offset, clamped to the buffer end.
    #[inline]
    #[must_use]
    pub fn current_chunk_len(&self) -> usize {
        self.chunk_size
            .min(self.buffer_length.saturating_sub(self.chunk_offset))
    }
}

impl Default for TransferStatus {
    fn default() -> Self {
        Self::IDLE
    }
}
