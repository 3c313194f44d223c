//! LPC18xx SPI Async and Wireless Link Core
//!
//! A `no_std`, `no_alloc` implementation of the two interrupt-driven
//! subsystems of an LPC18xx board with a CC3000-class radio attached:
//! DMA-chunked SPI bulk transfers, and the radio's connect/DHCP lifecycle.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! 1. **Interrupt Bridge** ([`interrupt`]): Acknowledges hardware, updates
//!    counters and flags, queues deferred events. Nothing else runs in ISRs.
//! 2. **Deferred Events** ([`event`]): ISR-safe FIFO of one-shot work items
//!    with per-event reference counts.
//! 3. **Scheduler** ([`runtime`]): Pops events and runs the matching handler.
//! 4. **Transfer Engine** ([`spi`]): Chunk/repeat state machine over
//!    GPDMA linked-list descriptor chains ([`dma`]).
//! 5. **Link State Machine** ([`wifi`]): Radio lifecycle, LEDs, link event
//!    JSON and host notifications.
//! 6. **HAL Layer** ([`hal`]): Traits the board support crate implements
//!    (GPDMA, pins, radio chip). The embedding host is [`host::Host`].
//!
//! ## Hardware Notes
//!
//! - **GPDMA**: Channel 0 transmits, channel 1 receives; each descriptor
//!   moves at most [`constants::SPI_MAX_DMA_SIZE`] bytes.
//! - **SSP**: Byte-wide frames, one DMA request line per direction.
//! - **Radio**: IRQ is an active-low, falling-edge GPIO interrupt.
//!
//! # Features
//!
//! - `defmt`: Log through defmt and derive `defmt::Format` for public types
//! - `log`: Log through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! use lpc_spi_link::{
//!     ChunkTracker, DmaRegion, EventQueue, LinkConfig, LinkPins, RadioIrqLatch, Runtime,
//!     SpiAsync, SpiPort, SpiTransfer, WifiLink, on_dma_interrupt,
//! };
//!
//! static QUEUE: EventQueue = EventQueue::new();
//! static TRACKER: ChunkTracker = ChunkTracker::new();
//! static RADIO_IRQ: RadioIrqLatch = RadioIrqLatch::new();
//!
//! let spi = SpiAsync::new(gpdma, pins.clone(), delay, &QUEUE, &TRACKER);
//! let mut link = WifiLink::new(radio, pins, &QUEUE, LinkConfig::new(LINK_PINS));
//! link.init();
//! let mut runtime = Runtime::new(&QUEUE, &RADIO_IRQ, spi, link, host);
//!
//! // Stream a buffer out of SSP0 three times in 512-byte chunks
//! runtime.start_transfer(
//!     SpiTransfer::new(SpiPort::Ssp0, FRAME.len())
//!         .with_tx(DmaRegion::from_static(&FRAME))
//!         .with_chunk_size(512)
//!         .with_repeat(3),
//! )?;
//!
//! loop {
//!     runtime.run_pending();
//! }
//! ```
//!
//! # Memory Requirements
//!
//! With the default pool (16 descriptors per direction, 16 bytes each):
//! 512 bytes of descriptors, enough for a 65 KB buffer per chunk.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// Logging macros must be declared before any module that uses them.
#[macro_use]
mod fmt;

// =============================================================================
// Modules
// =============================================================================

pub mod dma;
pub mod error;
pub mod event;
pub mod hal;
pub mod host;
pub mod interrupt;
pub mod runtime;
pub mod spi;
pub mod sync;
pub mod wifi;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use dma::{DescriptorChain, Direction, LinkedListItem};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, LinkError, LinkResult, Result,
};
pub use event::{DeferredEvent, EventQueue};
pub use hal::{
    ChannelConfig, DigitalPins, DmaChannel, DmaInterrupts, Gpdma, IrqLine, NetAddresses,
    RadioChip, RadioEvent, Security, SpiPort,
};
pub use host::{Host, HostRef, Notification};
pub use interrupt::{RadioIrqLatch, on_dma_interrupt};
pub use runtime::Runtime;
pub use spi::{
    AutoAdvance, ChipSelect, ChunkAction, ChunkHandler, ChunkTracker, DmaRegion, SpiAsync,
    SpiTransfer, TransferState, TransferStatus,
};
pub use wifi::{LinkConfig, LinkPins, LinkState, WifiLink};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Descriptor pool
        DEFAULT_CHAIN_CAPACITY,
        // Link timing
        MAX_BOOT_TICKS,
        // Radio
        MAX_SSID_LEN,
        RADIO_EVENT_CAPACITY,
        RX_CHANNEL,
        // DMA
        SPI_MAX_DMA_SIZE,
        // Payloads
        EVENT_PAYLOAD_CAPACITY,
        STATUS_PAYLOAD_CAPACITY,
        TX_CHANNEL,
    };
}
