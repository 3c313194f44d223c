//! GPDMA controller boundary.
//!
//! Channel programming happens from the scheduler through [`Gpdma`]; the
//! interrupt bridge only ever queries and clears status through
//! [`DmaInterrupts`].

use crate::dma::LinkedListItem;
use crate::internal::constants::{RX_CHANNEL, TX_CHANNEL};

/// The two statically assigned GPDMA channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaChannel {
    /// Memory-to-peripheral channel
    Tx,
    /// Peripheral-to-memory channel
    Rx,
}

impl DmaChannel {
    /// Both channels, transmit first.
    pub const ALL: [DmaChannel; 2] = [DmaChannel::Tx, DmaChannel::Rx];

    /// Hardware channel number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            DmaChannel::Tx => TX_CHANNEL,
            DmaChannel::Rx => RX_CHANNEL,
        }
    }
}

/// SSP (SPI) controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiPort {
    /// SSP0 - peripheral ports
    #[default]
    Ssp0,
    /// SSP1 - radio chip bus
    Ssp1,
}

impl SpiPort {
    /// GPDMA connection feeding this port's transmit FIFO.
    #[must_use]
    pub const fn tx_connection(self) -> Connection {
        match self {
            SpiPort::Ssp0 => Connection::Ssp0Tx,
            SpiPort::Ssp1 => Connection::Ssp1Tx,
        }
    }

    /// GPDMA connection draining this port's receive FIFO.
    #[must_use]
    pub const fn rx_connection(self) -> Connection {
        match self {
            SpiPort::Ssp0 => Connection::Ssp0Rx,
            SpiPort::Ssp1 => Connection::Ssp1Rx,
        }
    }
}

/// GPDMA peripheral connection (request line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Connection {
    /// SSP0 transmit
    Ssp0Tx,
    /// SSP0 receive
    Ssp0Rx,
    /// SSP1 transmit
    Ssp1Tx,
    /// SSP1 receive
    Ssp1Rx,
}

/// Transfer type and flow controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    /// Memory to peripheral, DMA controls flow
    MemoryToPeripheral,
    /// Peripheral to memory, DMA controls flow
    PeripheralToMemory,
}

/// Static channel configuration applied once per transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Transfer type
    pub flow: FlowControl,
    /// Source peripheral connection (unused for memory sources)
    pub source: Option<Connection>,
    /// Destination peripheral connection (unused for memory destinations)
    pub destination: Option<Connection>,
}

impl ChannelConfig {
    /// Configuration for feeding `port`'s transmit FIFO from memory.
    #[must_use]
    pub const fn transmit(port: SpiPort) -> Self {
        Self {
            flow: FlowControl::MemoryToPeripheral,
            source: None,
            destination: Some(port.tx_connection()),
        }
    }

    /// Configuration for draining `port`'s receive FIFO into memory.
    #[must_use]
    pub const fn receive(port: SpiPort) -> Self {
        Self {
            flow: FlowControl::PeripheralToMemory,
            source: Some(port.rx_connection()),
            destination: None,
        }
    }
}

/// GPDMA channel programming.
pub trait Gpdma {
    /// Apply `config` to `channel`. The channel stays disabled.
    fn configure(&mut self, channel: DmaChannel, config: &ChannelConfig);

    /// Load `head` into `channel` and enable it.
    ///
    /// The controller follows `head`'s link words on its own, so every
    /// descriptor in the chain must stay in place until the channel stops.
    fn begin(&mut self, channel: DmaChannel, head: &LinkedListItem);

    /// Halt `channel` immediately, abandoning any in-flight descriptor.
    fn cancel(&mut self, channel: DmaChannel);

    /// Bus address of a peripheral connection's data register.
    fn connection_address(&self, connection: Connection) -> u32;
}

/// Per-channel interrupt status. Called from interrupt context.
pub trait DmaInterrupts {
    /// Terminal-count interrupt pending on `channel`.
    fn terminal_count_pending(&self, channel: DmaChannel) -> bool;

    /// Clear the terminal-count interrupt on `channel`.
    fn clear_terminal_count(&self, channel: DmaChannel);

    /// Error interrupt pending on `channel`.
    fn error_pending(&self, channel: DmaChannel) -> bool;

    /// Clear the error interrupt on `channel`.
    fn clear_error(&self, channel: DmaChannel);
}
