//! DMA Descriptor Chains
//!
//! The GPDMA moves at most [`SPI_MAX_DMA_SIZE`] bytes per descriptor, so a
//! chunk longer than that is split across a singly linked chain of
//! [`LinkedListItem`]s that the controller walks on its own. Only the last
//! item raises the terminal-count interrupt: the engine sees exactly one
//! completion per direction per chunk, however many descriptors it took.
//!
//! All memory is static. A [`DescriptorChain`] owns a fixed pool of `N`
//! items; building a chain longer than the pool fails with
//! [`DmaError::ChainTooLong`](crate::error::DmaError::ChainTooLong).
//!
//! # Example
//!
//! ```ignore
//! use lpc_spi_link::dma::{DescriptorChain, Direction};
//!
//! static mut TX_CHAIN: DescriptorChain<16> = DescriptorChain::new();
//!
//! chain.build(10_000)?;
//! chain.populate(10_000, buffer_addr, ssp_data_register, Direction::Transmit)?;
//! dma.begin(DmaChannel::Tx, chain.head().ok_or(DmaError::ChainNotBuilt)?);
//! ```
//!
//! [`SPI_MAX_DMA_SIZE`]: crate::internal::constants::SPI_MAX_DMA_SIZE

mod chain;
mod descriptor;

pub use chain::{DescriptorChain, descriptor_count};
pub use descriptor::{Direction, LinkedListItem};
