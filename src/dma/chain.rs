//! Fixed-capacity descriptor chain.

use super::descriptor::{Direction, LinkedListItem};
use crate::error::{DmaError, DmaResult};
use crate::internal::constants::SPI_MAX_DMA_SIZE;

/// Number of descriptors needed to move `length` bytes at `max_chunk` bytes
/// per descriptor.
///
/// Zero bytes need zero descriptors.
#[inline]
#[must_use]
pub const fn descriptor_count(length: usize, max_chunk: usize) -> usize {
    if max_chunk == 0 {
        return 0;
    }
    length.div_ceil(max_chunk)
}

/// Pool of `N` linked list items forming one direction's chain.
///
/// [`build`](Self::build) reserves items for a whole transfer;
/// [`populate`](Self::populate) then programs them for each chunk.
pub struct DescriptorChain<const N: usize> {
    items: [LinkedListItem; N],
    /// Items reserved by `build`
    reserved: usize,
    /// Items programmed by the last `populate`
    active: usize,
}

impl<const N: usize> DescriptorChain<N> {
    /// Create an empty chain (const, suitable for static initialization).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: [const { LinkedListItem::new() }; N],
            reserved: 0,
            active: 0,
        }
    }

    /// Pool capacity in descriptors.
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Reserve enough descriptors for transfers of up to `length` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DmaError::ChainTooLong`] if the pool holds fewer than
    /// `descriptor_count(length)` items. The chain is left released.
    pub fn build(&mut self, length: usize) -> DmaResult<()> {
        self.release();
        let count = descriptor_count(length, SPI_MAX_DMA_SIZE);
        if count > N {
            return Err(DmaError::ChainTooLong);
        }
        self.reserved = count;
        Ok(())
    }

    /// Program the chain to move `length` bytes between `source` and
    /// `destination`.
    ///
    /// The memory side advances by [`SPI_MAX_DMA_SIZE`] per descriptor; the
    /// peripheral side stays fixed. A zero `length` programs nothing.
    ///
    /// # Errors
    ///
    /// - [`DmaError::ChainNotBuilt`] if nothing was reserved
    /// - [`DmaError::ChainTooLong`] if `length` needs more descriptors than
    ///   were reserved
    pub fn populate(
        &mut self,
        length: usize,
        mut source: u32,
        mut destination: u32,
        direction: Direction,
    ) -> DmaResult<()> {
        let count = descriptor_count(length, SPI_MAX_DMA_SIZE);
        if count == 0 {
            self.active = 0;
            return Ok(());
        }
        if self.reserved == 0 {
            return Err(DmaError::ChainNotBuilt);
        }
        if count > self.reserved {
            return Err(DmaError::ChainTooLong);
        }

        let base = direction.base_control();
        let remainder = length % SPI_MAX_DMA_SIZE;
        let step = SPI_MAX_DMA_SIZE as u32;

        for i in 0..count {
            if i + 1 == count {
                let size = if remainder == 0 { SPI_MAX_DMA_SIZE } else { remainder };
                self.items[i].setup(source, destination, 0, base | size as u32);
                self.items[i].terminate();
            } else {
                let next = self.items[i + 1].address();
                self.items[i].setup(source, destination, next, base | step);
                match direction {
                    Direction::Transmit => source = source.wrapping_add(step),
                    Direction::Receive => destination = destination.wrapping_add(step),
                }
            }
        }

        self.active = count;
        Ok(())
    }

    /// First programmed descriptor, if any.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&LinkedListItem> {
        self.items().first()
    }

    /// Descriptors programmed by the last [`populate`](Self::populate).
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[LinkedListItem] {
        &self.items[..self.active]
    }

    /// Number of programmed descriptors.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.active
    }

    /// No descriptors are programmed.
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Descriptors reserved by the last [`build`](Self::build).
    #[inline(always)]
    #[must_use]
    pub const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Return every descriptor to the pool. No-op on an unbuilt chain.
    pub fn release(&mut self) {
        for item in &self.items[..self.reserved] {
            item.clear();
        }
        self.reserved = 0;
        self.active = 0;
    }
}

impl<const N: usize> Default for DescriptorChain<N> {
    fn default() -> Self {
        Self::new()
    }
}
