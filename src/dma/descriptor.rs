//! GPDMA linked list item
//!
//! Layout matches the controller's LLI format: source, destination, next
//! item, control. The controller reads items straight from memory, so every
//! field is volatile.

use crate::internal::gpdma_bits::control;
use crate::internal::volatile::VolatileCell;

/// Transfer direction of a descriptor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Memory to SSP: source increments, destination fixed
    Transmit,
    /// SSP to memory: source fixed, destination increments
    Receive,
}

impl Direction {
    /// Control bits shared by every descriptor of this direction.
    #[inline(always)]
    #[must_use]
    pub const fn base_control(self) -> u32 {
        match self {
            Direction::Transmit => control::TX_BASE,
            Direction::Receive => control::RX_BASE,
        }
    }
}

/// One GPDMA linked list item (16 bytes, word aligned).
#[repr(C, align(4))]
pub struct LinkedListItem {
    source: VolatileCell<u32>,
    destination: VolatileCell<u32>,
    next: VolatileCell<u32>,
    control: VolatileCell<u32>,
}

impl LinkedListItem {
    /// Size of one item in bytes
    pub const SIZE: usize = 16;

    /// Create a zeroed item
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: VolatileCell::new(0),
            destination: VolatileCell::new(0),
            next: VolatileCell::new(0),
            control: VolatileCell::new(0),
        }
    }

    /// Write all four words
    #[inline(always)]
    pub(crate) fn setup(&self, source: u32, destination: u32, next: u32, control: u32) {
        self.source.set(source);
        self.destination.set(destination);
        self.next.set(next);
        self.control.set(control);
    }

    /// Mark this item as the end of its chain
    #[inline(always)]
    pub(crate) fn terminate(&self) {
        self.next.set(0);
        self.control.update(|c| c | control::TERMINAL_COUNT_IRQ);
    }

    /// Zero all fields
    #[inline(always)]
    pub(crate) fn clear(&self) {
        self.setup(0, 0, 0, 0);
    }

    /// Source address
    #[inline(always)]
    #[must_use]
    pub fn source(&self) -> u32 {
        self.source.get()
    }

    /// Destination address
    #[inline(always)]
    #[must_use]
    pub fn destination(&self) -> u32 {
        self.destination.get()
    }

    /// Address of the next item, `0` for the last one
    #[inline(always)]
    #[must_use]
    pub fn next_address(&self) -> u32 {
        self.next.get()
    }

    /// Raw control word
    #[inline(always)]
    #[must_use]
    pub fn control(&self) -> u32 {
        self.control.get()
    }

    /// Byte count programmed into the control word
    #[inline(always)]
    #[must_use]
    pub fn transfer_size(&self) -> usize {
        (self.control.get() & control::TRANSFER_SIZE_MASK) as usize
    }

    /// Whether completing this item raises the terminal-count interrupt
    #[inline(always)]
    #[must_use]
    pub fn raises_interrupt(&self) -> bool {
        self.control.get() & control::TERMINAL_COUNT_IRQ != 0
    }

    /// Whether this item ends its chain
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next.get() == 0
    }

    /// Bus address of this item, as stored in a predecessor's link word
    #[inline(always)]
    #[must_use]
    pub fn address(&self) -> u32 {
        core::ptr::from_ref(self) as u32
    }
}

impl Default for LinkedListItem {
    fn default() -> Self {
        Self::new()
    }
}
