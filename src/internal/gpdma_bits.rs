//! GPDMA linked-list-item control word bit fields.
//!
//! Based on the LPC18xx user manual, GPDMA channel control register.

/// Channel control word bit field constants
pub mod control {
    /// Transfer size mask (12 bits)
    pub const TRANSFER_SIZE_MASK: u32 = 0xFFF;
    /// Source AHB master select - use AHB master 1 for the source
    pub const SRC_MASTER: u32 = 1 << 24;
    /// Destination AHB master select - use AHB master 1 for the destination
    pub const DST_MASTER: u32 = 1 << 25;
    /// Source increment - source address advances after each transfer
    pub const SRC_INCREMENT: u32 = 1 << 26;
    /// Destination increment - destination address advances after each transfer
    pub const DST_INCREMENT: u32 = 1 << 27;
    /// Terminal count interrupt enable - raise the completion interrupt
    pub const TERMINAL_COUNT_IRQ: u32 = 1 << 31;

    /// Base control for memory-to-peripheral descriptors
    pub const TX_BASE: u32 = DST_MASTER | SRC_INCREMENT;
    /// Base control for peripheral-to-memory descriptors
    pub const RX_BASE: u32 = SRC_MASTER | DST_INCREMENT;
}
