//! Configuration types for the wireless link

use crate::internal::constants::MAX_BOOT_TICKS;

/// Board pins owned by the link state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkPins {
    /// Connection LED: blinks while negotiating, solid when online
    pub connection_led: u8,
    /// Error LED: lit after an error, disconnect or DHCP failure
    pub error_led: u8,
    /// Radio enable line, held low at bring-up
    pub radio_enable: u8,
}

/// Wireless link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Board pins
    pub pins: LinkPins,
    /// Animation ticks a negotiation may take before it is abandoned
    pub boot_ticks: u8,
    /// Start with the connection LED blinking (board reconnects at boot)
    pub fast_connect: bool,
}

impl LinkConfig {
    /// Create a configuration with default timing
    #[must_use]
    pub const fn new(pins: LinkPins) -> Self {
        Self {
            pins,
            boot_ticks: MAX_BOOT_TICKS,
            fast_connect: false,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the negotiation timeout in animation ticks
    #[must_use]
    pub const fn with_boot_ticks(mut self, ticks: u8) -> Self {
        self.boot_ticks = ticks;
        self
    }

    /// Enable or disable blinking from boot
    #[must_use]
    pub const fn with_fast_connect(mut self, enabled: bool) -> Self {
        self.fast_connect = enabled;
        self
    }
}
