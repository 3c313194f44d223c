//! Centralized Constants
//!
//! Single source of truth for the magic numbers used by the transfer engine
//! and the link state machine.
//!
//! GPDMA control-word bit definitions live in `internal::gpdma_bits`.

// =============================================================================
// DMA Sizing
// =============================================================================

/// Maximum byte count a single GPDMA descriptor can move (12-bit field).
pub const SPI_MAX_DMA_SIZE: usize = 0xFFF;

/// Default number of descriptors reserved per direction.
///
/// Sixteen descriptors cover transfers up to 65520 bytes per chunk.
pub const DEFAULT_CHAIN_CAPACITY: usize = 16;

// =============================================================================
// Channel Assignment
// =============================================================================

/// GPDMA channel statically assigned to the transmit direction.
pub const TX_CHANNEL: u8 = 0;

/// GPDMA channel statically assigned to the receive direction.
pub const RX_CHANNEL: u8 = 1;

// =============================================================================
// Link Timing
// =============================================================================

/// Animation ticks allowed for negotiation before it is abandoned.
pub const MAX_BOOT_TICKS: u8 = 120;

// =============================================================================
// Payload Capacities
// =============================================================================

/// Capacity of a link status JSON payload.
///
/// Worst case: four dotted quads plus a 32-byte SSID made entirely of
/// control characters (six bytes each once escaped) is 334 bytes.
pub const STATUS_PAYLOAD_CAPACITY: usize = 352;

/// Capacity of a short link event JSON object.
pub const EVENT_PAYLOAD_CAPACITY: usize = 64;

/// Maximum SSID length in bytes (IEEE 802.11).
pub const MAX_SSID_LEN: usize = 32;

/// Number of radio events buffered per IRQ service pass.
pub const RADIO_EVENT_CAPACITY: usize = 8;
