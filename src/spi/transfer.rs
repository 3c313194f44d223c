//! Transfer request types.

use crate::error::{ConfigError, ConfigResult};
use crate::hal::SpiPort;
use crate::host::HostRef;

use super::TransferStatus;

// =============================================================================
// Buffer Regions
// =============================================================================

/// Raw memory region handed to the DMA controller, plus the host's handle
/// keeping it alive.
///
/// The engine never dereferences the region; it only programs its address
/// into descriptors. The handle is given back through
/// [`Host::release`](crate::host::Host::release) at terminal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaRegion {
    address: u32,
    len: usize,
    handle: Option<HostRef>,
}

impl DmaRegion {
    /// Describe `len` bytes at `ptr`.
    ///
    /// # Safety
    ///
    /// The memory must stay valid (and, for a receive region, writable and
    /// otherwise unaliased) until the transfer using it has delivered its
    /// terminal notification or been cleaned up.
    #[must_use]
    pub unsafe fn from_raw(ptr: *const u8, len: usize) -> Self {
        Self {
            address: ptr as u32,
            len,
            handle: None,
        }
    }

    /// Region over a static transmit buffer.
    #[must_use]
    pub fn from_static(buf: &'static [u8]) -> Self {
        // SAFETY: 'static data outlives any transfer.
        unsafe { Self::from_raw(buf.as_ptr(), buf.len()) }
    }

    /// Region over a static receive buffer. The buffer is consumed for the
    /// rest of the program.
    #[must_use]
    pub fn from_static_mut(buf: &'static mut [u8]) -> Self {
        // SAFETY: the exclusive 'static borrow is given up to the DMA.
        unsafe { Self::from_raw(buf.as_mut_ptr(), buf.len()) }
    }

    /// Attach the host handle to release on completion.
    #[must_use]
    pub const fn with_handle(mut self, handle: HostRef) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Bus address of the first byte.
    #[inline(always)]
    #[must_use]
    pub const fn address(&self) -> u32 {
        self.address
    }

    /// Length in bytes.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Zero-length region.
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Host handle, if any.
    #[inline(always)]
    #[must_use]
    pub const fn handle(&self) -> Option<HostRef> {
        self.handle
    }

    /// Bus address `offset` bytes in.
    #[inline(always)]
    pub(crate) const fn address_at(&self, offset: usize) -> u32 {
        self.address.wrapping_add(offset as u32)
    }
}

// =============================================================================
// Chip Select
// =============================================================================

/// Chip-select pin driven around each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipSelect {
    /// Pin number
    pub pin: u8,
    /// Settle delay after each edge, in microseconds
    pub delay_us: u32,
}

impl ChipSelect {
    /// Chip-select on `pin` with `delay_us` settle time.
    #[must_use]
    pub const fn new(pin: u8, delay_us: u32) -> Self {
        Self { pin, delay_us }
    }
}

// =============================================================================
// Chunk Handler
// =============================================================================

/// What to do after a chunk completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChunkAction {
    /// Issue the next chunk (or repeat, or finish when none are left)
    Advance,
    /// Stop now and deliver terminal completion
    Finish,
}

/// Per-chunk hook owned by the engine.
///
/// Runs in the scheduler, never in interrupt context. Chunks that ended in a
/// DMA error go straight to terminal completion without consulting the
/// handler. On the final chunk the transfer terminates whatever the handler
/// returns.
pub trait ChunkHandler {
    /// Called once every active direction finished the current chunk.
    fn chunk_complete(&mut self, status: &TransferStatus) -> ChunkAction;
}

/// Handler that always advances to the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoAdvance;

impl ChunkHandler for AutoAdvance {
    #[inline]
    fn chunk_complete(&mut self, _status: &TransferStatus) -> ChunkAction {
        ChunkAction::Advance
    }
}

// =============================================================================
// Transfer Request
// =============================================================================

/// Transfer request built with `with_*` methods and passed to
/// [`SpiAsync::start`](super::SpiAsync::start).
///
/// ```ignore
/// let request = SpiTransfer::new(SpiPort::Ssp0, 600)
///     .with_tx(DmaRegion::from_static(&FRAME).with_handle(tx_ref))
///     .with_chunk_size(60)
///     .with_repeat(10)
///     .with_chip_select(ChipSelect::new(CS_PIN, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiTransfer {
    pub(crate) port: SpiPort,
    pub(crate) length: usize,
    pub(crate) tx: Option<DmaRegion>,
    pub(crate) rx: Option<DmaRegion>,
    pub(crate) chunk_size: usize,
    pub(crate) repeat: u32,
    pub(crate) chip_select: Option<ChipSelect>,
}

impl SpiTransfer {
    /// Transfer of `length` bytes on `port`, sent as one chunk, once.
    #[must_use]
    pub fn new(port: SpiPort, length: usize) -> Self {
        Self {
            port,
            length,
            tx: None,
            rx: None,
            chunk_size: length.max(1),
            repeat: 1,
            chip_select: None,
        }
    }

    /// Transmit from `region`.
    #[must_use]
    pub fn with_tx(mut self, region: DmaRegion) -> Self {
        self.tx = Some(region);
        self
    }

    /// Receive into `region`.
    #[must_use]
    pub fn with_rx(mut self, region: DmaRegion) -> Self {
        self.rx = Some(region);
        self
    }

    /// Split the buffer into chunks of `chunk_size` bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Run over the whole buffer `repeat` times. Zero runs a single chunk.
    #[must_use]
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Frame each chunk with a chip-select pin.
    #[must_use]
    pub fn with_chip_select(mut self, chip_select: ChipSelect) -> Self {
        self.chip_select = Some(chip_select);
        self
    }

    /// Total length in bytes.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Whether the whole transfer is one chunk.
    #[must_use]
    pub const fn is_single_chunk(&self) -> bool {
        self.repeat == 0 || self.chunk_size >= self.length
    }

    /// Check the request before any hardware is touched.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoBuffers`] if neither direction has a region
    /// - [`ConfigError::ZeroChunkSize`] for a zero chunk size
    /// - [`ConfigError::BufferTooShort`] if a region is shorter than `length`
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tx.is_none() && self.rx.is_none() {
            return Err(ConfigError::NoBuffers);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        let too_short = |region: &Option<DmaRegion>| region.is_some_and(|r| r.len() < self.length);
        if too_short(&self.tx) || too_short(&self.rx) {
            return Err(ConfigError::BufferTooShort);
        }
        Ok(())
    }
}
