//! Error types for the SPI transfer engine and wireless link
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Transfer request validation failures
//! - [`DmaError`]: Descriptor chain and DMA channel issues
//! - [`LinkError`]: Wireless link request failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the public entry points.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Transfer request validation errors
///
/// These errors are returned synchronously by `SpiAsync::start` before any
/// hardware is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Neither a transmit nor a receive buffer was supplied
    NoBuffers,
    /// Chunk size must be non-zero
    ZeroChunkSize,
    /// A buffer region is shorter than the requested transfer length
    BufferTooShort,
    /// Another transfer is still in flight
    TransferInProgress,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::NoBuffers => "no transmit or receive buffer",
            ConfigError::ZeroChunkSize => "chunk size is zero",
            ConfigError::BufferTooShort => "buffer shorter than transfer length",
            ConfigError::TransferInProgress => "transfer already in progress",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Descriptor chain and DMA channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Descriptor pool too small for the requested chain
    ChainTooLong,
    /// Chain was used before being built
    ChainNotBuilt,
    /// Hardware reported a transfer error on a channel
    TransferFailed,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::ChainTooLong => "descriptor chain exceeds pool",
            DmaError::ChainNotBuilt => "descriptor chain not built",
            DmaError::TransferFailed => "DMA transfer error",
        }
    }
}

// =============================================================================
// Link Errors
// =============================================================================

/// Wireless link request errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Connect request carried an empty SSID
    EmptySsid,
    /// Radio refused the request (mid-negotiation or powered down)
    RadioBusy,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LinkError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LinkError::EmptySsid => "no SSID given",
            LinkError::RadioBusy => "radio busy",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::TransferInProgress)) => { /* ... */ }
///     Err(Error::Dma(DmaError::ChainTooLong)) => { /* ... */ }
///     Err(Error::Link(LinkError::EmptySsid)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// Link error
    Link(LinkError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Link(e) => write!(f, "link: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Error::Link(e)
    }
}

/// Result type alias for crate operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for request validation
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for link operations
pub type LinkResult<T> = core::result::Result<T, LinkError>;

// =============================================================================
// Unit Tests
// =============================================================================
