//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`constants`]: Internal constants and magic numbers
//! - [`gpdma_bits`]: GPDMA control word bit field constants
//! - [`volatile`]: Volatile cell used by DMA-visible descriptor fields

pub(crate) mod constants;
pub(crate) mod gpdma_bits;
pub(crate) mod volatile;
