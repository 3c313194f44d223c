//! Synchronization Support
//!
//! State shared between interrupt handlers and the cooperative scheduler is
//! wrapped in [`CriticalSectionCell`]. Interrupt handlers and scheduler code
//! both go through `critical_section::with()`, so every mutation is atomic
//! with respect to the other side.
//!
//! # Example
//!
//! ```ignore
//! use lpc_spi_link::sync::CriticalSectionCell;
//!
//! static COUNTER: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
//!
//! #[interrupt]
//! fn GPIO7() {
//!     COUNTER.with(|n| *n += 1);
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;
