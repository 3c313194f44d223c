//! Hardware Abstraction Boundary
//!
//! The transfer engine and the link state machine never touch registers.
//! Everything hardware-facing goes through the traits in this module, which
//! the board support crate implements on top of its register-level drivers.
//!
//! # Modules
//!
//! - [`dma`]: GPDMA channel programming and interrupt status
//! - [`pins`]: Digital output pins (chip-select, LEDs, radio enable)
//! - [`radio`]: Wireless radio chip primitives and callbacks
//!
//! # Interrupt Context
//!
//! Traits whose methods take `&self` ([`DmaInterrupts`], [`IrqLine`]) are
//! the only ones called from interrupt handlers. Everything taking
//! `&mut self` runs in the cooperative scheduler.
//!
//! # Delay Integration
//!
//! Chip-select settle delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod dma;
pub mod pins;
pub mod radio;

pub use dma::{ChannelConfig, Connection, DmaChannel, DmaInterrupts, FlowControl, Gpdma, SpiPort};
pub use pins::DigitalPins;
pub use radio::{IrqLine, NetAddresses, RadioChip, RadioEvent, RadioEvents, Security, Ssid};
