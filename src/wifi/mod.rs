//! Wireless Link
//!
//! Tracks the radio's connect, disconnect and DHCP lifecycle, drives the
//! connection and error LEDs, and turns radio callbacks into host-visible
//! link events and deferred notifications.
//!
//! # States
//!
//! ```text
//!                  enable()                 Acquire
//!  Disconnected ─────────────► Initializing ───────► Negotiating
//!       ▲  ▲                                          │      │
//!       │  │   next tick                 Error        │      │ Connected
//!       │  └──────────── Error(code) ◄────────────────┘      ▼
//!       │                                         LinkUp ─► DhcpPending
//!       │        DhcpFailed / Disconnected /                 │
//!       └─────────────── negotiation timeout ◄───────────────┤ DhcpSuccess
//!                                                            ▼
//!                                                          Online
//! ```
//!
//! # Host Channels
//!
//! - **Link events** (`Host::link_event`) are emitted synchronously from
//!   radio callbacks: `acquire`, `connect`, `disconnect`, `dhcp-success`,
//!   `dhcp-failed`, `error` and `status` JSON objects.
//! - **Notifications** (`Host::notify`) for connect results, disconnects
//!   and radio hangs go through the deferred event queue.
//!
//! DHCP failure is reported asymmetrically: with a connect request pending
//! the host only gets `wifi_connect_complete` with error 1; otherwise it
//! gets `wifi_disconnect_complete`.

mod config;
mod link;
mod payload;

pub use config::{LinkConfig, LinkPins};
pub use link::{LinkState, WifiLink};
pub use payload::{
    DISCONNECTED_STATUS, EventPayload, LinkEvent, StatusPayload, connected_status,
    disconnected_status,
};
