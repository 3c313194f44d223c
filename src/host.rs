//! Embedding host interface
//!
//! The host owns buffer lifetimes and receives every user-visible outcome.
//! The core never reports failure by staying silent: each transfer ends in
//! exactly one [`Notification::SpiAsyncComplete`] and each connect attempt
//! in exactly one [`Notification::WifiConnectComplete`].

/// Opaque host-managed handle keeping a buffer alive during a transfer.
///
/// The core hands it back through [`Host::release`] once the transfer has
/// terminated and never touches the buffer afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostRef(pub u32);

/// Lifecycle notification delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification<'a> {
    /// Transfer reached terminal completion with `errors` DMA errors
    SpiAsyncComplete {
        /// DMA errors recorded for the last chunk
        errors: u32,
    },
    /// A connect request resolved
    WifiConnectComplete {
        /// `0` on success, `1` when no lease was obtained
        error: i32,
        /// Status JSON on success, empty otherwise
        payload: &'a str,
    },
    /// The link went down
    WifiDisconnectComplete,
    /// The radio chip stopped responding
    WifiHang,
}

impl Notification<'_> {
    /// Message identifier as seen by the host.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Notification::SpiAsyncComplete { .. } => "spi_async_complete",
            Notification::WifiConnectComplete { .. } => "wifi_connect_complete",
            Notification::WifiDisconnectComplete => "wifi_disconnect_complete",
            Notification::WifiHang => "wifi_hang",
        }
    }

    /// Numeric argument carried with the tag.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Notification::SpiAsyncComplete { errors } => *errors as i64,
            Notification::WifiConnectComplete { error, .. } => *error as i64,
            Notification::WifiDisconnectComplete | Notification::WifiHang => 0,
        }
    }
}

/// Callbacks into the embedding host.
pub trait Host {
    /// Deliver a lifecycle notification.
    fn notify(&mut self, notification: Notification<'_>);

    /// Emit a link event JSON object on the wireless command channel.
    fn link_event(&mut self, json: &str);

    /// Raw socket-close IPC for `socket`.
    fn socket_closed(&mut self, socket: u32);

    /// Drop the host's reference on a buffer handle.
    fn release(&mut self, handle: HostRef);
}
