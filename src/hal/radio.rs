//! Wireless radio chip boundary.
//!
//! The chip's own protocol (its `wlan_*` command set, HCI framing, socket
//! layer) stays behind [`RadioChip`]. The link state machine only sees the
//! handful of primitives below and the [`RadioEvent`]s the chip reports when
//! its interrupt is serviced.

use core::net::Ipv4Addr;

use heapless::{Deque, String};

use crate::internal::constants::{MAX_SSID_LEN, RADIO_EVENT_CAPACITY};

/// Network name as reported by the radio.
pub type Ssid = String<MAX_SSID_LEN>;

/// Events collected while servicing one radio interrupt.
pub type RadioEvents = Deque<RadioEvent, RADIO_EVENT_CAPACITY>;

/// Network security mode for [`RadioChip::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Security {
    /// Open network
    Unsecured,
    /// WEP
    Wep,
    /// WPA personal
    Wpa,
    /// WPA2 personal
    #[default]
    Wpa2,
}

impl Security {
    /// Parse the host's security name (`"wpa2"`, `"wpa"`, `"wep"`,
    /// `"unsecured"`). Unknown names fall back to WPA2.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "unsecured" => Security::Unsecured,
            "wep" => Security::Wep,
            "wpa" => Security::Wpa,
            _ => Security::Wpa2,
        }
    }
}

/// Callbacks raised by the radio chip while servicing its interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// Started acquiring a network
    Acquire,
    /// Acquisition failed with a chip error code
    Error(i32),
    /// Associated with an access point
    Connected,
    /// Association lost
    Disconnected,
    /// DHCP lease obtained
    DhcpSuccess,
    /// DHCP lease could not be obtained
    DhcpFailed,
    /// Remote side closed a TCP socket
    TcpClose(u32),
    /// The chip stopped answering
    Hang,
}

/// Addresses of the current lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetAddresses {
    /// Station address
    pub ip: Ipv4Addr,
    /// DNS server
    pub dns: Ipv4Addr,
    /// DHCP server
    pub dhcp: Ipv4Addr,
    /// Default gateway
    pub gateway: Ipv4Addr,
}

impl NetAddresses {
    /// All-zero addresses.
    pub const UNSPECIFIED: Self = Self {
        ip: Ipv4Addr::UNSPECIFIED,
        dns: Ipv4Addr::UNSPECIFIED,
        dhcp: Ipv4Addr::UNSPECIFIED,
        gateway: Ipv4Addr::UNSPECIFIED,
    };
}

impl Default for NetAddresses {
    fn default() -> Self {
        Self::UNSPECIFIED
    }
}

/// Radio chip primitives used by the link state machine.
pub trait RadioChip {
    /// Power up and initialize the chip.
    fn initialize(&mut self);

    /// Power the chip down.
    fn shutdown(&mut self);

    /// Start the local DHCP machinery after initialization.
    fn start_dhcp(&mut self);

    /// Ask the chip to join a network. The outcome arrives as radio events.
    fn join(&mut self, security: Security, ssid: &str, password: &str);

    /// Ask the chip to leave the current network.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::RadioBusy`](crate::error::LinkError::RadioBusy)
    /// when the chip refuses the request.
    fn leave(&mut self) -> crate::error::LinkResult<()>;

    /// Start smart-config provisioning.
    fn start_smart_config(&mut self);

    /// Whether the chip holds a DHCP lease.
    fn is_online(&self) -> bool;

    /// Addresses of the current lease.
    fn addresses(&self) -> NetAddresses;

    /// Name of the associated network.
    fn ssid(&self) -> Ssid;

    /// Enable the falling-edge interrupt on the chip's IRQ line.
    fn enable_irq(&mut self);

    /// Run the chip's interrupt logic, appending any callbacks it raises.
    fn service_irq(&mut self, events: &mut RadioEvents);
}

/// GPIO interrupt attached to the radio's IRQ line. Called from interrupt
/// context.
pub trait IrqLine {
    /// Falling-edge interrupt pending.
    fn edge_pending(&self) -> bool;

    /// Acknowledge the falling-edge interrupt.
    fn clear_edge(&self);
}
