//! Link JSON payloads
//!
//! Field order and key names are fixed; host-side parsers match on them.

use core::fmt::Write;

use heapless::String;

use crate::hal::{NetAddresses, Ssid};
use crate::internal::constants::{EVENT_PAYLOAD_CAPACITY, STATUS_PAYLOAD_CAPACITY};

/// Status JSON object.
pub type StatusPayload = String<STATUS_PAYLOAD_CAPACITY>;

/// Short link event JSON object.
pub type EventPayload = String<EVENT_PAYLOAD_CAPACITY>;

/// Status object reported while not connected.
pub const DISCONNECTED_STATUS: &str = r#"{"event":"status","connected":0}"#;

/// Lifecycle events emitted on the link event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Radio started acquiring a network
    Acquire,
    /// Associated with an access point
    Connect,
    /// Association lost
    Disconnect,
    /// Lease obtained
    DhcpSuccess,
    /// Lease could not be obtained
    DhcpFailed,
    /// Acquisition failed with a radio error code
    Error(i32),
}

impl LinkEvent {
    /// Render as a JSON object.
    #[must_use]
    pub fn to_json(self) -> EventPayload {
        let mut out = EventPayload::new();
        // The longest object (an error with i32::MIN) is 54 bytes.
        let written = match self {
            LinkEvent::Acquire => out.push_str(r#"{"event":"acquire"}"#),
            LinkEvent::Connect => out.push_str(r#"{"event":"connect"}"#),
            LinkEvent::Disconnect => out.push_str(r#"{"event":"disconnect"}"#),
            LinkEvent::DhcpSuccess => out.push_str(r#"{"event":"dhcp-success"}"#),
            LinkEvent::DhcpFailed => out.push_str(r#"{"event":"dhcp-failed"}"#),
            LinkEvent::Error(code) => write!(
                out,
                r#"{{"event":"error","error":{code},"when":"acquire"}}"#
            )
            .map_err(|_| ()),
        };
        debug_assert!(written.is_ok(), "event payload overflow");
        out
    }
}

/// Status object for a connected link.
#[must_use]
pub fn connected_status(addresses: &NetAddresses, ssid: &Ssid) -> StatusPayload {
    let mut out = StatusPayload::new();
    // Capacity covers four dotted quads and a fully escaped 32-byte SSID.
    let written = write_connected(&mut out, addresses, ssid);
    debug_assert!(written.is_ok(), "status payload overflow");
    out
}

/// Status object for a link that is not connected.
#[must_use]
pub fn disconnected_status() -> StatusPayload {
    let mut out = StatusPayload::new();
    let written = out.push_str(DISCONNECTED_STATUS);
    debug_assert!(written.is_ok(), "status payload overflow");
    out
}

fn write_connected(
    out: &mut StatusPayload,
    addresses: &NetAddresses,
    ssid: &str,
) -> core::fmt::Result {
    write!(
        out,
        r#"{{"event":"status","connected":1,"ip":"{}","dns":"{}","dhcp":"{}","gateway":"{}","ssid":""#,
        addresses.ip, addresses.dns, addresses.dhcp, addresses.gateway
    )?;
    write_escaped(out, ssid)?;
    out.write_str(r#""}"#)
}

/// Write `s` as the body of a JSON string literal.
fn write_escaped<W: Write>(out: &mut W, s: &str) -> core::fmt::Result {
    for c in s.chars() {
        match c {
            '"' => out.write_str(r#"\""#)?,
            '\\' => out.write_str(r"\\")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}
