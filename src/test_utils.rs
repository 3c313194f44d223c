//! Testing utilities and mock implementations
//!
//! This module provides mock implementations of the hardware boundary and
//! the embedding host so the engine and link state machine can be tested on
//! the host without hardware access.
//!
//! Mocks are cheap to clone and clones share state: hand one clone to the
//! code under test and keep another to inject interrupts and inspect what
//! happened. Hardware calls from pins, delays and DMA go to one shared
//! [`Timeline`] so their relative order can be checked.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use core::net::Ipv4Addr;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::dma::LinkedListItem;
use crate::error::{LinkError, LinkResult};
use crate::hal::{
    ChannelConfig, Connection, DigitalPins, DmaChannel, DmaInterrupts, Gpdma, IrqLine,
    NetAddresses, RadioChip, RadioEvent, RadioEvents, Security, Ssid,
};
use crate::host::{Host, HostRef, Notification};

// =============================================================================
// Timeline
// =============================================================================

/// One recorded hardware call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Pin configured as output
    PinOutput(u8),
    /// Pin driven to a level
    PinWrite(u8, bool),
    /// Microsecond delay
    DelayUs(u32),
    /// Channel configured
    Configure(DmaChannel, ChannelConfig),
    /// Channel started with a chain whose head has these fields
    Begin {
        channel: DmaChannel,
        source: u32,
        destination: u32,
        size: usize,
        last: bool,
    },
    /// Channel halted
    Cancel(DmaChannel),
}

/// Ordered log of hardware calls shared between mocks.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    ops: Rc<RefCell<Vec<Op>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }

    /// `Begin` operations on `channel`, in order.
    pub fn begins(&self, channel: DmaChannel) -> Vec<Op> {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::Begin { channel: c, .. } if *c == channel))
            .copied()
            .collect()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }
}

// =============================================================================
// Mock GPDMA
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct ChannelFlags {
    terminal_count: bool,
    error: bool,
}

/// Mock GPDMA controller with injectable interrupt status.
#[derive(Debug, Clone, Default)]
pub struct MockGpdma {
    timeline: Timeline,
    flags: Rc<RefCell<[ChannelFlags; 2]>>,
}

impl MockGpdma {
    /// Address reported for every SSP0 data register.
    pub const SSP0_DATA: u32 = 0x4008_3008;
    /// Address reported for every SSP1 data register.
    pub const SSP1_DATA: u32 = 0x400C_5008;

    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
            flags: Rc::default(),
        }
    }

    /// Latch a terminal-count interrupt on `channel`.
    pub fn raise_terminal_count(&self, channel: DmaChannel) {
        self.flags.borrow_mut()[channel.number() as usize].terminal_count = true;
    }

    /// Latch an error interrupt on `channel`.
    pub fn raise_error(&self, channel: DmaChannel) {
        self.flags.borrow_mut()[channel.number() as usize].error = true;
    }
}

impl Gpdma for MockGpdma {
    fn configure(&mut self, channel: DmaChannel, config: &ChannelConfig) {
        self.timeline.push(Op::Configure(channel, *config));
    }

    fn begin(&mut self, channel: DmaChannel, head: &LinkedListItem) {
        self.timeline.push(Op::Begin {
            channel,
            source: head.source(),
            destination: head.destination(),
            size: head.transfer_size(),
            last: head.is_last(),
        });
    }

    fn cancel(&mut self, channel: DmaChannel) {
        self.timeline.push(Op::Cancel(channel));
    }

    fn connection_address(&self, connection: Connection) -> u32 {
        match connection {
            Connection::Ssp0Tx | Connection::Ssp0Rx => Self::SSP0_DATA,
            Connection::Ssp1Tx | Connection::Ssp1Rx => Self::SSP1_DATA,
        }
    }
}

impl DmaInterrupts for MockGpdma {
    fn terminal_count_pending(&self, channel: DmaChannel) -> bool {
        self.flags.borrow()[channel.number() as usize].terminal_count
    }

    fn clear_terminal_count(&self, channel: DmaChannel) {
        self.flags.borrow_mut()[channel.number() as usize].terminal_count = false;
    }

    fn error_pending(&self, channel: DmaChannel) -> bool {
        self.flags.borrow()[channel.number() as usize].error
    }

    fn clear_error(&self, channel: DmaChannel) {
        self.flags.borrow_mut()[channel.number() as usize].error = false;
    }
}

// =============================================================================
// Mock Pins and Delay
// =============================================================================

/// Mock pins recording into the timeline.
#[derive(Debug, Clone, Default)]
pub struct MockPins {
    timeline: Timeline,
}

impl MockPins {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
        }
    }

    /// Last level written to `pin`.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.timeline.ops().iter().rev().find_map(|op| match op {
            Op::PinWrite(p, high) if *p == pin => Some(*high),
            _ => None,
        })
    }
}

impl DigitalPins for MockPins {
    fn set_output(&mut self, pin: u8) {
        self.timeline.push(Op::PinOutput(pin));
    }

    fn write(&mut self, pin: u8, high: bool) {
        self.timeline.push(Op::PinWrite(pin, high));
    }
}

/// Mock delay for testing without actual timing
///
/// Records microsecond delays into the timeline without waiting.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    timeline: Timeline,
}

impl MockDelay {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
        }
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.push(Op::DelayUs(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.push(Op::DelayUs(us));
    }
}

// =============================================================================
// Mock Radio
// =============================================================================

/// Primitive invoked on the mock radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCall {
    Initialize,
    Shutdown,
    StartDhcp,
    Join {
        security: Security,
        ssid: String,
        password: String,
    },
    Leave,
    StartSmartConfig,
    EnableIrq,
}

#[derive(Debug)]
struct RadioState {
    online: bool,
    addresses: NetAddresses,
    ssid: String,
    calls: Vec<RadioCall>,
    queued: Vec<RadioEvent>,
    leave_result: LinkResult<()>,
    edge_pending: bool,
    services: usize,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            online: false,
            addresses: NetAddresses::UNSPECIFIED,
            ssid: String::new(),
            calls: Vec::new(),
            queued: Vec::new(),
            leave_result: Ok(()),
            edge_pending: false,
            services: 0,
        }
    }
}

/// Mock radio chip with scripted lease and interrupt events.
#[derive(Debug, Clone, Default)]
pub struct MockRadio {
    state: Rc<RefCell<RadioState>>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a lease with these addresses on `ssid`.
    pub fn go_online(&self, addresses: NetAddresses, ssid: &str) {
        let mut s = self.state.borrow_mut();
        s.online = true;
        s.addresses = addresses;
        s.ssid = ssid.to_string();
    }

    pub fn go_offline(&self) {
        self.state.borrow_mut().online = false;
    }

    /// Event returned by the next `service_irq`.
    pub fn queue_event(&self, event: RadioEvent) {
        self.state.borrow_mut().queued.push(event);
    }

    pub fn refuse_leave(&self) {
        self.state.borrow_mut().leave_result = Err(LinkError::RadioBusy);
    }

    /// Latch a falling edge on the IRQ line.
    pub fn raise_edge(&self) {
        self.state.borrow_mut().edge_pending = true;
    }

    pub fn calls(&self) -> Vec<RadioCall> {
        self.state.borrow().calls.clone()
    }

    pub fn services(&self) -> usize {
        self.state.borrow().services
    }

    fn record(&self, call: RadioCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Addresses used across link tests.
pub fn sample_addresses() -> NetAddresses {
    NetAddresses {
        ip: Ipv4Addr::new(192, 168, 1, 42),
        dns: Ipv4Addr::new(8, 8, 8, 8),
        dhcp: Ipv4Addr::new(192, 168, 1, 1),
        gateway: Ipv4Addr::new(192, 168, 1, 254),
    }
}

impl RadioChip for MockRadio {
    fn initialize(&mut self) {
        self.record(RadioCall::Initialize);
    }

    fn shutdown(&mut self) {
        self.record(RadioCall::Shutdown);
    }

    fn start_dhcp(&mut self) {
        self.record(RadioCall::StartDhcp);
    }

    fn join(&mut self, security: Security, ssid: &str, password: &str) {
        self.record(RadioCall::Join {
            security,
            ssid: ssid.to_string(),
            password: password.to_string(),
        });
    }

    fn leave(&mut self) -> LinkResult<()> {
        self.record(RadioCall::Leave);
        self.state.borrow().leave_result
    }

    fn start_smart_config(&mut self) {
        self.record(RadioCall::StartSmartConfig);
    }

    fn is_online(&self) -> bool {
        self.state.borrow().online
    }

    fn addresses(&self) -> NetAddresses {
        self.state.borrow().addresses
    }

    fn ssid(&self) -> Ssid {
        let mut ssid = Ssid::new();
        for c in self.state.borrow().ssid.chars() {
            if ssid.push(c).is_err() {
                break;
            }
        }
        ssid
    }

    fn enable_irq(&mut self) {
        self.record(RadioCall::EnableIrq);
    }

    fn service_irq(&mut self, events: &mut RadioEvents) {
        let mut s = self.state.borrow_mut();
        s.services += 1;
        for event in s.queued.drain(..) {
            if events.push_back(event).is_err() {
                break;
            }
        }
    }
}

impl IrqLine for MockRadio {
    fn edge_pending(&self) -> bool {
        self.state.borrow().edge_pending
    }

    fn clear_edge(&self) {
        self.state.borrow_mut().edge_pending = false;
    }
}

// =============================================================================
// Mock Host
// =============================================================================

/// Owned copy of a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub tag: &'static str,
    pub code: i64,
    pub payload: String,
}

#[derive(Debug, Default)]
struct HostState {
    notifications: Vec<Delivered>,
    link_events: Vec<String>,
    closed_sockets: Vec<u32>,
    released: Vec<HostRef>,
}

/// Mock embedding host recording everything it receives.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Rc<RefCell<HostState>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Delivered> {
        self.state.borrow().notifications.clone()
    }

    /// Notifications with `tag`.
    pub fn notifications_tagged(&self, tag: &str) -> Vec<Delivered> {
        self.notifications()
            .into_iter()
            .filter(|n| n.tag == tag)
            .collect()
    }

    pub fn link_events(&self) -> Vec<String> {
        self.state.borrow().link_events.clone()
    }

    pub fn closed_sockets(&self) -> Vec<u32> {
        self.state.borrow().closed_sockets.clone()
    }

    pub fn released(&self) -> Vec<HostRef> {
        self.state.borrow().released.clone()
    }

    pub fn clear(&self) {
        *self.state.borrow_mut() = HostState::default();
    }
}

impl Host for MockHost {
    fn notify(&mut self, notification: Notification<'_>) {
        let payload = match notification {
            Notification::WifiConnectComplete { payload, .. } => payload.to_string(),
            _ => String::new(),
        };
        self.state.borrow_mut().notifications.push(Delivered {
            tag: notification.tag(),
            code: notification.code(),
            payload,
        });
    }

    fn link_event(&mut self, json: &str) {
        self.state.borrow_mut().link_events.push(json.to_string());
    }

    fn socket_closed(&mut self, socket: u32) {
        self.state.borrow_mut().closed_sockets.push(socket);
    }

    fn release(&mut self, handle: HostRef) {
        self.state.borrow_mut().released.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_is_shared_between_mocks() {
        let timeline = Timeline::new();
        let mut pins = MockPins::new(&timeline);
        let mut dma = MockGpdma::new(&timeline);

        pins.write(3, true);
        dma.cancel(DmaChannel::Rx);

        assert_eq!(timeline.ops(), [Op::PinWrite(3, true), Op::Cancel(DmaChannel::Rx)]);
        assert_eq!(pins.level(3), Some(true));
        assert_eq!(pins.level(4), None);
    }

    #[test]
    fn mock_gpdma_interrupt_flags() {
        let dma = MockGpdma::new(&Timeline::new());
        dma.raise_terminal_count(DmaChannel::Tx);
        assert!(dma.terminal_count_pending(DmaChannel::Tx));
        assert!(!dma.terminal_count_pending(DmaChannel::Rx));
        dma.clear_terminal_count(DmaChannel::Tx);
        assert!(!dma.terminal_count_pending(DmaChannel::Tx));
    }

    #[test]
    fn mock_radio_drains_queued_events() {
        let mut radio = MockRadio::new();
        radio.queue_event(RadioEvent::Acquire);
        radio.queue_event(RadioEvent::Connected);

        let mut events = RadioEvents::new();
        radio.service_irq(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(radio.services(), 1);

        let mut events = RadioEvents::new();
        radio.service_irq(&mut events);
        assert!(events.is_empty());
    }
}
