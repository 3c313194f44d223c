//! Wireless link state machine.

use super::config::LinkConfig;
use super::payload::{LinkEvent, StatusPayload, connected_status, disconnected_status};
use crate::error::{LinkError, LinkResult};
use crate::event::{DeferredEvent, EventQueue};
use crate::hal::{DigitalPins, RadioChip, RadioEvent, RadioEvents, Security};
use crate::host::{Host, Notification};

/// Link lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Radio idle or link down
    #[default]
    Disconnected,
    /// Radio powering up
    Initializing,
    /// Acquiring a network
    Negotiating,
    /// Associated; passed through on the way to `DhcpPending`
    LinkUp,
    /// Associated, waiting for a lease
    DhcpPending,
    /// Lease obtained
    Online,
    /// Acquisition failed with a radio error code; becomes `Disconnected`
    /// on the next tick
    Error(i32),
}

/// Connect/disconnect/DHCP lifecycle of the radio, with LED feedback.
///
/// Radio callbacks arrive through [`handle_radio_event`](Self::handle_radio_event)
/// (normally via [`service_radio`](Self::service_radio) from the `RadioIrq`
/// deferred event). Host notifications that must not run inside a radio
/// callback are queued as `WifiConnect`, `WifiDisconnect` and `WifiHang`
/// deferred events and delivered by [`deliver`](Self::deliver).
pub struct WifiLink<'a, R, P> {
    radio: R,
    pins: P,
    queue: &'a EventQueue,
    config: LinkConfig,
    state: LinkState,
    initialized: bool,
    connecting: bool,
    /// The next DHCP outcome answers a connect request
    post_connect: bool,
    /// Error code for the pending `wifi_connect_complete`
    callback_err: i32,
    /// Status JSON for the pending `wifi_connect_complete`
    pending_payload: Option<StatusPayload>,
    blink: bool,
    /// Code of the last acquisition failure
    last_error: Option<i32>,
    /// Negotiation ticks elapsed; `None` once the timeout has fired or the
    /// negotiation resolved
    boot_ticks: Option<u8>,
}

impl<'a, R, P> WifiLink<'a, R, P>
where
    R: RadioChip,
    P: DigitalPins,
{
    /// Create the state machine. Call [`init`](Self::init) before anything else.
    pub fn new(radio: R, pins: P, queue: &'a EventQueue, config: LinkConfig) -> Self {
        Self {
            radio,
            pins,
            queue,
            config,
            state: LinkState::Disconnected,
            initialized: false,
            connecting: false,
            post_connect: false,
            callback_err: 0,
            pending_payload: None,
            last_error: None,
            blink: config.fast_connect,
            boot_ticks: Some(0),
        }
    }

    /// Hold the radio enable line low, set up the LEDs and enable the
    /// radio's falling-edge interrupt.
    pub fn init(&mut self) {
        let pins = self.config.pins;
        self.pins.set_output(pins.radio_enable);
        self.pins.write(pins.radio_enable, false);
        self.pins.set_output(pins.connection_led);
        self.pins.set_output(pins.error_led);
        self.radio.enable_irq();
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Power up the radio and start DHCP. An initialized radio is power
    /// cycled first.
    pub fn enable(&mut self) {
        if self.initialized {
            self.disable();
        }
        self.power_up();
        self.radio.start_dhcp();
        self.state = LinkState::Initializing;
    }

    /// Power the radio down.
    pub fn disable(&mut self) {
        self.radio.shutdown();
        self.initialized = false;
        self.state = LinkState::Disconnected;
        info!("wifi: disabled");
    }

    /// Power up and let the radio rejoin its last network.
    pub fn fast_connect(&mut self) {
        debug!("wifi: connecting to last available network");
        self.power_up();
        self.state = LinkState::Negotiating;
    }

    /// Ask the radio to join `ssid`. The outcome arrives as radio events.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::EmptySsid`] for an empty SSID.
    pub fn connect(&mut self, security: Security, ssid: &str, password: &str) -> LinkResult<()> {
        if ssid.is_empty() {
            return Err(LinkError::EmptySsid);
        }
        debug!("wifi: joining (already initialized: {})", self.initialized);
        self.radio.join(security, ssid, password);
        self.connecting = true;
        self.state = LinkState::Negotiating;
        Ok(())
    }

    /// Ask the radio to leave the current network.
    ///
    /// Marks the link as negotiating first so no connect can race the answer.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::RadioBusy`] if the radio refuses.
    pub fn disconnect(&mut self) -> LinkResult<()> {
        self.connecting = true;
        self.radio.leave()
    }

    /// Start smart-config provisioning, leaving the current network first
    /// if online.
    pub fn smart_config(&mut self) {
        if self.radio.is_online()
            && let Err(e) = self.disconnect()
        {
            warn!("wifi: leave before smart config failed: {}", e.as_str());
        }
        self.radio.start_smart_config();
    }

    // =========================================================================
    // Radio Callbacks
    // =========================================================================

    /// Service the radio after an IRQ and handle every event it raised.
    pub fn service_radio<H: Host>(&mut self, host: &mut H) {
        let mut events = RadioEvents::new();
        self.radio.service_irq(&mut events);
        while let Some(event) = events.pop_front() {
            self.handle_radio_event(event, host);
        }
    }

    /// Apply one radio callback.
    pub fn handle_radio_event<H: Host>(&mut self, event: RadioEvent, host: &mut H) {
        trace!("wifi: radio event {:?}", event);
        match event {
            RadioEvent::Acquire => {
                host.link_event(&LinkEvent::Acquire.to_json());
                self.blink = true;
                self.set_leds(false, false);
                self.state = LinkState::Negotiating;
            }
            RadioEvent::Error(code) => {
                host.link_event(&LinkEvent::Error(code).to_json());
                self.blink = false;
                self.connecting = false;
                self.set_leds(false, true);
                self.state = LinkState::Error(code);
                self.last_error = Some(code);
                warn!("wifi: acquire failed with {}", code);
            }
            RadioEvent::Connected => {
                host.link_event(&LinkEvent::Connect.to_json());
                self.last_error = None;
                self.post_connect = true;
                self.blink = true;
                self.set_leds(false, false);
                self.state = LinkState::LinkUp;
                info!("wifi: link up, waiting for lease");
                self.state = LinkState::DhcpPending;
            }
            RadioEvent::Disconnected => {
                host.link_event(&LinkEvent::Disconnect.to_json());
                self.blink = false;
                self.connecting = false;
                self.set_leds(false, true);
                self.state = LinkState::Disconnected;
                info!("wifi: link down");
                self.queue.trigger(DeferredEvent::WifiDisconnect);
            }
            RadioEvent::DhcpFailed => {
                debug!("wifi: DHCP failed");
                self.set_leds(false, true);
                host.link_event(&LinkEvent::DhcpFailed.to_json());
                self.connecting = false;
                self.blink = false;
                self.boot_ticks = None;
                self.state = LinkState::Disconnected;

                let awaiting_connect = self.post_connect;
                self.check_status(host);
                if !awaiting_connect {
                    debug!("wifi: reporting disconnect");
                    self.queue.trigger(DeferredEvent::WifiDisconnect);
                }
            }
            RadioEvent::DhcpSuccess => {
                host.link_event(&LinkEvent::DhcpSuccess.to_json());
                self.connecting = false;
                self.state = LinkState::Online;
                self.check_status(host);
                self.blink = false;
                self.boot_ticks = None;
                self.set_leds(true, false);
                info!("wifi: online");
            }
            RadioEvent::TcpClose(socket) => host.socket_closed(socket),
            RadioEvent::Hang => {
                warn!("wifi: radio hang");
                self.queue.trigger(DeferredEvent::WifiHang);
            }
        }
    }

    /// Emit the current status and resolve a pending connect request.
    pub fn check_status<H: Host>(&mut self, host: &mut H) {
        if self.radio.is_online() {
            let payload = self.connection_status();
            host.link_event(&payload);
            if self.post_connect {
                self.resolve_connect(0, Some(payload));
            }
        } else {
            host.link_event(&disconnected_status());
            if self.post_connect {
                self.resolve_connect(1, None);
            }
        }
    }

    /// Deliver a queued link notification. Returns `false` for events that
    /// are not link events.
    pub fn deliver<H: Host>(&mut self, event: DeferredEvent, host: &mut H) -> bool {
        match event {
            DeferredEvent::WifiConnect => {
                let payload = self.pending_payload.take();
                host.notify(Notification::WifiConnectComplete {
                    error: self.callback_err,
                    payload: payload.as_deref().unwrap_or(""),
                });
            }
            DeferredEvent::WifiDisconnect => host.notify(Notification::WifiDisconnectComplete),
            DeferredEvent::WifiHang => host.notify(Notification::WifiHang),
            _ => return false,
        }
        true
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance the LED animation by one frame and run the negotiation timeout.
    ///
    /// A failed acquisition settles back to `Disconnected` here; the error
    /// LED stays lit until the next attempt.
    pub fn tick(&mut self, frame: usize) {
        if let LinkState::Error(code) = self.state {
            debug!("wifi: error {} settled, link down", code);
            self.state = LinkState::Disconnected;
        }
        if !self.blink {
            return;
        }
        self.pins.write(self.config.pins.connection_led, frame & 1 == 1);

        let Some(ticks) = self.boot_ticks else {
            return;
        };
        if ticks >= self.config.boot_ticks {
            return;
        }
        let ticks = ticks + 1;
        self.boot_ticks = Some(ticks);
        if ticks >= self.config.boot_ticks {
            warn!("wifi: negotiation timed out after {} ticks", ticks);
            self.pins.write(self.config.pins.connection_led, false);
            self.blink = false;
            self.boot_ticks = None;
            self.connecting = false;
            if matches!(self.state, LinkState::Initializing | LinkState::Negotiating) {
                self.state = LinkState::Disconnected;
            }
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Status JSON: addresses and SSID when connected, the minimal
    /// not-connected object otherwise.
    pub fn connection_status(&self) -> StatusPayload {
        if self.is_connected() {
            connected_status(&self.radio.addresses(), &self.radio.ssid())
        } else {
            disconnected_status()
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Radio error code of the last failed acquisition, cleared once a
    /// connection succeeds.
    #[inline]
    pub fn last_error(&self) -> Option<i32> {
        self.last_error
    }

    /// Radio powered up.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// A negotiation is in progress.
    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    /// Radio initialized and holding a lease.
    pub fn is_connected(&self) -> bool {
        self.initialized && self.radio.is_online()
    }

    /// The connection LED is animating.
    #[inline]
    pub fn is_blinking(&self) -> bool {
        self.blink
    }

    /// The next DHCP outcome answers a connect request.
    #[inline]
    pub fn awaiting_connect_result(&self) -> bool {
        self.post_connect
    }

    /// Radio chip.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Radio chip, mutably.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    fn power_up(&mut self) {
        self.radio.initialize();
        self.initialized = true;
        self.connecting = true;
        self.boot_ticks = Some(0);
        info!("wifi: radio initialized");
    }

    fn resolve_connect(&mut self, error: i32, payload: Option<StatusPayload>) {
        self.callback_err = error;
        self.pending_payload = payload;
        self.post_connect = false;
        self.queue.trigger(DeferredEvent::WifiConnect);
    }

    fn set_leds(&mut self, connection: bool, error: bool) {
        let pins = self.config.pins;
        self.pins.write(pins.error_led, error);
        self.pins.write(pins.connection_led, connection);
    }
}
