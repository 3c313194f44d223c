//! Digital output pins.

/// Board pins addressed by number.
///
/// Chip-select lines are chosen per transfer, so pins are addressed
/// dynamically rather than through typed `OutputPin` handles.
pub trait DigitalPins {
    /// Configure `pin` as a push-pull output.
    fn set_output(&mut self, pin: u8);

    /// Drive `pin` high (`true`) or low (`false`).
    fn write(&mut self, pin: u8, high: bool);
}

impl<T: DigitalPins + ?Sized> DigitalPins for &mut T {
    fn set_output(&mut self, pin: u8) {
        (**self).set_output(pin);
    }

    fn write(&mut self, pin: u8, high: bool) {
        (**self).write(pin, high);
    }
}
