use crate::layers::Layer;

/// Additional key actions
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CustomAction {
    /// Persistently set the default layer
    DefaultLayer(Layer),
    /// Step backlight brightness (with right shift held)
    Backlight,
    /// Right shift when held, Enter when tapped
    ShiftEnter,
    /// Turn music mode on/off
    Music(bool),
    /// Play goodbye tone and reboot to bootloader
    Reset,
    /// Tap dance key
    TapDance(TapDanceId),
}

/// Identifiers of tap dance keys, value is the index in the tap dance table
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum TapDanceId {
    /// Lower layer lock
    Llck = 0,
    /// Raise layer lock
    Rlck = 1,
    /// Function layer lock
    Flck = 2,
    /// Shift, caps lock on double tap
    Clck = 3,
}

impl TapDanceId {
    pub const COUNT: usize = 4;

    pub const ALL: [TapDanceId; Self::COUNT] = [
        TapDanceId::Llck,
        TapDanceId::Rlck,
        TapDanceId::Flck,
        TapDanceId::Clck,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}
