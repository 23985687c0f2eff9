use crate::layers::{Action, Layers, Layer, N_LAYERS};
use keyberon::action::Action::Trans;
use static_assertions::const_assert;

// Each layer takes one bit of the state
const_assert!(N_LAYERS <= u32::BITS as usize);

/// Active layers of the keyboard
///
/// Both momentary and default layers are stored as bitmasks. When resolving a key
/// the highest active layer wins, transparent keys fall through to lower layers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LayerState {
    layers: u32,
    default: u32,
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new(Layer::Colemak.mask())
    }
}

impl LayerState {
    pub const fn new(default: u32) -> Self {
        Self { layers: 0, default }
    }

    /// Momentary layers bitmask
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Default layers bitmask
    pub fn default_layers(&self) -> u32 {
        self.default
    }

    pub fn layer_on(&mut self, layer: impl Into<usize>) {
        self.layers |= 1 << layer.into();
    }

    pub fn layer_off(&mut self, layer: impl Into<usize>) {
        self.layers &= !(1 << layer.into());
    }

    /// Turn off all momentary layers except the given one
    pub fn layer_move(&mut self, layer: impl Into<usize>) {
        self.layers = 1 << layer.into();
    }

    pub fn is_on(&self, layer: impl Into<usize>) -> bool {
        self.layers & (1 << layer.into()) != 0
    }

    /// Enable `layer3` if both `layer1` and `layer2` are on, else disable it
    pub fn update_tri_layer(&mut self, layer1: Layer, layer2: Layer, layer3: Layer) {
        if self.is_on(layer1) && self.is_on(layer2) {
            self.layer_on(layer3);
        } else {
            self.layer_off(layer3);
        }
    }

    pub fn default_layer_set(&mut self, mask: u32) {
        self.default = mask;
    }

    /// Highest layer that is currently active
    pub fn highest(&self) -> usize {
        let mask = self.layers | self.default;
        match mask {
            0 => 0,
            m => 31 - m.leading_zeros() as usize,
        }
    }

    /// Find action for a key, starting from the highest active layer
    pub fn resolve(&self, layers: &'static Layers, (row, col): (u8, u8)) -> &'static Action {
        let (row, col) = (row as usize, col as usize);
        let mask = self.layers | self.default;
        (0..N_LAYERS).rev()
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| &layers[i][row][col])
            .find(|action| !matches!(action, Trans))
            .unwrap_or(&layers[0][row][col])
    }
}
