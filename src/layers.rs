//! Layout and functions of keys on the keyboard

use keyberon::{
    action::{self, k, m, Action::*},
    key_code::KeyCode::*,
    layout,
};

use crate::keyboard::actions::{CustomAction, TapDanceId};

/// Number of key columns
pub const NCOLS: usize = 12;
/// Number of key rows
pub const NROWS: usize = 4;
/// Number of layers
pub const N_LAYERS: usize = 6;

pub type Layers = layout::Layers<NCOLS, NROWS, N_LAYERS, CustomAction>;
pub type Action = action::Action<CustomAction>;

/// Names of the layers, value is the index in [`LAYERS`]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Layer {
    Colemak = 0,
    /// Colemak for a host that itself uses a Colemak layout
    SwColemak = 1,
    Lower = 2,
    Raise = 3,
    /// Active when both Lower and Raise are on
    Adjust = 4,
    Fn = 5,
}

impl Layer {
    pub const ALL: [Layer; N_LAYERS] = [
        Layer::Colemak,
        Layer::SwColemak,
        Layer::Lower,
        Layer::Raise,
        Layer::Adjust,
        Layer::Fn,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit of this layer in a layer state bitmask
    pub const fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

impl From<Layer> for usize {
    fn from(layer: Layer) -> Self {
        layer.index()
    }
}

const fn custom(action: CustomAction) -> Action {
    Custom(action)
}

const fn td(id: TapDanceId) -> Action {
    custom(CustomAction::TapDance(id))
}

const COLEMAK: Action = custom(CustomAction::DefaultLayer(Layer::Colemak));
const SWCOLE: Action = custom(CustomAction::DefaultLayer(Layer::SwColemak));
const BKLT: Action = custom(CustomAction::Backlight);
const SFT_ENT: Action = custom(CustomAction::ShiftEnter);
const MI_ON: Action = custom(CustomAction::Music(true));
const MI_OFF: Action = custom(CustomAction::Music(false));
const RESET: Action = custom(CustomAction::Reset);

const LLCK: Action = td(TapDanceId::Llck);
const RLCK: Action = td(TapDanceId::Rlck);
const FLCK: Action = td(TapDanceId::Flck);
const CLCK: Action = td(TapDanceId::Clck);

const UNDS: Action = m(&[LShift, Minus]);
const PLUS: Action = m(&[LShift, Equal]);
const LCBR: Action = m(&[LShift, LBracket]);
const RCBR: Action = m(&[LShift, RBracket]);
const PIPE: Action = m(&[LShift, Bslash]);
const TILD: Action = m(&[LShift, Grave]);
const EXLM: Action = m(&[LShift, Kb1]);
const AT: Action = m(&[LShift, Kb2]);
const HASH: Action = m(&[LShift, Kb3]);
const DLR: Action = m(&[LShift, Kb4]);
const PERC: Action = m(&[LShift, Kb5]);
const CIRC: Action = m(&[LShift, Kb6]);
const AMPR: Action = m(&[LShift, Kb7]);
const ASTR: Action = m(&[LShift, Kb8]);
const LPRN: Action = m(&[LShift, Kb9]);
const RPRN: Action = m(&[LShift, Kb0]);

// Keycodes that produce Colemak letters when the host maps a QWERTY keyboard to Colemak
const CM_Q: Action = k(Q);
const CM_W: Action = k(W);
const CM_F: Action = k(E);
const CM_P: Action = k(R);
const CM_G: Action = k(T);
const CM_J: Action = k(Y);
const CM_L: Action = k(U);
const CM_U: Action = k(I);
const CM_Y: Action = k(O);
const CM_SCLN: Action = k(P);
const CM_A: Action = k(A);
const CM_R: Action = k(S);
const CM_S: Action = k(D);
const CM_T: Action = k(F);
const CM_D: Action = k(G);
const CM_H: Action = k(H);
const CM_N: Action = k(J);
const CM_E: Action = k(K);
const CM_I: Action = k(L);
const CM_O: Action = k(SColon);
const CM_Z: Action = k(Z);
const CM_X: Action = k(X);
const CM_C: Action = k(C);
const CM_V: Action = k(V);
const CM_B: Action = k(B);
const CM_K: Action = k(N);
const CM_M: Action = k(M);
const CM_COMM: Action = k(Comma);
const CM_DOT: Action = k(Dot);
const CM_SLSH: Action = k(Slash);

#[rustfmt::skip]
pub static LAYERS: Layers = [
    /* Colemak
     * ,-----------------------------------------------------------------------------------.
     * | Esc  |   Q  |   W  |   F  |   P  |   G  |   J  |   L  |   U  |   Y  |   ;  | Del  |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * | Tab  |   A  |   R  |   S  |   T  |   D  |   H  |   N  |   E  |   I  |   O  |  "   |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |Sh/Cap|   Z  |   X  |   C  |   V  |   B  |   K  |   M  |   ,  |   .  |   /  |Sh/Ent|
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |  FN  | Ctrl | GUI  | Alt  |Lower |Space | Bksp |Raise | Left | Down |  Up  |Right |
     * `-----------------------------------------------------------------------------------'
     */
    [
        [k(Escape), k(Q),     k(W),    k(F),    k(P),  k(G),     k(J),      k(L),  k(U),     k(Y),    k(SColon), k(Delete)],
        [k(Tab),    k(A),     k(R),    k(S),    k(T),  k(D),     k(H),      k(N),  k(E),     k(I),    k(O),      k(Quote)],
        [CLCK,      k(Z),     k(X),    k(C),    k(V),  k(B),     k(K),      k(M),  k(Comma), k(Dot),  k(Slash),  SFT_ENT],
        [FLCK,      k(LCtrl), k(LGui), k(LAlt), LLCK,  k(Space), k(BSpace), RLCK,  k(Left),  k(Down), k(Up),     k(Right)],
    ],
    /* Software Colemak */
    [
        [Trans, CM_Q,  CM_W,  CM_F,  CM_P,  CM_G,  CM_J,  CM_L,  CM_U,    CM_Y,   CM_SCLN, Trans],
        [Trans, CM_A,  CM_R,  CM_S,  CM_T,  CM_D,  CM_H,  CM_N,  CM_E,    CM_I,   CM_O,    Trans],
        [Trans, CM_Z,  CM_X,  CM_C,  CM_V,  CM_B,  CM_K,  CM_M,  CM_COMM, CM_DOT, CM_SLSH, Trans],
        [Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans,   Trans,  Trans,   Trans],
    ],
    /* Lower
     * ,-----------------------------------------------------------------------------------.
     * |      |      |      |      |      |      |      |   -  |   =  |   [  |   ]  |  \   |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |   `  |   1  |   2  |   3  |   4  |   5  |   6  |   7  |   8  |   9  |   0  |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      |      |      |      |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      | Home | PgDn | PgUp | End  |
     * `-----------------------------------------------------------------------------------'
     */
    [
        [Trans,    Trans,  Trans,  Trans,  Trans,  Trans,  Trans,  k(Minus), k(Equal), k(LBracket), k(RBracket), k(Bslash)],
        [k(Grave), k(Kb1), k(Kb2), k(Kb3), k(Kb4), k(Kb5), k(Kb6), k(Kb7),   k(Kb8),   k(Kb9),      k(Kb0),      Trans],
        [Trans,    Trans,  Trans,  Trans,  Trans,  Trans,  Trans,  Trans,    Trans,    Trans,       Trans,       Trans],
        [Trans,    Trans,  Trans,  Trans,  Trans,  Trans,  Trans,  Trans,    k(Home),  k(PgDown),   k(PgUp),     k(End)],
    ],
    /* Raise
     * ,-----------------------------------------------------------------------------------.
     * |      |      |      |      |      |      |      |   _  |   +  |   {  |   }  |  |   |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |   ~  |   !  |   @  |   #  |   $  |   %  |   ^  |   &  |   *  |   (  |   )  |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      |      |      |      |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      |      |      |      |      |
     * `-----------------------------------------------------------------------------------'
     */
    [
        [Trans, Trans, Trans, Trans, Trans, Trans, Trans, UNDS,  PLUS,  LCBR,  RCBR,  PIPE],
        [TILD,  EXLM,  AT,    HASH,  DLR,   PERC,  CIRC,  AMPR,  ASTR,  LPRN,  RPRN,  Trans],
        [Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans],
        [Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans, Trans],
    ],
    /* Adjust (Lower + Raise)
     * ,-----------------------------------------------------------------------------------.
     * |      |  F1  |  F2  |  F3  |  F4  |      |MusOn |MusOff|Colemk|SwCole|      | Reset|
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |  F5  |  F6  |  F7  |  F8  |      |      |      |      |      |      |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |      |  F9  |  F10 |  F11 |  F12 |      |      |      |      |      |      |      |
     * |------+------+------+------+------+------+------+------+------+------+------+------|
     * |Backlt|      |      |      |      |      |      |      |      |      |      |      |
     * `-----------------------------------------------------------------------------------'
     */
    [
        [Trans, k(F1), k(F2),  k(F3),  k(F4),  Trans, MI_ON, MI_OFF, COLEMAK, SWCOLE, Trans, RESET],
        [Trans, k(F5), k(F6),  k(F7),  k(F8),  Trans, Trans, Trans,  Trans,   Trans,  Trans, Trans],
        [Trans, k(F9), k(F10), k(F11), k(F12), Trans, Trans, Trans,  Trans,   Trans,  Trans, Trans],
        [BKLT,  Trans, Trans,  Trans,  Trans,  Trans, Trans, Trans,  Trans,   Trans,  Trans, Trans],
    ],
    /* Function layer */
    [
        [Trans, k(F1), k(F2),  k(F3),  k(F4),  Trans, Trans, Trans, Trans, Trans, Trans, Trans],
        [Trans, k(F5), k(F6),  k(F7),  k(F8),  Trans, Trans, Trans, Trans, Trans, Trans, Trans],
        [Trans, k(F9), k(F10), k(F11), k(F12), Trans, Trans, Trans, Trans, Trans, Trans, Trans],
        [Trans, Trans, Trans,  Trans,  Trans,  Trans, Trans, Trans, Trans, Trans, Trans, Trans],
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use keyberon::key_code::KeyCode;

    fn keycode(layer: Layer, row: usize, col: usize) -> Option<KeyCode> {
        match &LAYERS[layer.index()][row][col] {
            KeyCode(kc) => Some(*kc),
            _ => None,
        }
    }

    #[test]
    fn all_layers_have_matrix_dimensions() {
        assert_eq!(LAYERS.len(), N_LAYERS);
        for layer in LAYERS.iter() {
            assert_eq!(layer.len(), NROWS);
            for row in layer.iter() {
                assert_eq!(row.len(), NCOLS);
            }
        }
    }

    #[test]
    fn layer_indices_match_table_order() {
        for (i, layer) in Layer::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
            assert_eq!(layer.mask(), 1 << i);
        }
    }

    #[test]
    fn colemak_home_row() {
        let expected = [Tab, A, R, S, T, D, H, N, E, I, O, Quote];
        for (col, kc) in expected.iter().enumerate() {
            assert_eq!(keycode(Layer::Colemak, 1, col), Some(*kc));
        }
    }

    #[test]
    fn software_colemak_sends_qwerty_positions() {
        assert_eq!(keycode(Layer::SwColemak, 0, 3), Some(E));  // F
        assert_eq!(keycode(Layer::SwColemak, 0, 10), Some(P));  // ;
        assert_eq!(keycode(Layer::SwColemak, 1, 10), Some(SColon));  // O
        assert_eq!(keycode(Layer::SwColemak, 2, 6), Some(N));  // K
        assert!(LAYERS[Layer::SwColemak.index()][3].iter().all(|a| matches!(a, Trans)));
    }

    #[test]
    fn tap_dance_keys_on_base_layer() {
        let base = &LAYERS[Layer::Colemak.index()];
        let td_at = |row: usize, col: usize| match &base[row][col] {
            Custom(CustomAction::TapDance(id)) => Some(*id),
            _ => None,
        };
        assert_eq!(td_at(2, 0), Some(TapDanceId::Clck));
        assert_eq!(td_at(3, 0), Some(TapDanceId::Flck));
        assert_eq!(td_at(3, 4), Some(TapDanceId::Llck));
        assert_eq!(td_at(3, 7), Some(TapDanceId::Rlck));
    }

    #[test]
    fn raise_symbols_are_shifted() {
        match &LAYERS[Layer::Raise.index()][1][1] {
            MultipleKeyCodes(kcs) => assert_eq!(kcs.iter().copied().collect::<std::vec::Vec<_>>(), [LShift, Kb1]),
            _ => panic!("Expected shifted 1"),
        }
    }
}
