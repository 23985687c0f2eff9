use micromath::F32Ext;

/// Musical pitch as number of semitones above C0
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub struct Pitch(pub u8);

/// Frequency ratios of semitones within an octave, relative to C
const SEMITONE_RATIOS: [f32; 12] = [
    1.000000,
    1.059463,
    1.122462,
    1.189207,
    1.259921,
    1.334840,
    1.414214,
    1.498307,
    1.587401,
    1.681793,
    1.781797,
    1.887749,
];

/// Frequency of C0 when A4 is tuned to 440 Hz
const C0_FREQ: f32 = 16.351598;

impl Pitch {
    pub const fn new(octave: u8, semitone: u8) -> Self {
        Self(octave * 12 + semitone)
    }

    pub const fn octave(self) -> u8 {
        self.0 / 12
    }

    pub const fn semitone(self) -> u8 {
        self.0 % 12
    }

    /// Pitch shifted by given number of semitones
    pub const fn up(self, semitones: u8) -> Self {
        Self(self.0.saturating_add(semitones))
    }

    /// Frequency in equal temperament: `440 * 2^((n - 57) / 12)`
    pub fn frequency(self) -> f32 {
        let octave = (1u32 << self.octave().min(31)) as f32;
        C0_FREQ * octave * SEMITONE_RATIOS[self.semitone() as usize]
    }

    /// Frequency rounded to integer Hz
    pub fn frequency_hz(self) -> u32 {
        self.frequency().round() as u32
    }
}

macro_rules! notes {
    ($( $name:ident = $octave:literal, $semitone:literal; )*) => {
        $( pub const $name: Pitch = Pitch::new($octave, $semitone); )*
    };
}

notes! {
    C0 = 0, 0;
    C4 = 4, 0;
    A4 = 4, 9;
    A5 = 5, 9;
    B5 = 5, 11;
    CS6 = 6, 1;
    D6 = 6, 2;
    DS6 = 6, 3;
    E6 = 6, 4;
    FS6 = 6, 6;
    GS6 = 6, 8;
    A6 = 6, 9;
    B6 = 6, 11;
    E7 = 7, 4;
    GS7 = 7, 8;
}
