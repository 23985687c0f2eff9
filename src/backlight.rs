//! Backlight brightness with software PWM

/// Backlight brightness state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Backlight {
    level: u8,
    levels: u8,
}

impl Backlight {
    /// Create backlight with brightness `level` out of `levels`
    pub fn new(levels: u8, level: u8) -> Self {
        Self { levels, level: level.min(levels) }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Increase brightness, wrapping to off after the highest level
    pub fn step(&mut self) {
        self.level = if self.level >= self.levels { 0 } else { self.level + 1 };
        debug!("Backlight level {=u8}", self.level);
    }

    /// State of the backlight output at given tick
    pub fn output(&self, tick: u32) -> bool {
        self.level > 0 && tick % self.levels as u32 < self.level as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps() {
        let mut bl = Backlight::new(3, 0);
        let levels: std::vec::Vec<u8> = (0..5).map(|_| { bl.step(); bl.level() }).collect();
        assert_eq!(levels, [1, 2, 3, 0, 1]);
    }

    #[test]
    fn level_clamped() {
        assert_eq!(Backlight::new(3, 7).level(), 3);
        assert_eq!(Backlight::new(0, 2).level(), 0);
    }

    #[test]
    fn pwm_duty() {
        let duty = |bl: &Backlight| (0..300).filter(|t| bl.output(*t)).count();
        assert_eq!(duty(&Backlight::new(3, 0)), 0);
        assert_eq!(duty(&Backlight::new(3, 1)), 100);
        assert_eq!(duty(&Backlight::new(3, 2)), 200);
        assert_eq!(duty(&Backlight::new(3, 3)), 300);
    }

    #[test]
    fn no_levels() {
        let mut bl = Backlight::new(0, 0);
        bl.step();
        assert_eq!(bl.level(), 0);
        assert!(!bl.output(0));
    }
}
