use core::convert::Infallible;

/// Helper trait to resolve Infallible Results
pub trait InfallibleResult<T> {
    fn infallible(self) -> T;
}

impl<T> InfallibleResult<T> for Result<T, Infallible> {
    fn infallible(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => match e {},
        }
    }
}

/// One-shot timer counting keyboard ticks
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Countdown(Option<u16>);

impl Countdown {
    /// Arm the timer; it fires on the `ticks + 1`-th call to [`Self::tick`]
    pub fn start(&mut self, ticks: u16) {
        self.0 = Some(ticks);
    }

    /// Advance time, returns true exactly once when the timer fires
    pub fn tick(&mut self) -> bool {
        match self.0 {
            None => false,
            Some(0) => {
                self.0 = None;
                true
            },
            Some(n) => {
                self.0 = Some(n - 1);
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_fires_once() {
        let mut c = Countdown::default();
        assert!(!c.tick());
        c.start(2);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(!c.tick());
        assert_eq!(c, Countdown::default());
    }

    #[test]
    fn countdown_zero_fires_on_next_tick() {
        let mut c = Countdown::default();
        c.start(0);
        assert!(c.tick());
    }

    #[test]
    fn countdown_restart() {
        let mut c = Countdown::default();
        c.start(5);
        assert!(!c.tick());
        c.start(1);
        assert!(!c.tick());
        assert!(c.tick());
    }
}
