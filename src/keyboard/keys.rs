use core::convert::Infallible;

use embedded_hal::digital::v2::{InputPin, OutputPin};
use keyberon::{matrix, debounce, layout};

use crate::layers::{NCOLS, NROWS};
use crate::utils::InfallibleResult;

/// Keyboard key matrix scanner
pub struct Keys<C, R> {
    matrix: matrix::Matrix<C, R, NCOLS, NROWS>,
    debouncer: debounce::Debouncer<matrix::PressedKeys<NCOLS, NROWS>>,
}

impl<C, R> Keys<C, R>
where
    C: InputPin<Error = Infallible>,
    R: OutputPin<Error = Infallible>,
{
    /// Initialize key matrix scanner with debouncing that requires `debounce_cnt` stable states
    pub fn new(cols: [C; NCOLS], rows: [R; NROWS], debounce_cnt: u16) -> Self {
        let initial = matrix::PressedKeys::default;
        Self {
            matrix: matrix::Matrix::new(cols, rows).infallible(),
            debouncer: debounce::Debouncer::new(initial(), initial(), debounce_cnt),
        }
    }

    /// Scan for key events; caller decides what to do with the events
    pub fn scan(&mut self) -> impl Iterator<Item = layout::Event> + '_ {
        let scan = self.matrix.get().infallible();
        self.debouncer.events(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::vec::Vec;

    type Pressed = Rc<Cell<[[bool; NCOLS]; NROWS]>>;

    struct Col {
        col: usize,
        row: Rc<Cell<Option<usize>>>,
        pressed: Pressed,
    }

    struct Row {
        row: usize,
        active: Rc<Cell<Option<usize>>>,
    }

    impl InputPin for Col {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            Ok(self.row.get().map_or(false, |row| self.pressed.get()[row][self.col]))
        }
    }

    impl OutputPin for Row {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.active.set(Some(self.row));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            if self.active.get() == Some(self.row) {
                self.active.set(None);
            }
            Ok(())
        }
    }

    fn keys(pressed: &Pressed) -> Keys<Col, Row> {
        let active = Rc::new(Cell::new(None));
        let cols = core::array::from_fn(|col| Col { col, row: active.clone(), pressed: pressed.clone() });
        let rows = core::array::from_fn(|row| Row { row, active: active.clone() });
        Keys::new(cols, rows, 5)
    }

    #[test]
    fn debounced_press_and_release() {
        let pressed: Pressed = Rc::new(Cell::new([[false; NCOLS]; NROWS]));
        let mut keys = keys(&pressed);

        let mut state = pressed.get();
        state[1][2] = true;
        pressed.set(state);
        let events: Vec<_> = (0..10).flat_map(|_| keys.scan().collect::<Vec<_>>()).collect();
        assert_eq!(events, [layout::Event::Press(1, 2)]);

        pressed.set([[false; NCOLS]; NROWS]);
        let events: Vec<_> = (0..10).flat_map(|_| keys.scan().collect::<Vec<_>>()).collect();
        assert_eq!(events, [layout::Event::Release(1, 2)]);
    }

    #[test]
    fn short_glitch_ignored() {
        let pressed: Pressed = Rc::new(Cell::new([[false; NCOLS]; NROWS]));
        let mut keys = keys(&pressed);

        let mut state = pressed.get();
        state[3][11] = true;
        pressed.set(state);
        assert_eq!(keys.scan().count(), 0);
        pressed.set([[false; NCOLS]; NROWS]);
        assert_eq!((0..10).map(|_| keys.scan().count()).sum::<usize>(), 0);
    }
}
