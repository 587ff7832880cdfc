//! Placement of new stages on the canvas.
//!
//! Positions carry no meaning for execution; this only keeps freshly added
//! stages from piling up on one spot.

use rand::Rng;

use crate::models::Position;

const CASCADE_ORIGIN_X: f64 = 100.0;
const CASCADE_STEP_X: f64 = 250.0;
const CASCADE_Y: f64 = 100.0;

const SCATTER_X: std::ops::Range<f64> = 100.0..500.0;
const SCATTER_Y: std::ops::Range<f64> = 100.0..400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Left-to-right row: `x = 100 + index * 250`, `y = 100`.
    #[default]
    Cascade,
    /// Uniformly random inside a bounded viewport.
    Scatter,
}

impl Placement {
    /// Position for the stage that will sit at `index` in the stage list.
    pub fn position_for(&self, index: usize) -> Position {
        match self {
            Self::Cascade => Position::new(CASCADE_ORIGIN_X + index as f64 * CASCADE_STEP_X, CASCADE_Y),
            Self::Scatter => {
                let mut rng = rand::rng();
                Position::new(rng.random_range(SCATTER_X), rng.random_range(SCATTER_Y))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_steps_right() {
        assert_eq!(Placement::Cascade.position_for(0), Position::new(100.0, 100.0));
        assert_eq!(Placement::Cascade.position_for(2), Position::new(600.0, 100.0));
    }

    #[test]
    fn scatter_stays_in_viewport() {
        for i in 0..64 {
            let p = Placement::Scatter.position_for(i);
            assert!(SCATTER_X.contains(&p.x));
            assert!(SCATTER_Y.contains(&p.y));
        }
    }
}
