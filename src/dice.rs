//! Uniform integer draws shared by every random decision in a session.
//!
//! Both ends of a range are inclusive: `range(1, 6)` can return 1 and 6.

pub trait Dice {
    /// Uniform draw in `min..=max`. A reversed range collapses to `min`.
    fn range(&mut self, min: i32, max: i32) -> i32;

    /// `true` with `percent` chance out of 100
    fn percent(&mut self, percent: i32) -> bool {
        self.range(1, 100) <= percent
    }
}

impl<T: ?Sized + rand::Rng> Dice for T {
    fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.gen_range(min..=max)
    }
}
