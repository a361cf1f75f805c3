//! Source of seeding order. Production shuffles with `rand`; tests can keep order.

use rand::seq::SliceRandom;
use rand::Rng;

/// Reorders a slice before it is paired into matches.
pub trait Shuffler {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// Uniform random order from any `rand` generator.
#[derive(Clone, Debug)]
pub struct RandomOrder<R>(pub R);

impl<R: Rng> Shuffler for RandomOrder<R> {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }
}

/// Leaves the slice untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}
