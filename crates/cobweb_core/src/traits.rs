use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in our dynamical systems.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A one-parameter family of 1D maps, x_{n+1} = f(r, x_n).
///
/// The map must be pure: no side effects, no internal state. Samplers rely
/// on being able to re-evaluate it at any (r, x) pair.
pub trait ParamMap<T: Scalar> {
    /// Evaluates the map at parameter `r` and state `x`.
    fn apply(&self, r: T, x: T) -> T;
}

impl<T: Scalar, F: Fn(T, T) -> T> ParamMap<T> for F {
    fn apply(&self, r: T, x: T) -> T {
        self(r, x)
    }
}

/// A plain scalar function y = f(x), used where no sweep parameter is in
/// play (cobweb staircases, branch curves over the parameter axis).
pub trait ScalarMap<T: Scalar> {
    fn eval(&self, x: T) -> T;
}

impl<T: Scalar, F: Fn(T) -> T> ScalarMap<T> for F {
    fn eval(&self, x: T) -> T {
        self(x)
    }
}
