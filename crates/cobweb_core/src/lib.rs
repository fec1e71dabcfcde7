pub mod branch;
pub mod cobweb;
pub mod equation_engine;
pub mod flow;
pub mod orbit;
pub mod sweep;
pub mod trace;
/// The `cobweb_core` crate provides the sampling engine behind the Cobweb
/// front-end. It turns one-dimensional maps and flows into renderable
/// sample data and performs no drawing itself.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `ParamMap` /
///   `ScalarMap` (caller-supplied 1D maps).
/// - **Equation Engine**: A bytecode VM for evaluating user-typed map
///   formulas like `r*x*(1-x)`.
/// - **Samplers**: orbit (bifurcation) diagrams, convergence traces,
///   cobweb staircases, stability-tagged branch curves, and fixed-step
///   RK4 flow traces.
pub mod traits;
