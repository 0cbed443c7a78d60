//! Growth index scoring.
//!
//! The scorer is a small, pure function so that the reader worker, the
//! front-ends and the tests can all call it without shared state.

pub mod score;

pub use score::*;
