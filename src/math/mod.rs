//! Numeric helpers: trailing-window means and rounding.

pub mod rolling;

pub use rolling::*;
