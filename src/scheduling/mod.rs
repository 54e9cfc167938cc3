//! Pure scheduling core
//!
//! Everything in this module is side-effect free: rule resolution, interval
//! arithmetic and slot quantization all operate on values read elsewhere and
//! take "now" as an explicit parameter so boundary conditions are testable.

pub mod policy;
pub mod time;
pub mod windows;

pub use time::Interval;
