//! Elapsed time since a birth date: a calendar decomposition into years,
//! months and days, raw totals, and counters that ease up to them.

pub mod age;
pub mod animate;
pub mod config;
pub mod error;
pub mod form;
pub mod notify;
pub mod parallax;
pub mod render;
pub mod svg;

pub use age::{AgeResult, CalendarDate, decompose};
pub use error::{AgeError, InvalidInput};
