//! Shared utilities for fairprep crates.
//!
//! Cell rendering and numeric parsing live here so that the attribute
//! encoder, the label remap, and the numeric coercion pass all agree on
//! what the text of a cell is and when it counts as a number.

pub mod numeric;
pub mod values;

pub use numeric::{format_numeric, parse_numeric, strip_quotes};
pub use values::{any_to_f64, any_to_string, is_numeric_dtype};
