//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::read_table;
pub use writer::write_table;
