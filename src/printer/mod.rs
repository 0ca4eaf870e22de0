// Output printers.
// Each printer renders one repository record as one line to its own writer.

pub mod fields;
pub mod json;
pub mod multi;

use std::io;

use crate::record::RepoRecord;

pub use fields::{Field, FieldPrinter};
pub use json::JsonPrinter;
pub use multi::{MultiPrinter, SinkFailure};

/// A destination that renders repository records.
pub trait Printer {
    /// Render one record as exactly one line.
    fn print(&mut self, repo: &RepoRecord) -> io::Result<()>;
}
