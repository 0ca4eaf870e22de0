// Fan-out printer.
// Sends each record to every attached printer and reports the ones that failed.

use std::io;

use crate::record::RepoRecord;

use super::Printer;

/// A printer that failed for one record.
#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the printer in the fan-out, in insertion order.
    pub index: usize,
    pub error: io::Error,
}

/// Ordered set of independent printers.
///
/// A failure in one printer never stops the others; there is no rollback
/// of output already written by earlier printers.
#[derive(Default)]
pub struct MultiPrinter<'a> {
    printers: Vec<Box<dyn Printer + 'a>>,
}

impl<'a> MultiPrinter<'a> {
    pub fn new() -> Self {
        Self {
            printers: Vec::new(),
        }
    }

    /// Append a printer; it runs after all printers added before it.
    pub fn push(&mut self, printer: impl Printer + 'a) -> usize {
        self.printers.push(Box::new(printer));
        self.printers.len() - 1
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    /// Print `repo` to every printer, collecting the failures.
    pub fn dispatch(&mut self, repo: &RepoRecord) -> Vec<SinkFailure> {
        self.printers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, printer)| {
                printer
                    .print(repo)
                    .err()
                    .map(|error| SinkFailure { index, error })
            })
            .collect()
    }
}
