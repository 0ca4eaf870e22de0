// JSON lines printer.
// Writes full records as one JSON object per line; also the cache file format.

use std::io::{self, Write};

use crate::record::RepoRecord;

use super::Printer;

pub struct JsonPrinter<W> {
    writer: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Printer for JsonPrinter<W> {
    fn print(&mut self, repo: &RepoRecord) -> io::Result<()> {
        let mut line = serde_json::to_vec(repo)?;
        line.push(b'\n');
        self.writer.write_all(&line)
    }
}
