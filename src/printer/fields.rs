// Field-selecting printer.
// Renders the user's comma-separated field list as one space-joined line.

use std::io::{self, Write};

use crate::record::RepoRecord;

use super::Printer;

/// A record field that can be selected for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    FullName,
    Owner,
    Stars,
    Description,
    Url,
    DefaultBranch,
    PushedAt,
    CreatedAt,
    UpdatedAt,
}

impl Field {
    /// Parse one selection token, ignoring case and surrounding whitespace.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "name" => Some(Field::Name),
            "fullname" => Some(Field::FullName),
            "owner" => Some(Field::Owner),
            "stars" | "star_count" => Some(Field::Stars),
            "description" => Some(Field::Description),
            "url" => Some(Field::Url),
            "default_branch" => Some(Field::DefaultBranch),
            "pushed_at" => Some(Field::PushedAt),
            "created_at" => Some(Field::CreatedAt),
            "updated_at" => Some(Field::UpdatedAt),
            _ => None,
        }
    }

    /// Parse a comma-separated selection. Unknown tokens are dropped.
    pub fn parse_list(selection: &str) -> Vec<Self> {
        selection.split(',').filter_map(Self::from_token).collect()
    }

    /// Display string of this field for `repo`.
    pub fn value(self, repo: &RepoRecord) -> String {
        match self {
            Field::Name => repo.name.clone(),
            Field::FullName => repo.full_name.clone(),
            Field::Owner => repo.owner.clone(),
            Field::Stars => repo.stars.to_string(),
            Field::Description => repo.description.clone(),
            Field::Url => repo.url.clone(),
            Field::DefaultBranch => repo.default_branch.clone(),
            Field::PushedAt => repo
                .pushed_at
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            Field::CreatedAt => repo.created_at.to_string(),
            Field::UpdatedAt => repo.updated_at.to_string(),
        }
    }
}

/// Prints the selected fields of each record, or its full name when nothing is selected.
pub struct FieldPrinter<W> {
    writer: W,
    fields: Vec<Field>,
}

impl<W: Write> FieldPrinter<W> {
    pub fn new(writer: W, selection: &str) -> Self {
        Self {
            writer,
            fields: Field::parse_list(selection),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Compose the full output line, newline included.
    pub fn render(&self, repo: &RepoRecord) -> String {
        let mut line = if self.fields.is_empty() {
            repo.full_name.clone()
        } else {
            self.fields
                .iter()
                .map(|field| field.value(repo))
                .collect::<Vec<_>>()
                .join(" ")
        };
        line.push('\n');
        line
    }
}

impl<W: Write> Printer for FieldPrinter<W> {
    fn print(&mut self, repo: &RepoRecord) -> io::Result<()> {
        let line = self.render(repo);
        self.writer.write_all(line.as_bytes())
    }
}
