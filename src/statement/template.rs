//! Positional `{}` templates
//!
//! `{}` is a slot filled verbatim, `{{` and `}}` are literal braces.
//! Any other brace makes the template malformed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::request::StatementKind;

use super::errors::{TemplateError, TemplateResult};

const SELECT_TEMPLATE: &str = include_str!("../../queries/select_from_table.sql");
const INSERT_TEMPLATE: &str = include_str!("../../queries/insert_into_table.sql");
const UPDATE_TEMPLATE: &str = include_str!("../../queries/update_table.sql");
const DELETE_TEMPLATE: &str = include_str!("../../queries/delete_from_table.sql");

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot,
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: impl Into<String>, text: &str) -> TemplateResult<Self> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' => match chars.peek() {
                    Some((_, '{')) => {
                        chars.next();
                        literal.push('{');
                    }
                    Some((_, '}')) => {
                        chars.next();
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Slot);
                    }
                    _ => {
                        return Err(TemplateError::Malformed {
                            template: name,
                            position,
                            reason: "unmatched '{'",
                        })
                    }
                },
                '}' => match chars.peek() {
                    Some((_, '}')) => {
                        chars.next();
                        literal.push('}');
                    }
                    _ => {
                        return Err(TemplateError::Malformed {
                            template: name,
                            position,
                            reason: "unmatched '}'",
                        })
                    }
                },
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { name, segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_count(&self) -> usize {
        self.segments.iter().filter(|s| **s == Segment::Slot).count()
    }

    /// Substitute `args` positionally; the result is right-trimmed
    pub fn render(&self, args: &[&str]) -> TemplateResult<String> {
        let expected = self.slot_count();
        if args.len() != expected {
            return Err(TemplateError::SlotMismatch {
                template: self.name.clone(),
                expected,
                given: args.len(),
            });
        }

        let mut output = String::new();
        let mut args = args.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Slot => {
                    if let Some(arg) = args.next() {
                        output.push_str(arg);
                    }
                }
            }
        }

        output.truncate(output.trim_end().len());
        Ok(output)
    }
}

/// Where templates come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// Templates compiled into the binary
    #[default]
    Builtin,
    /// One file per kind, read on every formation
    Directory(PathBuf),
}

impl TemplateSource {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        TemplateSource::Directory(path.into())
    }

    /// File name of the template for `kind`
    pub fn file_name(kind: StatementKind) -> &'static str {
        match kind {
            StatementKind::Select => "select_from_table.sql",
            StatementKind::Insert => "insert_into_table.sql",
            StatementKind::Update => "update_table.sql",
            StatementKind::Delete => "delete_from_table.sql",
        }
    }

    fn builtin_text(kind: StatementKind) -> &'static str {
        match kind {
            StatementKind::Select => SELECT_TEMPLATE,
            StatementKind::Insert => INSERT_TEMPLATE,
            StatementKind::Update => UPDATE_TEMPLATE,
            StatementKind::Delete => DELETE_TEMPLATE,
        }
    }

    pub fn load(&self, kind: StatementKind) -> TemplateResult<Template> {
        let name = Self::file_name(kind);
        match self {
            TemplateSource::Builtin => Template::parse(name, Self::builtin_text(kind)),
            TemplateSource::Directory(dir) => {
                let text = read_template(&dir.join(name))?;
                Template::parse(name, &text)
            }
        }
    }
}

fn read_template(path: &Path) -> TemplateResult<String> {
    fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
