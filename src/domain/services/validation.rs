#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;

use std::path::Path;

use anyhow::Result;
use tokio::fs;

use crate::domain::models::mime_matches;
use crate::domain::models::FieldKind;
use crate::domain::models::ToolRequest;
use crate::domain::models::ToolSpec;
use crate::domain::models::Transport;
use crate::domain::models::ValidationError;

const DEFAULT_TERMS: &[&str] = &[
    "porn",
    "nude",
    "naked",
    "nsfw",
    "sexual",
    "rape",
    "pedophil",
    "child abuse",
    "suicide",
    "self-harm",
    "kill yourself",
    "terrorist",
    "make a bomb",
    "mass shooting",
    "genocide",
    "hate speech",
    "racial slur",
];

/// Coarse content filter. A term matches anywhere in the text, ignoring
/// case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denylist {
    terms: Vec<String>,
}

impl Default for Denylist {
    fn default() -> Denylist {
        return Denylist::new(DEFAULT_TERMS.iter().map(|e| return e.to_string()).collect());
    }
}

impl Denylist {
    pub fn new(terms: Vec<String>) -> Denylist {
        let terms = terms
            .iter()
            .map(|e| return e.trim().to_lowercase())
            .filter(|e| return !e.is_empty())
            .collect();

        return Denylist { terms };
    }

    /// Built-in terms plus one term per line from `path`. Blank lines and
    /// `#` comments are skipped.
    pub async fn with_file(path: &Path) -> Result<Denylist> {
        let mut denylist = Denylist::default();
        let payload = fs::read_to_string(path).await?;
        denylist.extend(
            payload
                .lines()
                .filter(|e| return !e.trim_start().starts_with('#'))
                .map(|e| return e.to_string())
                .collect(),
        );

        return Ok(denylist);
    }

    pub fn extend(&mut self, terms: Vec<String>) {
        for term in Denylist::new(terms).terms {
            if !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
    }

    pub fn is_allowed(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        return !self.terms.iter().any(|term| return lowered.contains(term));
    }

    pub fn len(&self) -> usize {
        return self.terms.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.terms.is_empty();
    }
}

#[derive(Clone, Debug, Default)]
pub struct Validator {
    denylist: Denylist,
}

impl Validator {
    pub fn new(denylist: Denylist) -> Validator {
        return Validator { denylist };
    }

    /// False when `text` contains a denylisted term.
    pub fn validate_input(&self, text: &str) -> bool {
        return self.denylist.is_allowed(text);
    }

    pub fn validate(&self, spec: &ToolSpec, request: &ToolRequest) -> Result<(), ValidationError> {
        if let Some(name) = request.fields.keys().find(|e| return spec.field(e).is_none()) {
            return Err(ValidationError::UnknownField(name.to_string()));
        }

        for field in spec.fields {
            let value = request.field(field.name).unwrap_or_default().trim();

            if value.is_empty() {
                if field.required {
                    return Err(ValidationError::MissingField(field.label.to_string()));
                }
                continue;
            }

            match field.kind {
                FieldKind::Text => {}
                FieldKind::Number => {
                    if value.parse::<i64>().is_err() {
                        return Err(ValidationError::InvalidNumber(field.label.to_string()));
                    }
                }
                FieldKind::Choice(options) => {
                    if !options.contains(&value) {
                        return Err(ValidationError::InvalidChoice {
                            field: field.label.to_string(),
                            value: value.to_string(),
                            options: options.join(", "),
                        });
                    }
                }
            }

            if field.screened && !self.validate_input(value) {
                return Err(ValidationError::Prohibited(field.label.to_string()));
            }
        }

        if let Transport::Multipart { accept, .. } = spec.transport {
            let file = match &request.file {
                Some(file) => file,
                None => return Err(ValidationError::MissingFile),
            };

            if !accept.iter().any(|pattern| return mime_matches(pattern, &file.mime)) {
                return Err(ValidationError::UnsupportedFileType {
                    mime: file.mime.to_string(),
                    accepted: accept.join(", "),
                });
            }
        }

        return Ok(());
    }
}
