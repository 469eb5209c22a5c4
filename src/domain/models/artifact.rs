#[cfg(test)]
#[path = "artifact_test.rs"]
mod tests;

use super::MediaKind;
use super::ObjectUrl;

/// Separator between outputs for bulk copy, download and share.
pub const EXPORT_SEPARATOR: &str = "\n\n";

/// What a successful tool invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    /// One panel per generated output, in server order.
    Text(Vec<String>),
    /// A URL returned by the backend, displayed as is.
    Remote { url: String, media: MediaKind },
    /// Bytes held behind an object URL.
    Binary {
        object_url: ObjectUrl,
        media: MediaKind,
        filename: String,
    },
}

impl Artifact {
    /// Panels as they are displayed. Media artifacts have a single panel
    /// holding their source URL.
    pub fn entries(&self) -> Vec<String> {
        match self {
            Artifact::Text(entries) => return entries.to_vec(),
            Artifact::Remote { url, .. } => return vec![url.to_string()],
            Artifact::Binary { object_url, .. } => return vec![object_url.to_string()],
        }
    }

    /// Source bound to an `<img>`/`<audio>`/`<video>` style element.
    pub fn source(&self) -> Option<String> {
        match self {
            Artifact::Text(_) => return None,
            Artifact::Remote { url, .. } => return Some(url.to_string()),
            Artifact::Binary { object_url, .. } => return Some(object_url.to_string()),
        }
    }

    pub fn export_text(&self) -> String {
        return export_text(&self.entries());
    }
}

pub fn export_text(entries: &[String]) -> String {
    return entries.join(EXPORT_SEPARATOR);
}
