use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ShareName {
    Command,
    None,
}

impl ShareName {
    pub fn parse(text: &str) -> Option<ShareName> {
        return ShareName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file: Option<SharedFile>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
}

#[async_trait]
pub trait ShareTarget {
    fn name(&self) -> ShareName;

    /// Whether this target can share at all. When it can't, callers fall
    /// back to copying to the clipboard.
    fn is_supported(&self) -> bool;

    async fn share(&self, payload: &SharePayload) -> Result<()>;
}

pub type ShareBox = Box<dyn ShareTarget + Send + Sync>;

pub trait Clipboard {
    fn set_text(&self, text: &str) -> Result<()>;
}

pub type ClipboardBox = Box<dyn Clipboard + Send + Sync>;
