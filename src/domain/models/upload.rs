#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use tokio::fs;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        _ => return None,
    };

    return Some(mime);
}

/// `pattern` is either an exact type or a `type/*` wildcard.
pub fn mime_matches(pattern: &str, mime: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return mime
            .split_once('/')
            .map(|(kind, _)| return kind.eq_ignore_ascii_case(prefix))
            .unwrap_or(false);
    }

    return pattern.eq_ignore_ascii_case(mime);
}

impl FileUpload {
    pub fn new(file_name: &str, mime: &str, bytes: Vec<u8>) -> FileUpload {
        return FileUpload {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        };
    }

    pub async fn from_path(path: &Path) -> Result<FileUpload> {
        let bytes = fs::read(path)
            .await
            .with_context(|| return format!("Failed to read {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|e| return e.to_string_lossy().to_string())
            .unwrap_or_else(|| return "upload".to_string());

        let mime = mime_for_path(path).unwrap_or("application/octet-stream");

        return Ok(FileUpload::new(&file_name, mime, bytes));
    }
}
