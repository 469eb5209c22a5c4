#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;

use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use tokio::fs;
use tokio::sync::mpsc;

use crate::domain::models::Artifact;
use crate::domain::models::ClipboardBox;
use crate::domain::models::export_text;
use crate::domain::models::Event;
use crate::domain::models::MediaKind;
use crate::domain::models::Notice;
use crate::domain::models::ShareBox;
use crate::domain::models::ShareOutcome;
use crate::domain::models::SharePayload;
use crate::domain::models::SharedFile;
use crate::domain::models::ToolSpec;

async fn fetch_remote(url: &str) -> Result<Vec<u8>> {
    let res = reqwest::Client::new().get(url).send().await?;
    if !res.status().is_success() {
        tracing::error!(status = res.status().as_u16(), url = url, "failed to fetch result");
        bail!(format!("Failed to fetch {url}"));
    }

    return Ok(res.bytes().await?.to_vec());
}

fn remote_filename(url: &str, spec: &ToolSpec, media: MediaKind) -> String {
    let path = url.split(&['?', '#'][..]).next().unwrap_or_default();
    let resource = path.split_once("://").map(|(_, rest)| return rest).unwrap_or(path);

    if let Some((_, segment)) = resource.rsplit_once('/') {
        if segment.contains('.') {
            return segment.to_string();
        }
    }

    return format!("{}.{}", spec.name, media.extension());
}

/// Copy, download and share actions for a held result.
pub struct ResultPresenter {
    clipboard: ClipboardBox,
    share: ShareBox,
    download_dir: PathBuf,
    tx: mpsc::UnboundedSender<Event>,
}

impl ResultPresenter {
    pub fn new(
        clipboard: ClipboardBox,
        share: ShareBox,
        download_dir: PathBuf,
        tx: mpsc::UnboundedSender<Event>,
    ) -> ResultPresenter {
        return ResultPresenter {
            clipboard,
            share,
            download_dir,
            tx,
        };
    }

    /// Text other programs can use for a panel. Object URLs don't outlive
    /// the process, so binaries are saved and their path is used instead.
    async fn portable_text(&self, artifact: &Artifact, spec: &ToolSpec) -> Result<String> {
        if let Artifact::Binary { .. } = artifact {
            let path = self.download(artifact, spec).await?;
            return Ok(path.display().to_string());
        }

        return Ok(artifact.export_text());
    }

    /// Copies a single panel. `index` is zero based.
    pub async fn copy(&self, artifact: &Artifact, spec: &ToolSpec, index: usize) -> Result<()> {
        let entries = artifact.entries();
        let entry = match entries.get(index) {
            Some(entry) => entry,
            None => bail!(format!(
                "There is no output number {}. This result has {} output(s).",
                index + 1,
                entries.len()
            )),
        };

        let text = match artifact {
            Artifact::Binary { .. } => self.portable_text(artifact, spec).await?,
            _ => entry.to_string(),
        };

        self.clipboard.set_text(&text)?;
        self.tx.send(Event::Notice(Notice::info("Copied to clipboard.")))?;

        return Ok(());
    }

    /// Saves the result into the download directory. Binary results are
    /// written from the bytes already held, never regenerated.
    pub async fn download(&self, artifact: &Artifact, spec: &ToolSpec) -> Result<PathBuf> {
        let (filename, bytes) = match artifact {
            Artifact::Text(entries) => (
                spec.text_filename(),
                export_text(entries).into_bytes(),
            ),
            Artifact::Binary {
                object_url,
                filename,
                ..
            } => {
                let bytes = object_url
                    .bytes()
                    .ok_or_else(|| return anyhow!("The result is no longer available"))?;
                (filename.to_string(), bytes.to_vec())
            }
            Artifact::Remote { url, media } => {
                (remote_filename(url, spec, *media), fetch_remote(url).await?)
            }
        };

        if !self.download_dir.exists() {
            fs::create_dir_all(&self.download_dir).await?;
        }

        let file_path = self.download_dir.join(filename);
        fs::write(&file_path, bytes).await?;
        tracing::debug!(path = ?file_path, "result downloaded");

        self.tx.send(Event::Notice(Notice::info(&format!(
            "Saved to {}",
            file_path.display()
        ))))?;

        return Ok(file_path);
    }

    async fn materialize(&self, artifact: &Artifact, spec: &ToolSpec) -> Result<Option<SharedFile>> {
        match artifact {
            Artifact::Text(_) => return Ok(None),
            Artifact::Binary {
                object_url,
                filename,
                media,
            } => {
                let bytes = object_url
                    .bytes()
                    .ok_or_else(|| return anyhow!("The result is no longer available"))?;
                let mime = object_url
                    .mime()
                    .unwrap_or_else(|| return media.default_mime().to_string());

                return Ok(Some(SharedFile {
                    name: filename.to_string(),
                    mime,
                    bytes: bytes.to_vec(),
                }));
            }
            Artifact::Remote { url, media } => {
                return Ok(Some(SharedFile {
                    name: remote_filename(url, spec, *media),
                    mime: media.default_mime().to_string(),
                    bytes: fetch_remote(url).await?,
                }));
            }
        }
    }

    /// Shares through the configured target, or copies to the clipboard when
    /// sharing isn't supported.
    pub async fn share(&self, artifact: &Artifact, spec: &ToolSpec) -> Result<ShareOutcome> {
        if !self.share.is_supported() {
            let text = self.portable_text(artifact, spec).await?;
            self.clipboard.set_text(&text)?;
            self.tx.send(Event::Notice(Notice::info(
                "Sharing isn't available here, copied to clipboard instead.",
            )))?;
            return Ok(ShareOutcome::CopiedToClipboard);
        }

        let text = match artifact {
            Artifact::Binary { .. } => "".to_string(),
            _ => artifact.export_text(),
        };

        let payload = SharePayload {
            title: spec.title.to_string(),
            text,
            file: self.materialize(artifact, spec).await?,
        };

        self.share.share(&payload).await?;
        tracing::debug!(share_target = %self.share.name(), tool = %spec.name, "result shared");

        return Ok(ShareOutcome::Shared);
    }
}
