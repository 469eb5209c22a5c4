use std::env;
use std::process::Stdio;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ShareName;
use crate::domain::models::SharePayload;
use crate::domain::models::ShareTarget;

/// Hands results to an external program. The title is passed as an argument,
/// followed by the path of the attached file if there is one. The text is
/// written to stdin.
pub struct CommandShare {
    command: String,
}

impl Default for CommandShare {
    fn default() -> CommandShare {
        return CommandShare {
            command: Config::get(ConfigKey::ShareCommand),
        };
    }
}

impl CommandShare {
    pub fn new(command: &str) -> CommandShare {
        return CommandShare {
            command: command.to_string(),
        };
    }
}

#[async_trait]
impl ShareTarget for CommandShare {
    fn name(&self) -> ShareName {
        return ShareName::Command;
    }

    fn is_supported(&self) -> bool {
        return !self.command.trim().is_empty();
    }

    #[allow(clippy::implicit_return)]
    async fn share(&self, payload: &SharePayload) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = match parts.next() {
            Some(program) => program,
            None => bail!("No share command is configured"),
        };

        let mut cmd = Command::new(program);
        cmd.args(parts).arg(&payload.title);

        if let Some(file) = &payload.file {
            let file_path = env::temp_dir().join(format!("toolgate-share-{}", file.name));
            fs::write(&file_path, &file.bytes).await?;
            cmd.arg(file_path);
        }

        let mut child = cmd.stdin(Stdio::piped()).spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            tracing::error!(status = ?status, command = %self.command, "share command failed");
            bail!(format!("Share command exited with {status}"));
        }

        return Ok(());
    }
}
