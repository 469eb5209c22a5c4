#[cfg(test)]
#[path = "renderer_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Artifact;
use crate::domain::models::Event;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Dim,
    Info,
    Error,
    Paywall,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub style: LineStyle,
    pub text: String,
}

impl Line {
    fn new(style: LineStyle, text: &str) -> Line {
        return Line {
            style,
            text: text.to_string(),
        };
    }

    pub fn paint(&self) -> String {
        match self.style {
            LineStyle::Dim => return Paint::new(&self.text).dimmed().to_string(),
            LineStyle::Info => return Paint::green(&self.text).to_string(),
            LineStyle::Error => return Paint::red(&self.text).to_string(),
            LineStyle::Paywall => return Paint::yellow(&self.text).bold().to_string(),
        }
    }
}

pub fn paywall_text(balance: i64, pricing_url: &str) -> String {
    let mut lines = vec![
        "Credit limit exceeded".to_string(),
        format!("You have {balance} credits remaining. Upgrade your plan to keep using this tool."),
    ];
    if !pricing_url.is_empty() {
        lines.push(pricing_url.to_string());
    }

    let width = lines.iter().map(|e| return e.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));
    let body = lines
        .iter()
        .map(|line| {
            let padding = " ".repeat(width - line.chars().count());
            return format!("| {line}{padding} |");
        })
        .collect::<Vec<String>>()
        .join("\n");

    return format!("{border}\n{body}\n{border}");
}

/// Numbered text panels, or the source URL for media.
pub fn format_artifact(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Text(entries) => {
            return entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| return format!("({}) {}", idx + 1, entry.trim()))
                .collect::<Vec<String>>()
                .join("\n\n");
        }
        Artifact::Remote { media, .. } => {
            return format!("{media}: {}", artifact.source().unwrap_or_default());
        }
        Artifact::Binary {
            object_url,
            media,
            filename,
        } => {
            let size = object_url.bytes().map(|e| return e.len()).unwrap_or(0);
            return format!("{media}: {filename} ({size} bytes)");
        }
    }
}

pub struct Renderer {}

impl Renderer {
    pub fn describe(event: &Event, pricing_url: &str) -> Option<Line> {
        match event {
            Event::Loading(true) => return Some(Line::new(LineStyle::Dim, "Working on it...")),
            Event::Notice(notice) => {
                let style = if notice.is_error() {
                    LineStyle::Error
                } else {
                    LineStyle::Info
                };
                return Some(Line::new(style, &notice.text));
            }
            Event::Paywall(balance) => {
                return Some(Line::new(
                    LineStyle::Paywall,
                    &paywall_text(*balance, pricing_url),
                ));
            }
            _ => return None,
        }
    }

    /// Writes events to stderr until every sender has been dropped.
    pub async fn start(mut rx: mpsc::UnboundedReceiver<Event>) -> Result<()> {
        let pricing_url = Config::get(ConfigKey::PricingURL);

        while let Some(event) = rx.recv().await {
            tracing::debug!(event = ?event, "event");
            if let Some(line) = Renderer::describe(&event, &pricing_url) {
                eprintln!("{}", line.paint());
            }
        }

        return Ok(());
    }
}
