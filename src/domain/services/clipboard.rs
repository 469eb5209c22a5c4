#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::Lazy;

use crate::domain::models::Clipboard;

/// Writer threads that still own a clipboard selection.
static WRITERS: Lazy<Mutex<Vec<thread::JoinHandle<()>>>> = Lazy::new(|| return Mutex::new(vec![]));

#[cfg(target_os = "linux")]
fn write(clipboard: &mut arboard::Clipboard, text: String) -> Result<()> {
    use arboard::SetExtLinux;

    // X11 and Wayland drop the selection with its owner, so serve it until
    // another program replaces it.
    clipboard.set().wait().text(text)?;
    return Ok(());
}

#[cfg(not(target_os = "linux"))]
fn write(clipboard: &mut arboard::Clipboard, text: String) -> Result<()> {
    clipboard.set_text(text)?;
    return Ok(());
}

pub struct ClipboardService {}

impl ClipboardService {
    /// Opens the clipboard on a writer thread that owns it until the text
    /// has been handed over. Returns once the clipboard is open.
    pub fn set(text: &str) -> Result<()> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let text = text.to_string();

        let handle = thread::spawn(move || {
            let mut clipboard = match arboard::Clipboard::new() {
                Ok(clipboard) => clipboard,
                Err(err) => {
                    let _ = ready_tx.send(Err(err.to_string()));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            if let Err(err) = write(&mut clipboard, text) {
                tracing::error!(error = ?err, "failed to write clipboard");
            }
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(anyhow!(format!("Clipboard is unavailable: {err}"))),
            Err(_) => return Err(anyhow!("Clipboard is unavailable")),
        }

        ClipboardService::keep(handle);
        return Ok(());
    }

    pub fn keep(handle: thread::JoinHandle<()>) {
        if let Ok(mut writers) = WRITERS.lock() {
            writers.push(handle);
        }
    }

    /// Number of writers still serving the clipboard.
    pub fn pending() -> usize {
        return WRITERS
            .lock()
            .map(|writers| return writers.iter().filter(|e| return !e.is_finished()).count())
            .unwrap_or(0);
    }

    /// Blocks until every writer has let go of the clipboard. Call before the
    /// process exits.
    pub fn hold() {
        let writers = match WRITERS.lock() {
            Ok(mut writers) => writers.drain(..).collect::<Vec<_>>(),
            Err(_) => return,
        };

        for writer in writers {
            if writer.join().is_err() {
                tracing::error!("clipboard writer panicked");
            }
        }
    }
}

/// The system clipboard. Each write gets its own owner thread.
#[derive(Default)]
pub struct SystemClipboard {}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        return ClipboardService::set(text);
    }
}
