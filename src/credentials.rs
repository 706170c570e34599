//! Credential selection for high-tier models.
//!
//! The high-tier image model needs an upgraded key. The generation client is
//! handed an optional [`CredentialSelector`] and asks it for a key before a
//! high-tier request, and again when the API rejects the key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use indicatif::ProgressBar;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

#[async_trait]
pub trait CredentialSelector: Send + Sync {
    /// Whether a high-tier key has been picked
    async fn has_selected_credential(&self) -> bool;

    /// Run the selection flow
    async fn open_credential_selector(&self) -> Result<()>;

    /// Key picked through the selector, if any
    fn selected_credential(&self) -> Option<String>;
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Prompts for a key on the terminal. Used by one-shot commands.
pub struct TerminalKeySelector {
    key: RwLock<Option<String>>,
    /// Spinner to hide while prompting
    progress: Option<ProgressBar>,
}

impl TerminalKeySelector {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            key: RwLock::new(non_empty(initial)),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }
}

fn prompt_for_key() -> io::Result<String> {
    let mut stderr = io::stderr();
    writeln!(
        stderr,
        "{} 2K/4K output uses the high-tier model, which needs a key from a paid project.",
        "Key required:".yellow().bold()
    )?;
    write!(stderr, "Enter high-tier API key (leave empty to keep current): ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[async_trait]
impl CredentialSelector for TerminalKeySelector {
    async fn has_selected_credential(&self) -> bool {
        self.selected_credential().is_some()
    }

    async fn open_credential_selector(&self) -> Result<()> {
        let progress = self.progress.clone();
        let entered = tokio::task::spawn_blocking(move || match progress {
            Some(pb) => pb.suspend(prompt_for_key),
            None => prompt_for_key(),
        })
        .await
        .context("Key prompt task failed")?
        .context("Failed to read key from terminal")?;

        if let Some(key) = non_empty(Some(entered)) {
            if let Ok(mut slot) = self.key.write() {
                *slot = Some(key);
            }
            tracing::info!("High-tier key selected from terminal");
        }
        Ok(())
    }

    fn selected_credential(&self) -> Option<String> {
        self.key.read().ok().and_then(|k| k.clone())
    }
}

/// Records selection requests for the studio to act on.
///
/// The studio cannot block on a prompt inside the alternate screen, so
/// opening this selector only raises a flag. The studio then moves to its
/// settings screen and calls [`DeferredKeySelector::select`] with the key
/// the user enters.
pub struct DeferredKeySelector {
    key: RwLock<Option<String>>,
    requested: AtomicBool,
}

impl DeferredKeySelector {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            key: RwLock::new(non_empty(initial)),
            requested: AtomicBool::new(false),
        }
    }

    /// Store a key entered by the user; an empty key clears the selection
    pub fn select(&self, key: Option<String>) {
        if let Ok(mut slot) = self.key.write() {
            *slot = non_empty(key);
        }
        self.requested.store(false, Ordering::SeqCst);
    }

    /// Returns true once per selection request
    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSelector for DeferredKeySelector {
    async fn has_selected_credential(&self) -> bool {
        self.selected_credential().is_some()
    }

    async fn open_credential_selector(&self) -> Result<()> {
        tracing::info!("High-tier key selection requested");
        self.requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn selected_credential(&self) -> Option<String> {
        self.key.read().ok().and_then(|k| k.clone())
    }
}
