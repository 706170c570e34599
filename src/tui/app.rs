use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::GeminiClient;
use crate::config::Config;
use crate::core::{data_uri, StudioError};
use crate::credentials::{CredentialSelector, DeferredKeySelector};
use crate::studio::{Studio, View};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigating the current studio view
    Studio,
    /// Editing the scene description
    EditPrompt,
    /// Typing the path of a source image
    EditImagePath,
    /// Settings screen
    Settings,
}

/// Row of the compose form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    Style,
    Prompt,
    SourceImage,
    Lighting,
    Complexity,
    AspectRatio,
    Quality,
}

impl ComposeField {
    pub fn all() -> &'static [ComposeField] {
        &[
            ComposeField::Style,
            ComposeField::Prompt,
            ComposeField::SourceImage,
            ComposeField::Lighting,
            ComposeField::Complexity,
            ComposeField::AspectRatio,
            ComposeField::Quality,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComposeField::Style => "Artistic Style",
            ComposeField::Prompt => "Prompt",
            ComposeField::SourceImage => "Source Image",
            ComposeField::Lighting => "Cinematic Lighting",
            ComposeField::Complexity => "Detail Complexity",
            ComposeField::AspectRatio => "Aspect Ratio",
            ComposeField::Quality => "Quality",
        }
    }
}

/// Settings field being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ApiKey,
    HighTierKey,
    OutputDirectory,
    AutoDownload,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::ApiKey,
            SettingsField::HighTierKey,
            SettingsField::OutputDirectory,
            SettingsField::AutoDownload,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::ApiKey => "API Key",
            SettingsField::HighTierKey => "High-tier Key (2K/4K)",
            SettingsField::OutputDirectory => "Output Directory",
            SettingsField::AutoDownload => "Auto Save",
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            SettingsField::ApiKey => "api.key",
            SettingsField::HighTierKey => "api.high_tier_key",
            SettingsField::OutputDirectory => "output.directory",
            SettingsField::AutoDownload => "output.auto_download",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, SettingsField::ApiKey | SettingsField::HighTierKey)
    }
}

/// Single-line text input with a char-based cursor
#[derive(Debug, Default)]
pub struct TextInput {
    pub text: String,
    /// Cursor position in chars
    pub cursor: usize,
}

impl TextInput {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.text.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let idx = self.byte_index();
            self.text.remove(idx);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

type GenerationResult = Result<String, StudioError>;

/// TUI application state
pub struct App {
    /// Current mode
    pub mode: AppMode,

    /// Configuration
    pub config: Config,

    /// Settings, views and history
    pub studio: Studio,

    /// Selected compose row
    pub compose_selected: usize,

    /// Selected history entry
    pub history_selected: usize,

    /// Text being edited (prompt or image path)
    pub input: TextInput,

    /// Status message
    pub status_message: Option<String>,

    /// Where the last download went
    pub last_saved: Option<PathBuf>,

    /// Whether to quit
    pub should_quit: bool,

    /// Whether config was changed
    pub config_changed: bool,

    /// Settings: selected field index
    pub settings_selected: usize,

    /// Settings: currently editing
    pub settings_editing: bool,

    /// Settings: edit buffer
    pub settings_edit_buffer: String,

    /// Frame counter for the loading animation
    pub tick: usize,

    pub selector: Arc<DeferredKeySelector>,
    client: Arc<GeminiClient>,
    results_tx: async_channel::Sender<GenerationResult>,
    results_rx: async_channel::Receiver<GenerationResult>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let selector = Arc::new(DeferredKeySelector::new(
            config.high_tier_key().map(str::to_string),
        ));
        let client = Arc::new(GeminiClient::from_config(
            &config,
            Some(selector.clone() as Arc<dyn CredentialSelector>),
        ));
        let (results_tx, results_rx) = async_channel::bounded(1);

        Self {
            mode: AppMode::Studio,
            studio: Studio::new(config.initial_settings()),
            config,
            compose_selected: 0,
            history_selected: 0,
            input: TextInput::default(),
            status_message: None,
            last_saved: None,
            should_quit: false,
            config_changed: false,
            settings_selected: 0,
            settings_editing: false,
            settings_edit_buffer: String::new(),
            tick: 0,
            selector,
            client,
            results_tx,
            results_rx,
        }
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = None;
        self.studio.set_error(msg);
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.studio.dismiss_error();
    }

    pub fn selected_compose_field(&self) -> ComposeField {
        ComposeField::all()[self.compose_selected.min(ComposeField::all().len() - 1)]
    }

    /// Move selection up in the active list
    pub fn select_previous(&mut self) {
        match self.studio.view() {
            View::Compose => self.compose_selected = self.compose_selected.saturating_sub(1),
            View::History => self.history_selected = self.history_selected.saturating_sub(1),
            View::Preview => {}
        }
    }

    /// Move selection down in the active list
    pub fn select_next(&mut self) {
        match self.studio.view() {
            View::Compose => {
                if self.compose_selected < ComposeField::all().len() - 1 {
                    self.compose_selected += 1;
                }
            }
            View::History => {
                if self.history_selected < self.studio.history().len().saturating_sub(1) {
                    self.history_selected += 1;
                }
            }
            View::Preview => {}
        }
    }

    /// Change the selected compose value; `forward` picks the direction
    pub fn adjust_selected(&mut self, forward: bool) {
        let settings = self.studio.settings().clone();
        match self.selected_compose_field() {
            ComposeField::Style => self.studio.set_style(if forward {
                settings.style.next()
            } else {
                settings.style.previous()
            }),
            ComposeField::Lighting => self.studio.set_lighting(step(settings.lighting, forward)),
            ComposeField::Complexity => {
                self.studio.set_complexity(step(settings.complexity, forward))
            }
            ComposeField::AspectRatio => self.studio.set_aspect_ratio(if forward {
                settings.aspect_ratio.next()
            } else {
                settings.aspect_ratio.previous()
            }),
            ComposeField::Quality => self.studio.set_quality(if forward {
                settings.quality.next()
            } else {
                settings.quality.previous()
            }),
            ComposeField::Prompt | ComposeField::SourceImage => {}
        }
    }

    /// Validate and hand the request to a background task
    pub fn start_generation(&mut self) {
        let snapshot = match self.studio.begin_generation() {
            Ok(snapshot) => snapshot,
            Err(StudioError::GenerationInProgress) => {
                self.set_status("A generation is already running");
                return;
            }
            Err(_) => return,
        };

        self.status_message = None;
        self.last_saved = None;

        let client = self.client.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = client.generate(&snapshot).await;
            if tx.send(result).await.is_err() {
                tracing::debug!("Studio closed before generation finished");
            }
        });
    }

    /// Pick up a finished generation, if any
    pub async fn poll_generation(&mut self) {
        let Ok(result) = self.results_rx.try_recv() else {
            return;
        };

        // A request raised for this generation only matters if it failed
        let key_requested = self.selector.take_request();

        let saved = self.studio.complete_generation(result).cloned();
        match saved {
            Some(image) => {
                self.history_selected = 0;
                if self.config.output.auto_download {
                    self.save_image(&image).await;
                } else {
                    self.set_status("Visualization complete");
                }
            }
            None if key_requested => self.open_key_selection(),
            None => {}
        }
    }

    /// Save the image shown in the preview
    pub async fn download_current(&mut self) {
        match self.studio.last_generated().cloned() {
            Some(image) => self.save_image(&image).await,
            None => self.set_status("Nothing to save yet"),
        }
    }

    async fn save_image(&mut self, image: &crate::core::GeneratedImage) {
        let dir = PathBuf::from(&self.config.output.directory);
        match image.save_to(&dir).await {
            Ok(path) => {
                self.set_status(format!("Saved {}", path.display()));
                self.last_saved = Some(path);
            }
            Err(e) => self.set_error(format!("Save failed: {}", e)),
        }
    }

    /// Load a source image from disk into the compose settings
    pub async fn load_source_image(&mut self, path: &str) {
        let path = expand_home(path.trim());
        match data_uri::load_file(&path).await {
            Ok(uri) => {
                self.studio.set_source_image(uri);
                self.set_status(format!("Loaded {}", path.display()));
            }
            Err(e) => self.set_error(format!("Could not load {}: {}", path.display(), e)),
        }
    }

    /// Jump to the high-tier key field with an empty edit buffer
    pub fn open_key_selection(&mut self) {
        self.mode = AppMode::Settings;
        self.settings_selected = SettingsField::all()
            .iter()
            .position(|f| *f == SettingsField::HighTierKey)
            .unwrap_or(0);
        self.settings_editing = true;
        self.settings_edit_buffer.clear();
        self.set_status("2K/4K output needs a key from a paid project. Enter it and press Enter.");
    }

    /// Get current settings value
    pub fn get_settings_value(&self, field: &SettingsField) -> String {
        match field {
            SettingsField::ApiKey | SettingsField::HighTierKey => self
                .config
                .get(field.config_key())
                .unwrap_or_else(|| "(not set)".to_string()),
            SettingsField::OutputDirectory => self.config.output.directory.clone(),
            SettingsField::AutoDownload => self.config.output.auto_download.to_string(),
        }
    }

    /// Set settings value
    pub fn set_settings_value(&mut self, field: &SettingsField, value: &str) -> Result<()> {
        self.config.set(field.config_key(), value)?;
        self.config_changed = true;

        if field.is_secret() {
            if *field == SettingsField::HighTierKey {
                self.selector.select(self.config.high_tier_key().map(str::to_string));
            }
            self.client = Arc::new(GeminiClient::from_config(
                &self.config,
                Some(self.selector.clone() as Arc<dyn CredentialSelector>),
            ));
        }
        Ok(())
    }

    /// Get options for a settings field (if applicable)
    pub fn get_settings_options(&self, field: &SettingsField) -> Option<Vec<&'static str>> {
        match field {
            SettingsField::AutoDownload => Some(vec!["true", "false"]),
            _ => None,
        }
    }

    /// Cycle to next option for a settings field
    pub fn cycle_settings_option(&mut self, field: &SettingsField) -> Result<()> {
        if let Some(options) = self.get_settings_options(field) {
            let current = self.get_settings_value(field);
            let current_idx = options.iter().position(|&o| o == current).unwrap_or(0);
            let next_idx = (current_idx + 1) % options.len();
            self.set_settings_value(field, options[next_idx])?;
        }
        Ok(())
    }
}

fn step(level: u8, up: bool) -> u8 {
    if up {
        level.saturating_add(1)
    } else {
        level.saturating_sub(1)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(rest))
            .unwrap_or_else(|| Path::new(path).to_path_buf()),
        None => PathBuf::from(path),
    }
}
