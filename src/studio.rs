use async_trait::async_trait;

use crate::core::{
    ArtisticStyle, AspectRatio, GeneratedImage, GenerationSettings, ImageQuality, StudioError,
};

/// Produces an image (as a data URI) from a settings snapshot
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, settings: &GenerationSettings) -> Result<String, StudioError>;
}

/// Studio view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Compose,
    Preview,
    History,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Compose => "Create",
            View::Preview => "Preview",
            View::History => "Archives",
        }
    }
}

/// Settings, navigation and history of one studio session
#[derive(Debug, Default)]
pub struct Studio {
    settings: GenerationSettings,
    view: View,
    generating: bool,
    /// Snapshot sent with the in-flight request
    pending: Option<GenerationSettings>,
    last_generated: Option<GeneratedImage>,
    error: Option<String>,
    /// Newest first
    history: Vec<GeneratedImage>,
}

impl Studio {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn last_generated(&self) -> Option<&GeneratedImage> {
        self.last_generated.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &[GeneratedImage] {
        &self.history
    }

    /// Whether the generate action should be offered
    pub fn can_submit(&self) -> bool {
        !self.generating && self.settings.has_input()
    }

    pub fn set_style(&mut self, style: ArtisticStyle) {
        self.settings.style = style;
    }

    pub fn set_lighting(&mut self, level: u8) {
        self.settings = self.settings.clone().with_lighting(level);
    }

    pub fn set_complexity(&mut self, level: u8) {
        self.settings = self.settings.clone().with_complexity(level);
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.settings.aspect_ratio = ratio;
    }

    pub fn set_quality(&mut self, quality: ImageQuality) {
        self.settings.quality = quality;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.settings.prompt = prompt.into();
    }

    pub fn set_source_image(&mut self, data_uri: impl Into<String>) {
        self.settings.source_image = Some(data_uri.into());
    }

    pub fn clear_source_image(&mut self) {
        self.settings.source_image = None;
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Surface an error that did not come from a generation (e.g. a failed upload)
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Show a past generation and restore its settings. Returns false for an unknown index.
    pub fn select_history(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index).cloned() else {
            return false;
        };
        self.settings = entry.settings.clone();
        self.last_generated = Some(entry);
        self.view = View::Preview;
        true
    }

    /// Validate and enter the in-flight state.
    ///
    /// Returns the settings snapshot to send. A validation failure is also
    /// stored as the user-visible error.
    pub fn begin_generation(&mut self) -> Result<GenerationSettings, StudioError> {
        if self.generating {
            return Err(StudioError::GenerationInProgress);
        }
        if !self.settings.has_input() {
            let err = StudioError::EmptyRequest;
            self.error = Some(err.user_message());
            return Err(err);
        }

        let snapshot = self.settings.clone();
        self.generating = true;
        self.error = None;
        self.view = View::Preview;
        self.pending = Some(snapshot.clone());

        tracing::debug!("Generation started: {} / {}", snapshot.style, snapshot.quality);
        Ok(snapshot)
    }

    /// Record the outcome of the in-flight generation
    pub fn complete_generation(&mut self, result: Result<String, StudioError>) -> Option<&GeneratedImage> {
        match result {
            Ok(url) => Some(self.record_success(url)),
            Err(err) => {
                self.record_failure(&err);
                None
            }
        }
    }

    /// Run one generation end to end
    pub async fn submit<G>(&mut self, generator: &G) -> Result<&GeneratedImage, StudioError>
    where
        G: ImageGenerator + ?Sized,
    {
        let snapshot = self.begin_generation()?;
        match generator.generate(&snapshot).await {
            Ok(url) => Ok(self.record_success(url)),
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn record_success(&mut self, url: String) -> &GeneratedImage {
        self.generating = false;
        let snapshot = self.pending.take().unwrap_or_else(|| self.settings.clone());

        let image = GeneratedImage::new(url, snapshot);
        tracing::info!("Generated image {}", image.id);
        self.history.insert(0, image.clone());
        self.last_generated.insert(image)
    }

    fn record_failure(&mut self, err: &StudioError) {
        self.generating = false;
        self.pending = None;

        tracing::warn!("Generation failed: {}", err);
        self.error = Some(err.user_message());
        self.view = View::Compose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    /// Generator stub that replays canned results
    struct StubGenerator {
        calls: AtomicUsize,
        results: Mutex<Vec<Result<String, StudioError>>>,
        seen: Mutex<Vec<GenerationSettings>>,
    }

    impl StubGenerator {
        fn new(results: Vec<Result<String, StudioError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                results: Mutex::new(results),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageGenerator for StubGenerator {
        async fn generate(&self, settings: &GenerationSettings) -> Result<String, StudioError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(settings.clone());
            self.results.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn empty_request_never_reaches_the_generator() {
        let generator = StubGenerator::new(vec![Ok(PNG_URI.into())]);
        let mut studio = Studio::default();
        studio.set_prompt("   ");

        let err = studio.submit(&generator).await.unwrap_err();

        assert!(matches!(err, StudioError::EmptyRequest));
        assert_eq!(generator.calls(), 0);
        assert_eq!(studio.error(), Some("Please enter a prompt or upload an image."));
        assert_eq!(studio.view(), View::Compose);
        assert!(!studio.is_generating());
    }

    #[tokio::test]
    async fn source_image_alone_is_enough() {
        let generator = StubGenerator::new(vec![Ok(PNG_URI.into())]);
        let mut studio = Studio::default();
        studio.set_source_image("data:image/png;base64,AAAA");

        studio.submit(&generator).await.unwrap();

        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn success_is_prepended_to_history() {
        let generator = StubGenerator::new(vec![
            Ok("data:image/png;base64,Zmlyc3Q=".into()),
            Ok("data:image/png;base64,c2Vjb25k".into()),
        ]);
        let mut studio = Studio::default();
        studio.set_error("stale");

        studio.set_prompt("first");
        studio.submit(&generator).await.unwrap();
        studio.set_prompt("second");
        studio.submit(&generator).await.unwrap();

        let prompts: Vec<&str> = studio.history().iter().map(|h| h.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "first"]);
        assert_eq!(studio.history()[0], *studio.last_generated().unwrap());
        assert_eq!(studio.view(), View::Preview);
        assert_eq!(studio.error(), None);
        assert!(!studio.is_generating());

        // Reads do not reorder
        let again: Vec<&str> = studio.history().iter().map(|h| h.prompt.as_str()).collect();
        assert_eq!(prompts, again);
    }

    #[tokio::test]
    async fn failure_returns_to_compose_and_keeps_last_result() {
        let generator = StubGenerator::new(vec![
            Ok(PNG_URI.into()),
            Err(StudioError::NoImageReturned),
        ]);
        let mut studio = Studio::default();
        studio.set_prompt("harbour");
        studio.submit(&generator).await.unwrap();
        let first = studio.last_generated().cloned();

        studio.set_prompt("harbour at night");
        let err = studio.submit(&generator).await.unwrap_err();

        assert!(err.to_string().contains("No image data returned"));
        assert_eq!(studio.last_generated().cloned(), first);
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.view(), View::Compose);
        assert!(studio.error().unwrap().contains("different prompt or style"));
        assert!(!studio.is_generating());
    }

    #[tokio::test]
    async fn empty_error_message_uses_fallback() {
        let generator = StubGenerator::new(vec![Err(StudioError::Api {
            status: 500,
            message: String::new(),
        })]);
        let mut studio = Studio::default();
        studio.set_prompt("x");

        studio.submit(&generator).await.unwrap_err();

        assert_eq!(studio.error(), Some("Something went wrong during generation."));
    }

    #[test]
    fn in_flight_generation_blocks_resubmission() {
        let mut studio = Studio::default();
        studio.set_prompt("x");

        studio.begin_generation().unwrap();
        assert!(studio.is_generating());
        assert!(!studio.can_submit());
        assert!(matches!(
            studio.begin_generation(),
            Err(StudioError::GenerationInProgress)
        ));
    }

    #[test]
    fn history_entry_keeps_the_submitted_snapshot() {
        let mut studio = Studio::default();
        studio.set_prompt("submitted");
        studio.set_style(ArtisticStyle::Cyberpunk);
        studio.begin_generation().unwrap();

        // Edits while the request is in flight do not leak into the entry
        studio.set_prompt("edited");
        studio.set_style(ArtisticStyle::Minimalist);
        studio.complete_generation(Ok(PNG_URI.into()));

        let entry = &studio.history()[0];
        assert_eq!(entry.prompt, "submitted");
        assert_eq!(entry.settings.style, ArtisticStyle::Cyberpunk);
    }

    #[tokio::test]
    async fn selecting_history_restores_settings_without_generating() {
        let generator = StubGenerator::new(vec![Ok(PNG_URI.into()), Ok(PNG_URI.into())]);
        let mut studio = Studio::default();
        studio.set_prompt("old");
        studio.set_quality(ImageQuality::FourK);
        studio.set_lighting(2);
        studio.submit(&generator).await.unwrap();

        studio.set_prompt("new");
        studio.set_quality(ImageQuality::Standard);
        studio.submit(&generator).await.unwrap();
        studio.set_view(View::History);

        assert!(studio.select_history(1));

        assert_eq!(generator.calls(), 2);
        assert_eq!(studio.settings(), &studio.history()[1].settings);
        assert_eq!(studio.settings().quality, ImageQuality::FourK);
        assert_eq!(studio.settings().lighting, 2);
        assert_eq!(studio.last_generated().unwrap().prompt, "old");
        assert_eq!(studio.view(), View::Preview);
        assert!(!studio.select_history(9));
    }

    #[tokio::test]
    async fn clearing_history_empties_the_list() {
        let generator = StubGenerator::new(vec![Ok(PNG_URI.into())]);
        let mut studio = Studio::default();
        studio.set_prompt("x");
        studio.submit(&generator).await.unwrap();

        studio.clear_history();

        assert!(studio.history().is_empty());
    }

    #[tokio::test]
    async fn generator_receives_current_settings() {
        let generator = StubGenerator::new(vec![Ok(PNG_URI.into())]);
        let mut studio = Studio::new(GenerationSettings::default().with_style(ArtisticStyle::Gta));
        studio.set_prompt("chase");
        studio.set_complexity(200);
        studio.set_aspect_ratio(AspectRatio::Square);

        studio.submit(&generator).await.unwrap();

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].style, ArtisticStyle::Gta);
        assert_eq!(seen[0].complexity, 10);
        assert_eq!(seen[0].aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn clearing_source_image() {
        let mut studio = Studio::default();
        studio.set_source_image("data:image/png;base64,AAAA");
        studio.clear_source_image();
        assert!(studio.settings().source_image.is_none());
        assert!(!studio.can_submit());
    }
}
