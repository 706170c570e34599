use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::GeminiClient;
use crate::config::{Config, DisplayMode};
use crate::core::{data_uri, ArtisticStyle, AspectRatio, GeneratedImage, GenerationSettings, ImageQuality};
use crate::credentials::TerminalKeySelector;
use crate::studio::Studio;

#[derive(Args)]
pub struct GenerateArgs {
    /// Scene description (may be empty when --image is given)
    #[arg(default_value = "")]
    pub prompt: String,

    /// Artistic style, by name or slug (see `p2l styles`)
    #[arg(long)]
    pub style: Option<ArtisticStyle>,

    /// Cinematic lighting level (0-10)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub lighting: Option<u8>,

    /// Detail complexity level (0-10)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub complexity: Option<u8>,

    /// Aspect ratio (1:1, 16:9, 9:16, 4:3, 3:4)
    #[arg(short, long, alias = "ar")]
    pub aspect_ratio: Option<AspectRatio>,

    /// Quality (Standard, 2K, 4K)
    #[arg(short, long)]
    pub quality: Option<ImageQuality>,

    /// Source image to start from
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Output directory for downloaded images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't save the image
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Machine-readable result for `--format json`
#[derive(Serialize)]
struct GenerateOutput<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    settings: SettingsSummary<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Settings as reported in JSON output; the source image is only flagged
#[derive(Serialize)]
struct SettingsSummary<'a> {
    style: &'a ArtisticStyle,
    lighting: u8,
    complexity: u8,
    aspect_ratio: &'a AspectRatio,
    quality: &'a ImageQuality,
    prompt: &'a str,
    has_source_image: bool,
}

impl<'a> From<&'a GenerationSettings> for SettingsSummary<'a> {
    fn from(settings: &'a GenerationSettings) -> Self {
        Self {
            style: &settings.style,
            lighting: settings.lighting,
            complexity: settings.complexity,
            aspect_ratio: &settings.aspect_ratio,
            quality: &settings.quality,
            prompt: &settings.prompt,
            has_source_image: settings.source_image.is_some(),
        }
    }
}

impl GenerateArgs {
    /// Apply command-line overrides on top of the configured defaults
    fn settings(&self, config: &Config) -> GenerationSettings {
        let mut settings = config.initial_settings();
        settings.prompt = self.prompt.clone();
        if let Some(style) = self.style {
            settings = settings.with_style(style);
        }
        if let Some(level) = self.lighting {
            settings = settings.with_lighting(level);
        }
        if let Some(level) = self.complexity {
            settings = settings.with_complexity(level);
        }
        if let Some(ratio) = self.aspect_ratio {
            settings = settings.with_aspect_ratio(ratio);
        }
        if let Some(quality) = self.quality {
            settings = settings.with_quality(quality);
        }
        settings
    }
}

pub async fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    let mut settings = args.settings(config);
    if let Some(path) = &args.image {
        let uri = data_uri::load_file(path)
            .await
            .with_context(|| format!("Failed to load source image {}", path.display()))?;
        settings = settings.with_source_image(uri);
    }

    let mut studio = Studio::new(settings);

    // Show progress
    let pb = if args.format == "text" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "Rendering {} ({})...",
            studio.settings().style,
            studio.settings().quality
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut selector = TerminalKeySelector::new(config.high_tier_key().map(str::to_string));
    if let Some(pb) = &pb {
        selector = selector.with_progress(pb.clone());
    }
    let client = GeminiClient::from_config(config, Some(Arc::new(selector)));
    let model = client.model_for(studio.settings().tier()).to_string();

    let image = match studio.submit(&client).await {
        Ok(image) => image.clone(),
        Err(e) => {
            if let Some(pb) = &pb {
                pb.finish_with_message(format!("{} Generation failed", "✗".red()));
            }

            match args.format.as_str() {
                "json" => {
                    let output = GenerateOutput {
                        status: "failed",
                        id: None,
                        model: Some(&model),
                        settings: studio.settings().into(),
                        timestamp: None,
                        mime_type: None,
                        path: None,
                        error: Some(e.user_message()),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                "quiet" => {}
                _ => eprintln!("{}: {}", "Error".red().bold(), e.user_message()),
            }
            return Err(e.into());
        }
    };

    // Download image
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let path = if !args.no_download && config.output.auto_download {
        Some(image.save_to(&output_dir).await?)
    } else {
        None
    };

    if let Some(pb) = &pb {
        let suffix = if path.is_some() { "" } else { " (not saved)" };
        pb.finish_with_message(format!("{} Generated image{}", "✓".green(), suffix));
    }

    match args.format.as_str() {
        "json" => {
            let output = GenerateOutput {
                status: "completed",
                id: Some(&image.id),
                model: Some(&model),
                settings: (&image.settings).into(),
                timestamp: Some(image.timestamp),
                mime_type: Some(image.mime_type()),
                path: path.as_ref().map(|p| p.to_string_lossy().to_string()),
                error: None,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "quiet" => {
            if let Some(path) = &path {
                println!("{}", path.display());
            }
        }
        _ => print_summary(&image, &model, path.as_deref(), config),
    }

    Ok(())
}

fn print_summary(image: &GeneratedImage, model: &str, path: Option<&Path>, config: &Config) {
    let settings = &image.settings;

    println!();
    println!("{}: {}", "ID".cyan().bold(), image.id);
    println!("{}: {}", "Prompt".cyan().bold(), image.prompt);
    println!("{}: {}", "Style".cyan().bold(), settings.style);
    println!(
        "{}: lighting {}/10, complexity {}/10",
        "Tone".cyan().bold(),
        settings.lighting,
        settings.complexity
    );
    println!("{}: {}", "Aspect Ratio".cyan().bold(), settings.aspect_ratio);
    println!("{}: {}", "Quality".cyan().bold(), settings.quality);
    println!("{}: {}", "Model".cyan().bold(), model);

    if let Some(path) = path {
        println!("{}: {}", "Saved".cyan().bold(), path.display());

        // Try to display image in terminal
        if config.output.display == DisplayMode::Terminal {
            println!();
            display_image_terminal(path);
        }
    }
}

/// Display an image in the terminal using viuer
fn display_image_terminal(path: &Path) {
    let conf = viuer::Config {
        width: Some(80),
        height: Some(30),
        absolute_offset: false,
        ..Default::default()
    };

    if let Err(e) = viuer::print_from_file(path, &conf) {
        tracing::debug!("Failed to display image in terminal: {}", e);
    }
}
