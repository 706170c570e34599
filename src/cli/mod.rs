pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "p2l",
    version,
    about = "P2L Studio - styled image generation with Google Gemini",
    long_about = r#"P2L Studio - styled image generation with Google Gemini

Pick an artistic style, tune lighting and detail, describe a scene (or start
from an image) and let Gemini render it. Run without arguments to open the
interactive studio.

SETUP:
  Set your API key via environment variable or config:
    export GEMINI_API_KEY=your-key-here
    p2l config set api.key your-key-here

  2K and 4K output use the high-tier model, which needs a key from a paid
  project. You are asked for it on first use, or set it up front:
    p2l config set api.high_tier_key your-paid-key

EXAMPLES:
  Generate an image:
    p2l generate "a rickshaw at night" --style cyberpunk
    p2l g "tea stall in the rain" --ar 16:9 --lighting 6 --complexity 4
    p2l generate "festival poster" --style title-maker --quality 2K --format json

  Start from an existing image:
    p2l generate "turn it into a sticker" --image photo.png --style rickshaw-sticker

  List styles:
    p2l styles

  Launch the studio:
    p2l"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/p2l-studio/config.toml (Linux)
  Run `p2l config path` for the exact location.

  Styles: run `p2l styles`
  Aspect ratios: 1:1, 16:9, 9:16, 4:3, 3:4
  Quality: Standard (gemini-2.5-flash-image), 2K and 4K (gemini-3-pro-image-preview)"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an image from a prompt and/or a source image
    ///
    /// Builds the styled prompt from your settings, sends it to Gemini and
    /// saves the result to the configured output directory.
    #[command(
        alias = "g",
        after_help = r#"EXAMPLES:
  Basic generation:
    p2l generate "a futuristic rickshaw flying through a neon Dhaka night"

  Style and tone:
    p2l generate "village market" --style bangladeshi-folk-art --lighting 4

  High resolution (high-tier key required):
    p2l generate "detailed portrait" --quality 4K

  From a source image:
    p2l generate "" --image sketch.png --style pixar-style

  JSON output for scripts:
    p2l generate "abstract art" --format json"#
    )]
    Generate(commands::generate::GenerateArgs),

    /// List the artistic styles and their prompt fragments
    #[command(alias = "s")]
    Styles(commands::styles::StylesArgs),

    /// View or modify configuration
    ///
    /// Manage API keys, default compose settings and output settings.
    /// Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    p2l config show

  Get a specific value:
    p2l config get defaults.style

  Set values:
    p2l config set api.key YOUR_API_KEY
    p2l config set defaults.style "Anime Style"
    p2l config set defaults.quality 2K
    p2l config set output.directory ~/Pictures/p2l

  Show config file path:
    p2l config path

  Reset to defaults:
    p2l config reset --force

AVAILABLE SETTINGS:
  api.key               - Gemini API key
  api.high_tier_key     - Paid-project key for 2K/4K output
  api.base_url          - API endpoint
  api.standard_model    - Model for Standard quality
  api.high_tier_model   - Model for 2K/4K quality
  defaults.style        - Initial style
  defaults.lighting     - Initial lighting level (0-10)
  defaults.complexity   - Initial complexity level (0-10)
  defaults.aspect_ratio - Initial aspect ratio
  defaults.quality      - Initial quality (Standard, 2K, 4K)
  output.directory      - Where to save images
  output.auto_download  - Save images automatically (true/false)
  output.display        - Show images after generating (terminal/none)"#
    )]
    Config(commands::config::ConfigArgs),
}
