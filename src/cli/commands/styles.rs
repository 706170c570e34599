use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::core::styles::style_fragment;
use crate::core::ArtisticStyle;

#[derive(Args)]
pub struct StylesArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Serialize)]
struct StyleEntry {
    name: &'static str,
    slug: String,
    fragment: &'static str,
}

pub fn run(args: StylesArgs) -> Result<()> {
    let entries: Vec<StyleEntry> = ArtisticStyle::ALL
        .iter()
        .map(|style| StyleEntry {
            name: style.name(),
            slug: style.slug(),
            fragment: style_fragment(*style),
        })
        .collect();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Artistic styles".cyan().bold());
    println!("{}", "=".repeat(50));
    for entry in &entries {
        println!();
        println!("{} {}", entry.name.bold(), format!("({})", entry.slug).dimmed());
        println!("  {}", entry.fragment);
    }

    Ok(())
}
