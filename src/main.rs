mod backends;
mod captions;
mod chat;
mod config;
mod encoding;
mod generator;
mod renderer;
mod scenes;
mod schema;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AiConfig;
use crate::schema::{VideoRequest, DEFAULT_CLOSING_TEXT, DEFAULT_OPENING_TEXT};

#[derive(Debug, Parser)]
#[command(name = "trishula")]
#[command(about = "AI-assisted Maha Shivaratri promotional video generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assemble the six-scene promotional video.
    Generate {
        #[arg(long, default_value = "divine_blue")]
        theme: String,
        #[arg(long, default_value = DEFAULT_OPENING_TEXT)]
        opening_text: String,
        #[arg(long, default_value = DEFAULT_CLOSING_TEXT)]
        closing_text: String,
        #[arg(long, default_value = "mp4")]
        format: String,
        #[arg(long, default_value = "1080p")]
        resolution: String,
        /// Free-text prompt for AI-generated opening/closing captions.
        #[arg(long, default_value = "")]
        prompt: String,
        /// Output file path; defaults to maha_shivaratri_concept.<format>.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Ask the Shivaratri Video Assistant one question.
    Chat {
        #[arg(short, long)]
        message: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AiConfig::from_env();

    match cli.command {
        Commands::Generate {
            theme,
            opening_text,
            closing_text,
            format,
            resolution,
            prompt,
            output,
        } => {
            let request = VideoRequest {
                theme: schema::Theme::parse(&theme),
                opening_text,
                closing_text,
                format: schema::OutputFormat::parse(&format),
                resolution: schema::Resolution::parse(&resolution),
                prompt,
            };
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "maha_shivaratri_concept.{}",
                    request.format.extension()
                ))
            });
            generator::assemble_video(&config, &request, &output)
        }
        Commands::Chat { message } => {
            let backends = backends::configured_backends(&config)?;
            let reply = chat::reply(&backends, &message)?;
            println!("{reply}");
            Ok(())
        }
    }
}
