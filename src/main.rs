use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use photo_gallery::{open_local_gallery, GalleryConfig, Photo, RuntimeEnvironment};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "photo-gallery", about = "Manage a local photo gallery")]
struct Cli {
    /// JSON config file
    #[arg(short = 'c', long, env = "PHOTO_GALLERY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the runtime environment from the config
    #[arg(long, value_enum)]
    environment: Option<EnvironmentArg>,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the saved gallery
    List,
    /// Capture a photo by importing a JPEG file
    Capture { file: PathBuf },
    /// Delete the photo at a gallery position
    Delete { index: usize },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EnvironmentArg {
    Hybrid,
    Browser,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

fn print_photos(photos: &[Photo]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(photos)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.log_level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = GalleryConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(env) = cli.environment {
        config.environment = match env {
            EnvironmentArg::Hybrid => RuntimeEnvironment::Hybrid,
            EnvironmentArg::Browser => RuntimeEnvironment::Browser,
        };
    }

    let import = match &cli.command {
        Command::Capture { file } => Some(file.clone()),
        _ => None,
    };
    let mut gallery = open_local_gallery(&config, import);
    gallery
        .load_saved()
        .await
        .context("Failed to load saved photos")?;

    match cli.command {
        Command::List => print_photos(gallery.photos())?,
        Command::Capture { file } => {
            let saved = gallery
                .add_new_to_gallery()
                .await
                .with_context(|| format!("Failed to capture {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        Command::Delete { index } => {
            let photo = gallery
                .photos()
                .get(index)
                .cloned()
                .with_context(|| format!("No photo at position {}", index))?;
            gallery
                .delete_picture(&photo, index)
                .await
                .with_context(|| format!("Failed to delete {}", photo.filepath))?;
            print_photos(gallery.photos())?;
        }
    }

    Ok(())
}
