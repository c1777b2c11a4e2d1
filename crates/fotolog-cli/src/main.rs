//! fotolog CLI: run the photo upload pipeline from the command line.
//!
//! Settings come from the environment (see `Config::from_env`); flags
//! override them per command.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fotolog_cli::{error_report, init_tracing, log_failure};
use fotolog_core::Config;
use fotolog_processing::{
    extension_of, supported_formats, upload_pipeline, FormatClass, ImageAsset, MetadataExtractor,
};
use fotolog_storage::{LocalStorage, Storage};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fotolog", about = "Photo upload processing")]
struct Cli {
    /// Include internal error details in failure output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a filename has an accepted image extension
    Check {
        filename: String,
    },
    /// Print the metadata extracted from an image file
    Inspect {
        /// Path to the image
        file: PathBuf,
    },
    /// Convert, resize and store an image like an uploaded post
    Ingest {
        /// Path to the image
        file: PathBuf,
        /// Upload directory (default: UPLOAD_DIR)
        #[arg(long)]
        upload_dir: Option<PathBuf>,
        /// Longest side of the stored image (default: MAX_IMAGE_DIMENSION)
        #[arg(long)]
        max_size: Option<u32>,
        /// Filename hint used for format detection instead of the file's own name
        #[arg(long)]
        name: Option<String>,
    },
    /// List accepted formats
    Formats,
    /// Delete a stored upload
    Delete {
        /// Stored filename
        filename: String,
        /// Upload directory (default: UPLOAD_DIR)
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn file_name_of(path: &std::path::Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

async fn run(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Check { filename } => {
            let extension = extension_of(&filename);
            let class = FormatClass::from_extension(&extension);
            print_json(&serde_json::json!({
                "filename": filename,
                "extension": extension,
                "supported": class.is_supported(),
                "class": class.label(),
            }))?;
        }
        Commands::Inspect { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file_name_of(&file)?;
            let extractor = Arc::new(MetadataExtractor::from_kind(config.metadata_backend));
            let asset = ImageAsset::with_extractor(data, name, extractor)
                .map_err(fotolog_core::AppError::from)?;
            print_json(asset.metadata())?;
        }
        Commands::Ingest {
            file,
            upload_dir,
            max_size,
            name,
        } => {
            if let Some(dir) = upload_dir {
                config.upload_dir = dir;
            }
            if let Some(max) = max_size {
                config.max_image_dimension = max;
            }
            config.validate()?;

            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let original_filename = match name {
                Some(name) => name,
                None => file_name_of(&file)?,
            };

            let (upload, metadata) = upload_pipeline(data, original_filename, &config).await?;
            print_json(&serde_json::json!({
                "success": true,
                "upload": upload,
                "metadata": metadata,
            }))?;
        }
        Commands::Formats => {
            print_json(&supported_formats())?;
        }
        Commands::Delete {
            filename,
            upload_dir,
        } => {
            let storage = LocalStorage::new(upload_dir.unwrap_or(config.upload_dir));
            storage
                .delete(&filename)
                .map_err(fotolog_core::AppError::from)?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("{} deleted", filename),
            }))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let cli = Cli::parse();
    let verbose = cli.verbose;

    if let Err(err) = run(cli.command, config).await {
        log_failure(&err);
        print_json(&error_report(&err, verbose))?;
        std::process::exit(1);
    }

    Ok(())
}
