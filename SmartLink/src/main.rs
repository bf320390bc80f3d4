use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use smartlink::{BatchConfigExt, BatchOutcome, BatchRequest, SmartLinkService, logging};
use smlconfig::Config;
use smlcore::MetadataOverrides;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "smartlink")]
#[command(version)]
#[command(about = "Generate SmartLink pages from music platform URLs")]
struct Cli {
    /// Configuration directory (default: $SMARTLINK_CONFIG, ./.smartlink, ~/.smartlink)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a source URL and generate its SmartLink
    Create {
        url: String,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Regenerate a SmartLink, removing the old page if its slug changed
    Update {
        url: String,
        /// Track slug (or title) of the existing page
        #[arg(long)]
        previous_slug: Option<String>,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Delete a generated SmartLink
    Delete { artist_slug: String, track_slug: String },
    /// Generate SmartLinks for every URL of a file (one per line, # for comments)
    Batch {
        file: PathBuf,
        /// Pause between two items, in milliseconds (default: batch.delay_ms)
        #[arg(long)]
        delay_ms: Option<u64>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Print a generated SmartLink page
    Show { artist_slug: String, track_slug: String },
}

#[derive(Args)]
struct OverrideArgs {
    /// Country code sent to the resolution provider (default: resolver.default_country)
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    /// Track slug, instead of the one derived from the title
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    artist_slug: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Cover image URL
    #[arg(long)]
    cover: Option<String>,
    /// Audio preview URL
    #[arg(long)]
    preview: Option<String>,
}

impl OverrideArgs {
    fn to_overrides(&self) -> MetadataOverrides {
        MetadataOverrides {
            track_title: self.title.clone(),
            artist_name: self.artist.clone(),
            slug: self.slug.clone(),
            artist_slug: self.artist_slug.clone(),
            description: self.description.clone(),
            cover_image_url: self.cover.clone(),
            audio_preview_url: self.preview.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = cli
        .config
        .as_deref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config = Config::load_config(&config_dir).context("failed to load configuration")?;
    logging::init_logging(&config)?;

    let service = SmartLinkService::from_config(&config)?;

    match cli.command {
        Commands::Create { url, overrides } => {
            let link = service
                .create_from_url(&url, overrides.country.as_deref(), Some(&overrides.to_overrides()))
                .await?;
            if let Some(warning) = &link.warning {
                eprintln!("warning: {warning}");
            }
            println!("{}", link.public_url);
            println!("{}", link.artifact.path.display());
        }
        Commands::Update {
            url,
            previous_slug,
            overrides,
        } => {
            let link = service
                .update_from_url(
                    &url,
                    overrides.country.as_deref(),
                    Some(&overrides.to_overrides()),
                    previous_slug.as_deref(),
                )
                .await?;
            if let Some(warning) = &link.warning {
                eprintln!("warning: {warning}");
            }
            println!("{}", link.public_url);
            println!("{}", link.artifact.path.display());
        }
        Commands::Delete {
            artist_slug,
            track_slug,
        } => {
            if service.delete(&artist_slug, &track_slug).await? {
                println!("Deleted {artist_slug}/{track_slug}");
            } else {
                println!("Nothing to delete for {artist_slug}/{track_slug}");
            }
        }
        Commands::Batch {
            file,
            delay_ms,
            country,
        } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mut requests = BatchRequest::parse_list(&text);
            if let Some(country) = country {
                requests = requests
                    .into_iter()
                    .map(|r| r.with_country(country.clone()))
                    .collect();
            }

            let delay = match delay_ms {
                Some(ms) => Duration::from_millis(ms),
                None => config.get_batch_delay()?,
            };
            info!("Processing {} URL(s) from {}", requests.len(), file.display());

            let report = service.create_batch(&requests, delay).await;
            for outcome in &report.outcomes {
                match outcome {
                    BatchOutcome::Created { public_url, .. } => {
                        println!("ok    {} -> {}", outcome.source_url(), public_url)
                    }
                    BatchOutcome::Failed { kind, message, .. } => {
                        println!("fail  {} ({:?}): {}", outcome.source_url(), kind, message)
                    }
                }
            }
            println!("{} created, {} failed", report.created(), report.failed());

            if !report.is_success() {
                bail!("{} batch item(s) failed", report.failed());
            }
        }
        Commands::Show {
            artist_slug,
            track_slug,
        } => {
            let content = service.read(&artist_slug, &track_slug).await?;
            println!("{}", String::from_utf8_lossy(&content));
        }
    }

    Ok(())
}
