use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use twitter_media::{Config, MediaService};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("media-upload")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Upload a file through the chunked media upload endpoint")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("File to upload")
                .required(true)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("TOML configuration file")
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("API base URL")
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("Bearer token")
        )
        .arg(
            Arg::new("media-type")
                .long("media-type")
                .value_name("MIME")
                .help("Media type declared by INIT")
        )
        .arg(
            Arg::new("base64")
                .long("base64")
                .help("Send the segment base64 encoded as media_data")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    if matches.get_flag("verbose") {
        tracing_subscriber::fmt()
            .with_target(true)
            .with_env_filter("debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter("twitter_media=info,media_upload=info,warn")
            .init();
    }

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.api.base_url = base_url.clone();
    }
    if let Some(token) = matches.get_one::<String>("token") {
        config.api.bearer_token = Some(token.clone());
    }
    if let Some(media_type) = matches.get_one::<String>("media-type") {
        config.upload.media_type = media_type.clone();
    }
    let use_base64 = matches.get_flag("base64");

    let file = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .context("missing --file")?;

    let data = tokio::fs::read(&file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    info!("{}", config.summary());
    let service = MediaService::new(&config)?;

    info!("INIT {} ({} bytes)", file.display(), data.len());
    let init = service.init(data.len() as u64).await?;
    let media_id = init.id();
    info!("Assigned media id {}", media_id);

    // one segment, index 0
    service.append(&data, &media_id, 0, use_base64).await?;
    info!("APPEND segment 0 done");

    let finalized = service.finalize(&media_id).await?;
    info!("FINALIZE done");

    println!("{}", serde_json::to_string_pretty(&finalized)?);
    Ok(())
}
