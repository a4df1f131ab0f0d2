mod args;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squeezer_core::{
    load_config, load_config_or_default, validate_config, CodecCatalog, CompressionPlan,
    CompressionPlanner, Config, ConversionEvent, ConversionOrchestrator, ConversionRequest,
    Encoder, FfmpegCodecCatalog, FfmpegEncoder, FfprobeProbe, FileFlagStore, FlagStore, JobState,
    LegacyGate, MetadataProbe, PlanError, SourceMetadata, StaticCodecCatalog,
};

use args::Cli;

/// Configuration file used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "squeezer.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let (json_layer, text_layer) = if cli.json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_or_default(Path::new(DEFAULT_CONFIG_PATH))
            .context("Failed to load default configuration")?,
    };
    if let Some(tier) = cli.quality {
        config.compression.quality_tier = Some(tier);
    }
    validate_config(&config).context("Configuration validation failed")?;

    if !cli.input.exists() {
        bail!("Input file not found: {:?}", cli.input);
    }

    let probe = FfprobeProbe::from_config(&config.encoder);
    let report = probe.probe(&cli.input).await;
    if report.is_empty() {
        warn!("No usable metadata for {:?}, planning with defaults", cli.input);
    }
    let source = SourceMetadata::from_report(&cli.input, &report);
    let edits = cli.edits();

    let plan = plan(&config, &source, &edits).await?;
    print_plan(&plan, cli.json)?;

    if cli.plan_only {
        return Ok(());
    }

    tokio::fs::create_dir_all(&config.orchestrator.cache_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create cache dir {:?}",
                config.orchestrator.cache_dir
            )
        })?;

    let flags = Arc::new(FileFlagStore::from_config(&config.state));
    match flags.previous_ok().await {
        Ok(ok) => info!("Previous conversion completed cleanly: {}", ok),
        Err(e) => warn!("Could not read previous-run flag: {}", e),
    }

    let encoder = FfmpegEncoder::new(config.encoder.clone());
    encoder.validate().await.context("FFmpeg is not available")?;

    let event_buffer = config.orchestrator.event_buffer;
    let orchestrator =
        ConversionOrchestrator::new(config.orchestrator.clone(), Arc::new(encoder), flags);

    let job = orchestrator
        .prepare(ConversionRequest {
            source_path: source.path.clone(),
            plan,
            edits,
        })
        .await
        .context("Failed to prepare conversion")?;

    let cancel = job.cancel_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling conversion");
            cancel.cancel();
        }
    });

    let (tx, rx) = mpsc::channel(event_buffer);
    let printer = tokio::spawn(print_events(rx, cli.json));

    let report = orchestrator
        .run(job, tx)
        .await
        .context("Conversion could not run")?;
    let _ = printer.await;

    match report.state {
        JobState::Succeeded => {
            println!("{}", report.output_path.display());
            Ok(())
        }
        JobState::Canceled => bail!(
            "Conversion canceled, partial output left at {:?}",
            report.output_path
        ),
        _ => bail!(
            "Conversion failed: {}",
            report.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

/// Plans the conversion, running the legacy capability checks when the
/// configured platform needs them.
async fn plan(
    config: &Config,
    source: &SourceMetadata,
    edits: &squeezer_core::EditDescriptors,
) -> Result<CompressionPlan> {
    let planner = CompressionPlanner::new(config.compression.clone());
    let gate = LegacyGate::from_config(&config.platform);
    if !gate.is_required() {
        return Ok(planner.plan(source, edits));
    }

    let catalog: Box<dyn CodecCatalog> = if config.platform.codecs.is_empty() {
        let detected = FfmpegCodecCatalog::detect(&config.encoder)
            .await
            .map_err(PlanError::from)
            .context("Failed to enumerate encoders")?;
        Box::new(detected)
    } else {
        Box::new(StaticCodecCatalog::new(config.platform.codecs.clone()))
    };

    planner
        .plan_gated(source, edits, &gate, catalog.as_ref())
        .context("Video cannot be compressed on this platform")
}

fn print_plan(plan: &CompressionPlan, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    if plan.needs_reencode {
        println!(
            "Plan: {}x{} -> {}x{} @ {} kbps, {} fps, {} ms (tier {}/{})",
            plan.original_width,
            plan.original_height,
            plan.result_width,
            plan.result_height,
            plan.target_bitrate_bps / 1000,
            plan.framerate,
            plan.duration_ms,
            plan.selected_tier + 1,
            plan.tier_count
        );
    } else {
        println!(
            "Plan: {}x{} passes through unchanged ({} kbps)",
            plan.original_width,
            plan.original_height,
            plan.original_bitrate_bps / 1000
        );
    }
    Ok(())
}

async fn print_events(mut rx: mpsc::Receiver<ConversionEvent>, json: bool) {
    while let Some(event) = rx.recv().await {
        if json {
            if let Ok(line) = serde_json::to_string(&event) {
                eprintln!("{}", line);
            }
            continue;
        }
        match event {
            ConversionEvent::Progress {
                available_bytes,
                progress,
                ..
            } => {
                eprintln!(
                    "{:5.1}%  {} KiB",
                    progress * 100.0,
                    available_bytes / 1024
                );
            }
            ConversionEvent::Finished {
                final_size, error, ..
            } => {
                if error {
                    eprintln!("failed after writing {} KiB", final_size / 1024);
                } else {
                    eprintln!("done, {} KiB", final_size / 1024);
                }
            }
        }
    }
}
