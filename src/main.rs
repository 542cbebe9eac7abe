use anyhow::{Context, Result};
use clap::Parser;
use img_shrink::cli::{Args, Commands};
use img_shrink::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, ORIGINAL_SIZE_PREFIX, SUCCESS_PREFIX,
};
use img_shrink::utils::{create_progress_bar, create_progress_spinner, format_file_size};
use img_shrink::{
    collect_image_files, logger, read_payloads, BatchOptions, CompressionOutcome,
    CompressorConfig, ImageStatus, QualityTier, ResampleFilter, Session, QUALITY_TIERS,
};
use img_shrink::{error, info, verbose, warn};
use indicatif::ProgressDrawTarget;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            tier,
            quality,
            filter,
            threads,
            recursive,
        } => {
            compress(&input, &output, &tier, quality, filter, threads, recursive)?;
        }
        Commands::Tiers => show_tiers(),
    }

    Ok(())
}

fn show_tiers() {
    println!("📋 Resolution tiers:");
    for tier in QUALITY_TIERS.iter() {
        println!(
            "  {:<8} {:<16} {:>7}  scale {:.3}",
            tier.id, tier.label, tier.description, tier.scale
        );
    }
}

fn compress(
    input: &str,
    output: &Path,
    tier: &QualityTier,
    quality: Option<u8>,
    filter: Option<ResampleFilter>,
    threads: Option<usize>,
    recursive: bool,
) -> Result<()> {
    info!("🚀 Starting compression at {}", tier);
    info!("📁 Input: {}", input);
    info!("📁 Output: {:?}", output);

    let config = CompressorConfig::new(quality, filter)?;
    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let session = Session::new(config, &BatchOptions {
        threads: Some(threads),
    })?;

    let spinner = create_progress_spinner("Collecting images...");
    if logger::is_quiet() {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    let files = collect_image_files(input, recursive)?;
    let queued = session.enqueue(read_payloads(&files)).len();
    spinner.finish_and_clear();

    if queued == 0 {
        warn!("No image files found in the input path");
        return Ok(());
    }
    info!("📊 Found {} images, using {} threads", queued, threads);

    let progress = create_progress_bar(queued as u64);
    if logger::is_quiet() {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }
    let on_settled = |outcome: &CompressionOutcome| {
        progress.inc(1);
        if let CompressionOutcome::Failed { id, .. } = outcome {
            progress.set_message(format!("failed: {}", id));
        }
    };
    let report = session.compress_all_with_progress(tier, Some(&on_settled))?;
    progress.finish_with_message(format!("{} Batch compression complete", SUCCESS_PREFIX));

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {:?}", output))?;

    let mut used_names = HashSet::new();
    for image in session.list_images() {
        match image.status() {
            ImageStatus::Done { .. } => {
                let Some(download) = session.downloadable_of(&image) else {
                    continue;
                };
                let target = unique_path(output, &download.filename, &mut used_names);
                fs::write(&target, download.output.bytes())
                    .with_context(|| format!("Failed to write {:?}", target))?;
                verbose!(
                    "{} -> {:?} ({} -> {}, saved {}%)",
                    image.name(),
                    target,
                    format_file_size(image.original_size()),
                    format_file_size(download.output.size_bytes()),
                    image.reduction_percent().unwrap_or(0)
                );
            }
            ImageStatus::Error { message } => {
                error!("{}: {}", image.name(), message);
            }
            ImageStatus::Pending | ImageStatus::Compressing => {}
        }
    }

    info!("\n📊 Batch Compression Summary:");
    info!("  📁 Compressed: {} of {}", report.succeeded, report.total);
    info!(
        "  {} {}",
        ORIGINAL_SIZE_PREFIX,
        format_file_size(report.total_original_bytes)
    );
    info!(
        "  {} {}",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(report.total_compressed_bytes)
    );
    info!(
        "  {} {:.1}%",
        COMPRESSION_RATIO_PREFIX,
        report.reduction_percent()
    );
    info!("  ⏱️  Total time: {:?}", report.elapsed);
    info!("  ⚡ Average speed: {:.2} files/second", report.files_per_second());
    if report.failed > 0 {
        warn!("Failed files: {}", report.failed);
    }

    Ok(())
}

/// `compressed-a.jpg`, then `compressed-a-2.jpg`, ... when two sources share
/// a stem.
fn unique_path(dir: &Path, filename: &str, used: &mut HashSet<String>) -> PathBuf {
    let mut candidate = filename.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = Path::new(filename)
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        candidate = format!("{}-{}.{}", stem, n, ext);
        n += 1;
    }
    dir.join(candidate)
}
