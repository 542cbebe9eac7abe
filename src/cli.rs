use crate::compressor::ResampleFilter;
use crate::tier::QualityTier;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Downscale a batch of images to a resolution tier and re-encode them as JPEG",
    long_about = "img-shrink queues a set of images, scales each one by the selected resolution \
                  tier (330, 220, 150 or 96 ppi against a 330 ppi base) and re-encodes it as \
                  JPEG at a fixed quality. Images are compressed in parallel; a broken file only \
                  fails itself.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink compress ./photos ./out -t web\n  \
    img-shrink compress \"./photos/*.png\" ./out -t 220 -j 4\n  \
    img-shrink tiers"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-image diagnostics")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress images into an output directory",
        long_about = "Queue every image found at INPUT, compress the batch at the chosen tier, \
                      and save each finished image as compressed-<name>.jpg in OUTPUT."
    )]
    Compress {
        #[arg(
            help = "Input file, directory, or glob",
            long_help = "Input can be a single file, a directory, or a glob expression. \
                         Examples: './images', './images/*.png'"
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[arg(
            short = 't',
            long,
            default_value = "web",
            help = "Resolution tier (hd, print, web, minimal or a ppi value)"
        )]
        tier: QualityTier,

        #[arg(
            short = 'q',
            long,
            help = "JPEG quality (1-100, default: 90)"
        )]
        quality: Option<u8>,

        #[arg(
            long,
            help = "Resampling filter (bilinear, catmull-rom, lanczos3, nearest)"
        )]
        filter: Option<ResampleFilter>,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)"
        )]
        threads: Option<usize>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(about = "List the available resolution tiers")]
    Tiers,
}
