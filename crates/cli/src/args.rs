use clap::Parser;
use std::path::PathBuf;

use squeezer_core::EditDescriptors;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Squeezer - re-encode videos for transmission",
    long_about = "Probes a video, plans the output resolution and bitrate, \
                 and re-encodes it with ffmpeg when the plan calls for it."
)]
pub struct Cli {
    /// Input video file
    pub input: PathBuf,

    /// Configuration file (defaults to ./squeezer.toml when present)
    #[arg(short, long, env = "SQUEEZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compression tier, 0 is the smallest output
    #[arg(short, long)]
    pub quality: Option<usize>,

    /// Log as JSON and print the plan as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat the video as cropped
    #[arg(long)]
    pub crop: bool,

    /// Trim start in milliseconds
    #[arg(long, value_name = "MS")]
    pub trim_start: Option<i64>,

    /// Trim end in milliseconds
    #[arg(long, value_name = "MS")]
    pub trim_end: Option<i64>,

    /// Print the plan and exit without converting
    #[arg(long)]
    pub plan_only: bool,
}

impl Cli {
    /// Edits requested on the command line.
    pub fn edits(&self) -> EditDescriptors {
        EditDescriptors {
            has_crop: self.crop,
            ..EditDescriptors::default()
        }
        .with_trim(self.trim_start.unwrap_or(-1), self.trim_end.unwrap_or(-1))
    }
}
