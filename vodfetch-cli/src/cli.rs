use std::path::PathBuf;

use clap::Parser;
use vodfetch_engine::VariantSelectionPolicy;

/// Download an HLS VOD stream and mux it into a single file.
#[derive(Debug, Parser)]
#[command(name = "vodfetch", version, about)]
pub struct Args {
    /// URL of the master playlist (.m3u8)
    #[arg(short = 'm', long = "master-playlist", value_name = "URL")]
    pub master_playlist: String,

    /// Scratch directory for segments; destroyed and recreated each run
    #[arg(long, value_name = "DIR", default_value = "temp")]
    pub work_dir: PathBuf,

    /// Directory the final muxed file is written to
    #[arg(short, long, value_name = "DIR", default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Container extension of the output file
    #[arg(long, value_name = "EXT", default_value = "mp4")]
    pub container: String,

    /// Pick the variant closest to this bandwidth instead of the highest
    #[arg(long, value_name = "BPS", conflicts_with = "lowest")]
    pub bandwidth: Option<u64>,

    /// Pick the lowest-bandwidth variant instead of the highest
    #[arg(long)]
    pub lowest: bool,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn selection_policy(&self) -> VariantSelectionPolicy {
        if let Some(bandwidth) = self.bandwidth {
            VariantSelectionPolicy::ClosestToBandwidth(bandwidth)
        } else if self.lowest {
            VariantSelectionPolicy::LowestBandwidth
        } else {
            VariantSelectionPolicy::HighestBandwidth
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_highest_bandwidth() {
        let args = Args::parse_from(["vodfetch", "-m", "https://example.com/master.m3u8"]);
        assert_eq!(args.selection_policy(), VariantSelectionPolicy::HighestBandwidth);
        assert_eq!(args.work_dir, PathBuf::from("temp"));
        assert_eq!(args.output_dir, PathBuf::from("downloads"));
        assert_eq!(args.container, "mp4");
    }

    #[test]
    fn bandwidth_flag_selects_closest_policy() {
        let args = Args::parse_from([
            "vodfetch",
            "-m",
            "https://example.com/master.m3u8",
            "--bandwidth",
            "800000",
        ]);
        assert_eq!(
            args.selection_policy(),
            VariantSelectionPolicy::ClosestToBandwidth(800_000)
        );
    }

    #[test]
    fn bandwidth_and_lowest_conflict() {
        let result = Args::try_parse_from([
            "vodfetch",
            "-m",
            "https://example.com/master.m3u8",
            "--bandwidth",
            "800000",
            "--lowest",
        ]);
        assert!(result.is_err());
    }
}
