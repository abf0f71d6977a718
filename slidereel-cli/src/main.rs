use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use slidereel_core::config::{DEFAULT_FADE_DURATION_SECS, DEFAULT_IMAGE_DURATION_SECS};
use slidereel_core::{RenderConfig, Slideshow};

#[derive(Parser, Debug)]
#[command(name = "slidereel")]
#[command(about = "Turn a folder of JPEG images into an MP4 slideshow with crossfades and Ken Burns motion")]
#[command(version)]
struct Args {
    /// Directory containing .jpg/.jpeg images (not searched recursively)
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file path
    #[arg(short, long, default_value = "slideshow.mp4")]
    output: PathBuf,

    /// Seconds each image stays on screen
    #[arg(short, long, default_value_t = DEFAULT_IMAGE_DURATION_SECS)]
    duration: u32,

    /// Crossfade length in seconds (0 disables crossfades)
    #[arg(short, long, default_value_t = DEFAULT_FADE_DURATION_SECS)]
    fade: f64,

    /// Disable Ken Burns pan/zoom motion
    #[arg(long)]
    no_ken_burns: bool,

    /// Print the render plan as JSON instead of running FFmpeg
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = RenderConfig::default()
        .image_duration(args.duration)
        .fade_duration(args.fade)
        .ken_burns(!args.no_ken_burns);
    config.validate()?;

    let slideshow = Slideshow::new(&args.input, &args.output).config(config);

    if args.dry_run {
        let plan = slideshow.plan()?;
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    // Create output directory if it doesn't exist
    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    log::info!("Starting slideshow rendering...");
    log::info!("Input: {:?}", args.input);
    log::info!("Output: {:?}", args.output);

    slideshow.process()?;

    println!("\n✅ Slideshow rendered successfully!");
    println!("📁 Output saved to: {:?}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["slidereel", "-i", "photos"]).unwrap();
        assert_eq!(args.output, PathBuf::from("slideshow.mp4"));
        assert_eq!(args.duration, 5);
        assert_eq!(args.fade, 1.0);
        assert!(!args.no_ken_burns);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_fractional_fade_and_flags() {
        let args = Args::try_parse_from([
            "slidereel",
            "--input",
            "photos",
            "--output",
            "out/show.mp4",
            "--duration",
            "4",
            "--fade",
            "0.5",
            "--no-ken-burns",
        ])
        .unwrap();
        assert_eq!(args.duration, 4);
        assert_eq!(args.fade, 0.5);
        assert!(args.no_ken_burns);
    }

    #[test]
    fn test_duration_must_be_integer() {
        assert!(Args::try_parse_from(["slidereel", "-i", "photos", "-d", "2.5"]).is_err());
    }
}
