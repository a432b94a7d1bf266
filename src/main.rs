//! scrollfx simulator - entry point

use clap::{Parser, ValueEnum};
use scrollfx::model::AppError;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Output encoding for the directive trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Text,
}

/// Simulate scroll-reveal and parallax directives for a scene file
#[derive(Parser, Debug)]
#[command(name = "scrollfx")]
#[command(version)]
#[command(about = "Replay a TOML scene through the scroll animation engine and print its directives")]
pub struct Args {
    /// Path to the scene file
    pub scene: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reveal on entry without delays or stagger offsets
    #[arg(long)]
    pub reduced_motion: bool,

    /// Simulated animation frames per second
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub frame_rate: Option<u32>,

    /// Trace output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = scrollfx::config::load_config_with_precedence(args.config.clone())?;
        let merged = scrollfx::config::merge_config(config_file);
        let with_env = scrollfx::config::apply_env_overrides(merged)?;
        let reduced_motion_override = args.reduced_motion.then_some(true);
        scrollfx::config::apply_cli_overrides(with_env, reduced_motion_override, args.frame_rate)
    };
    config.validate()?;

    scrollfx::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let scene = scrollfx::scene::load_scene(&args.scene)?;
    let trace = scrollfx::scene::simulate(&scene, &config)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in &trace {
        match args.format {
            Format::Json => {
                let json = serde_json::to_string(line).map_err(std::io::Error::from)?;
                writeln!(out, "{json}")?;
            }
            Format::Text => writeln!(out, "{line}")?,
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_does_not_error() {
        let err = Args::try_parse_from(["scrollfx", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn version_does_not_error() {
        let err = Args::try_parse_from(["scrollfx", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn scene_is_required() {
        let err = Args::try_parse_from(["scrollfx"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["scrollfx", "page.toml"]);
        assert_eq!(args.scene, PathBuf::from("page.toml"));
        assert_eq!(args.config, None);
        assert!(!args.reduced_motion);
        assert_eq!(args.frame_rate, None);
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn all_flags() {
        let args = Args::parse_from([
            "scrollfx",
            "page.toml",
            "--config",
            "/custom/config.toml",
            "--reduced-motion",
            "--frame-rate",
            "30",
            "--format",
            "text",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(args.reduced_motion);
        assert_eq!(args.frame_rate, Some(30));
        assert_eq!(args.format, Format::Text);
    }

    #[test]
    fn frame_rate_rejects_zero() {
        let err = Args::try_parse_from(["scrollfx", "page.toml", "--frame-rate", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn frame_rate_rejects_above_limit() {
        assert!(Args::try_parse_from(["scrollfx", "page.toml", "--frame-rate", "500"]).is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let err = Args::try_parse_from(["scrollfx", "page.toml", "--format", "yaml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
