use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facenorm::{
    config,
    filter::{Filter, Filtered},
    io, landmarks, LandmarkPair, Point,
};
use facenorm_vision::Sampling;
use log::info;

#[derive(Parser)]
#[command(name = "facenorm")]
#[command(
    version,
    about = "Geometric face normalization from two eye landmarks"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shift, level, scale and crop a face into the canonical frame
    Normalize {
        input: PathBuf,
        output: PathBuf,
        /// File with `LEFT_ROW LEFT_COL RIGHT_ROW RIGHT_COL`
        #[arg(short, long, conflicts_with_all = ["left", "right"])]
        landmarks: Option<PathBuf>,
        /// Left eye as ROW,COL
        #[arg(long, requires = "right", allow_hyphen_values = true)]
        left: Option<Point>,
        /// Right eye as ROW,COL
        #[arg(long, requires = "left", allow_hyphen_values = true)]
        right: Option<Point>,
        /// Inter-eye distance in the output
        #[arg(long)]
        goal_distance: Option<f64>,
        /// Output size as ROWSxCOLS
        #[arg(long, value_parser = parse_size)]
        size: Option<(usize, usize)>,
        /// Row of the eye line in the output
        #[arg(long)]
        margin: Option<f64>,
        /// Write the derived transform as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Translate an image by ROW,COL pixels
    Shift {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        delta: Point,
    },
    /// Rotate an image about its centre, growing the canvas
    Rotate {
        input: PathBuf,
        output: PathBuf,
        /// Angle in degrees
        #[arg(long, allow_hyphen_values = true)]
        angle: f64,
    },
    /// Resize an image by a uniform factor
    Scale {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        factor: f64,
    },
    /// Print the effective config, or write it to the config path
    Config {
        #[arg(long)]
        write: bool,
    },
}

fn parse_size(s: &str) -> Result<(usize, usize), String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got `{s}`"))?;
    let rows = rows.trim().parse::<usize>().map_err(|e| format!("rows: {e}"))?;
    let cols = cols.trim().parse::<usize>().map_err(|e| format!("cols: {e}"))?;
    Ok((rows, cols))
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(cli.config.as_deref())?;
    let sampling = Sampling::new(cfg.normalizer.interpolation, cfg.normalizer.fill_value);

    match cli.command {
        Commands::Normalize {
            input,
            output,
            landmarks,
            left,
            right,
            goal_distance,
            size,
            margin,
            report,
        } => {
            let pair = match (landmarks, left, right) {
                (Some(path), _, _) => landmarks::load_landmarks(&path)?,
                (None, Some(left), Some(right)) => LandmarkPair::new(left, right),
                _ => anyhow::bail!("pass either --landmarks or both --left and --right"),
            };
            if let Some(d) = goal_distance {
                cfg.normalizer.goal_eye_distance = d;
            }
            if let Some(s) = size {
                cfg.normalizer.output_size = s;
            }
            if let Some(m) = margin {
                cfg.normalizer.crop_margin = m;
            }
            let filter = Filter::Normalize {
                config: cfg.normalizer,
                landmarks: pair,
            };
            let out = run(&filter, &input, &output)?;
            if let (Some(path), Filtered::Normalized(n)) = (report, &out) {
                let json = serde_json::json!({
                    "transform": n.transform,
                    "landmarks": n.landmarks,
                });
                std::fs::write(&path, serde_json::to_string_pretty(&json)?)
                    .with_context(|| format!("writing report {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
            Ok(())
        }
        Commands::Shift {
            input,
            output,
            delta,
        } => run(&Filter::Shift { delta, sampling }, &input, &output).map(drop),
        Commands::Rotate {
            input,
            output,
            angle,
        } => {
            let filter = Filter::Rotate {
                angle_radians: angle.to_radians(),
                sampling,
            };
            run(&filter, &input, &output).map(drop)
        }
        Commands::Scale {
            input,
            output,
            factor,
        } => run(&Filter::Scale { factor, sampling }, &input, &output).map(drop),
        Commands::Config { write } => {
            if write {
                let path = cli.config.as_deref().unwrap_or(config::CONFIG_PATH.as_path());
                config::save_config(&cfg, Some(path))?;
                info!("Config written to {}", path.display());
            } else {
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
            Ok(())
        }
    }
}

fn run(filter: &Filter, input: &Path, output: &Path) -> Result<Filtered<u8>> {
    let img = io::load_gray(input)?;
    info!(
        "Applying {} to {} ({}x{})",
        filter.name(),
        input.display(),
        img.height(),
        img.width()
    );
    let out = filter
        .apply(&img)
        .with_context(|| format!("{} failed on {}", filter.name(), input.display()))?;
    io::save_gray(out.image(), output)?;
    info!("✓ Saved {}", output.display());
    Ok(out)
}
