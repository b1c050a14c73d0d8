//! Tile formatter service.
//!
//! Turns downloaded model input arrays and extracted attention
//! activations into the binary tile tree and inventory consumed by the
//! visualization front end.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use formatter::config::FormatterConfig;
use formatter::pipeline::Pipeline;
use tiles_common::{date_range, FieldSpec, TimeSlot, ATTENTION_LAYER_NAMES};

#[derive(Parser, Debug)]
#[command(name = "formatter")]
#[command(about = "Tile weather-model inputs and attention activations for visualization")]
struct Args {
    /// Single date to process (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    date: Option<NaiveDate>,

    /// First date of an inclusive range (YYYY-MM-DD)
    #[arg(long, requires = "end_date")]
    start_date: Option<NaiveDate>,

    /// Last date of an inclusive range (YYYY-MM-DD)
    #[arg(long, requires = "start_date")]
    end_date: Option<NaiveDate>,

    /// Time-of-day labels to process (repeatable)
    #[arg(long = "time", default_values_t = [String::from("00:00"), String::from("12:00")])]
    times: Vec<String>,

    /// Attention-layer indices to process (repeatable; default: all)
    #[arg(long = "layer")]
    layers: Vec<usize>,

    /// Directory of downloaded input arrays
    #[arg(long, default_value = "input_data", env = "INPUT_DATA_DIR")]
    input_dir: PathBuf,

    /// Directory of extracted attention arrays
    #[arg(long, default_value = "output_data", env = "OUTPUT_DATA_DIR")]
    output_dir: PathBuf,

    /// Root of the binary tile store
    #[arg(long, default_value = "bin", env = "TILE_STORE_DIR")]
    store_dir: PathBuf,

    /// Worker threads across (date, time) units
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Per-tile progress narration (debug level); no behavioral effect
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dates = match (args.date, args.start_date, args.end_date) {
        (Some(date), None, None) => vec![date],
        (None, Some(start), Some(end)) => date_range(start, end)?,
        _ => bail!("either --date or --start-date/--end-date is required"),
    };

    let mut slots = Vec::with_capacity(dates.len() * args.times.len());
    for date in &dates {
        for time in &args.times {
            slots.push(TimeSlot::new(*date, time)?);
        }
    }

    let layers = if args.layers.is_empty() {
        (0..ATTENTION_LAYER_NAMES.len()).collect()
    } else {
        args.layers
    };

    let config = FormatterConfig {
        input_root: args.input_dir,
        output_root: args.output_dir,
        store_root: args.store_dir,
        field_spec: FieldSpec::default(),
        layers,
        jobs: args.jobs,
        ..FormatterConfig::default()
    };
    config.validate()?;

    info!(
        units = slots.len(),
        layers = config.layers.len(),
        jobs = config.jobs,
        "starting tile formatter"
    );

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(&slots)?;

    info!(
        units = summary.units_processed,
        failed = summary.units_failed,
        skipped_layers = summary.layers_skipped,
        "run complete"
    );

    if !summary.is_clean() {
        bail!(
            "{} unit(s) failed, {} layer(s) skipped",
            summary.units_failed,
            summary.layers_skipped
        );
    }
    Ok(())
}
