//! CLI entry point for the BODS attention charts.
//!
//! Provides subcommands for the attention scatter plot, the top-20 operator
//! ranking, the treemaps, and a scheduled watch loop that turns repeated
//! catalogue downloads into an animation.

use anyhow::{Context, Result};
use bods_attention::analyzers::analyzer::Analysis;
use bods_attention::analyzers::types::AttentionBand;
use bods_attention::animation::write_animation;
use bods_attention::archive::extract_csv;
use bods_attention::catalogue::CatalogueFilter;
use bods_attention::chart::{
    Theme, ranking_title, render_attention_treemap, render_breakdown, render_ranking,
    render_scatter, render_status_treemap, scatter::scatter_points, write_chart, write_png,
};
use bods_attention::fetch::{BasicClient, read_source};
use bods_attention::output::{print_json, print_pretty};
use bods_attention::placement::{
    Grouping, LabelPlacer, PlacementConfig, Point, mean_pairwise_distance,
};
use bods_attention::schedule::{DEFAULT_TIMES, DailySchedule};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CATALOGUE_CSV: &str = "timetables_data_catalogue.csv";

#[derive(Parser)]
#[command(name = "bods_attention")]
#[command(about = "Charts of BODS services requiring attention", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scatter plot of attention percentage against total services
    Scatter {
        /// Catalogue CSV to read
        #[arg(short, long, default_value = CATALOGUE_CSV)]
        input: PathBuf,

        /// Chart file (.svg or .png)
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Which organisations to plot
        #[arg(long, value_enum, default_value_t = AttentionBand::Partial)]
        band: AttentionBand,

        /// Also write the 0% and 100% organisations as CSVs into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Minimum label separation in data units
        #[arg(long, conflicts_with = "relative_buffer")]
        buffer: Option<f64>,

        /// Label separation as a fraction of the mean distance between points
        #[arg(long)]
        relative_buffer: Option<f64>,

        /// Maximum number of placement passes
        #[arg(long)]
        iterations: Option<usize>,

        /// How overlapping labels are grouped
        #[arg(long, value_enum)]
        grouping: Option<Grouping>,

        /// JSON file with placement settings; flags override it
        #[arg(long)]
        placement_config: Option<String>,

        /// Drop unregistered services and placeholder organisations first
        #[arg(long, default_value_t = false)]
        filtered: bool,
    },
    /// Rank operators with a high share of services requiring attention
    Top20 {
        /// Catalogue CSV to read
        #[arg(short, long, default_value = CATALOGUE_CSV)]
        input: PathBuf,

        /// Directory for the timestamped charts
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,

        /// Minimum attention percentage to qualify
        #[arg(long, default_value_t = 75.0)]
        min_percentage: f64,

        /// Number of operators to rank
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Treemap of organisations by service count
    Treemap {
        /// Catalogue CSV to read
        #[arg(short, long, default_value = CATALOGUE_CSV)]
        input: PathBuf,

        /// Chart file (.svg or .png)
        #[arg(short, long, default_value = "treemap.png")]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = TreemapMode::Attention)]
        mode: TreemapMode,
    },
    /// Download the catalogue on a daily schedule and animate the scatter plots
    Watch {
        /// Zip archive to download, or a local path to one
        #[arg(long, env = "BODS_CATALOGUE_URL")]
        url: String,

        /// Archive member to extract (matched by suffix)
        #[arg(long, default_value = CATALOGUE_CSV)]
        csv_name: String,

        /// Directory for extracted CSVs, frames and the animation
        #[arg(short = 'd', long, default_value = "output")]
        output_dir: PathBuf,

        /// Comma-separated HH:MM run times, local time
        #[arg(long, default_value = DEFAULT_TIMES)]
        times: String,

        /// Stop after this many frames (0 = run forever)
        #[arg(long, default_value_t = 0)]
        max_frames: usize,

        /// Animation speed
        #[arg(long, default_value_t = 1)]
        fps: u32,

        /// Seconds between schedule checks
        #[arg(long, default_value_t = 60)]
        poll_interval: u64,

        /// Run once immediately instead of waiting for the first slot
        #[arg(long, default_value_t = false)]
        run_now: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TreemapMode {
    /// Coloured by attention percentage
    Attention,
    /// Split by publication status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bods_attention.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bods_attention.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let theme = Theme::default();

    match cli.command {
        Commands::Scatter {
            input,
            output,
            band,
            export_dir,
            buffer,
            relative_buffer,
            iterations,
            grouping,
            placement_config,
            filtered,
        } => {
            let filter = if filtered {
                CatalogueFilter::standard()
            } else {
                CatalogueFilter::none()
            };
            let analysis = Analysis::load(&input, &filter)?;
            if let Some(dir) = export_dir {
                analysis.export_extremes(&dir)?;
            }

            let stats = analysis.band(band);
            let mut config = match placement_config {
                Some(path) => PlacementConfig::load(&path)
                    .with_context(|| format!("Failed to load placement config {path}"))?,
                None => PlacementConfig::default(),
            };
            if let Some(buffer) = buffer {
                config.buffer = buffer;
            }
            if let Some(fraction) = relative_buffer {
                config.buffer = relative_to_spread(&scatter_points(&stats), fraction, config.buffer);
            }
            if let Some(iterations) = iterations {
                config.iteration_limit = iterations;
            }
            if let Some(grouping) = grouping {
                config.grouping = grouping;
            }
            let placer = LabelPlacer::new(config)?;

            let chart = render_scatter(&stats, &placer, &theme, Some(band.title()));
            info!(
                organisations = chart.points.len(),
                iterations = chart.placement.iterations,
                resolved = chart.placement.resolved,
                "Labels placed"
            );
            if !chart.placement.resolved {
                warn!("Some labels still overlap after the iteration limit");
            }
            write_chart(&chart.svg, &output)?;
            info!(output = %output.display(), "Scatter plot written");
        }
        Commands::Top20 {
            input,
            output_dir,
            min_percentage,
            limit,
        } => {
            let analysis = Analysis::load(&input, &CatalogueFilter::standard())?;
            let top = analysis.top_operators(min_percentage, limit);
            print_pretty(&top);
            print_json(&top)?;
            if top.is_empty() {
                warn!(min_percentage, "No operators at or above the threshold");
            }

            let timestamp = Local::now().format("%Y%m%d%H%M%S");
            let ranking_path = output_dir.join(format!("top_20_operators_attention_{timestamp}.png"));
            let svg = render_ranking(&top, &theme, &ranking_title(limit, min_percentage));
            write_chart(&svg, &ranking_path)?;

            let breakdowns = analysis.breakdowns(&top[..top.len().min(3)]);
            let breakdown_path =
                output_dir.join(format!("top_3_operators_attention_breakdown_{timestamp}.png"));
            write_chart(&render_breakdown(&breakdowns, &theme), &breakdown_path)?;

            info!(
                ranked = top.len(),
                ranking = %ranking_path.display(),
                breakdown = %breakdown_path.display(),
                "Top operator charts written"
            );
        }
        Commands::Treemap {
            input,
            output,
            mode,
        } => {
            let analysis = Analysis::load(&input, &CatalogueFilter::none())?;
            let svg = match mode {
                TreemapMode::Attention => render_attention_treemap(&analysis.organisations, &theme),
                TreemapMode::Status => render_status_treemap(&analysis.status_counts(), &theme),
            };
            write_chart(&svg, &output)?;
            info!(output = %output.display(), ?mode, "Treemap written");
        }
        Commands::Watch {
            url,
            csv_name,
            output_dir,
            times,
            max_frames,
            fps,
            poll_interval,
            run_now,
        } => {
            let schedule = DailySchedule::parse(&times)?;
            watch(
                &url,
                &csv_name,
                &output_dir,
                &schedule,
                max_frames,
                fps,
                poll_interval,
                run_now,
            )
            .await?;
        }
    }

    Ok(())
}

/// Scales `fraction` by the mean distance between `points`, keeping
/// `fallback` when the points have no spread.
fn relative_to_spread(points: &[Point], fraction: f64, fallback: f64) -> f64 {
    let buffer = mean_pairwise_distance(points) * fraction;
    if buffer.is_finite() && buffer > 0.0 {
        info!(fraction, buffer, "Using relative label buffer");
        buffer
    } else {
        warn!(fraction, fallback, "Points have no spread, keeping absolute buffer");
        fallback
    }
}

/// Polls the schedule, rendering one frame per due run and rewriting the
/// animation after each new frame.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(schedule, output_dir), fields(output_dir = %output_dir.display()))]
async fn watch(
    url: &str,
    csv_name: &str,
    output_dir: &Path,
    schedule: &DailySchedule,
    max_frames: usize,
    fps: u32,
    poll_interval: u64,
    run_now: bool,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let client = BasicClient::new();
    let animation_path = output_dir.join("visualization_animation.gif");
    let mut frames: Vec<PathBuf> = Vec::new();

    let now = Local::now().naive_local();
    let mut next_due = if run_now { now } else { schedule.next_after(now) };
    if max_frames == 0 {
        info!(next_due = %next_due, "Watching indefinitely. Press Ctrl+C to stop.");
    } else {
        info!(next_due = %next_due, max_frames, "Watching catalogue");
    }

    loop {
        if max_frames > 0 && frames.len() >= max_frames {
            break;
        }

        let now = Local::now().naive_local();
        if now >= next_due {
            match render_frame(&client, url, csv_name, output_dir).await {
                Ok(frame) => {
                    frames.push(frame);
                    if let Err(e) = write_animation(&frames, &animation_path, fps) {
                        error!(error = %e, "Failed to write animation");
                    }
                }
                Err(e) => error!(error = %e, "Watch run failed"),
            }
            next_due = schedule.next_after(now);
            info!(next_due = %next_due, frames = frames.len(), "Next run scheduled");
            continue;
        }

        tokio::time::sleep(tokio::time::Duration::from_secs(poll_interval)).await;
    }

    info!(frames = frames.len(), animation = %animation_path.display(), "Finished watching");
    Ok(())
}

/// One watch run: download, extract, aggregate and render a timestamped frame.
#[tracing::instrument(skip(client, output_dir))]
async fn render_frame(
    client: &BasicClient,
    url: &str,
    csv_name: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let bytes = read_source(client, url).await?;
    let csv_path = extract_csv(&bytes, csv_name, output_dir)?;
    let analysis = Analysis::load(&csv_path, &CatalogueFilter::none())?;

    let stamp = Local::now();
    let stats = analysis.band(AttentionBand::Partial);
    let placer = LabelPlacer::new(PlacementConfig::default())?;
    let title = format!(
        "{} ({})",
        AttentionBand::Partial.title(),
        stamp.format("%Y-%m-%d %H:%M")
    );
    let chart = render_scatter(&stats, &placer, &Theme::default(), Some(&title));

    let frame = output_dir.join(format!("{}.png", stamp.format("%Y%m%d_%H%M%S")));
    write_png(&chart.svg, &frame)?;
    info!(frame = %frame.display(), organisations = stats.len(), "Frame rendered");
    Ok(frame)
}
