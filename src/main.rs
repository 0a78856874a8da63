use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pulsegrid::aggregate::{aggregate_by_day, aggregate_by_dimension};
use pulsegrid::classify::{Category, Scale};
use pulsegrid::record::{load_records, parse_day, Decoded};
use pulsegrid::report::{self, NamedSeries, Report};
use pulsegrid::{
    CategoryMatrix, DashboardConfig, Densifier, Error, GapPolicy, MetricRecord,
    SelectionCoordinator, ViewType,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "pulsegrid")]
#[command(author, version, about = "Turn sparse daily metrics into calendar-aligned chart data")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Dashboard config file (.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug diagnostics (collisions, dropped rows)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Densify each input file into a gapless daily series
    Densify {
        /// JSON file, or directory searched for *.json
        path: PathBuf,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last day of the window (default: today)
        #[arg(long)]
        end: Option<String>,

        /// Gap policy: null (scores) or zero (counts)
        #[arg(long, default_value = "null")]
        gap: String,

        /// Scale used to color days: grade, sentiment or none
        #[arg(long, default_value = "none")]
        scale: String,

        /// Count rows per day instead of reading their values
        #[arg(long)]
        count: bool,

        /// Output report file (.html, .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Record key to highlight in the report
        #[arg(long)]
        highlight: Option<String>,

        /// View the series belong to (sentiment, peerFeedback, workProduct, prompts, videoDemo)
        #[arg(long)]
        view: Option<String>,

        /// Number of parallel workers (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Don't open the HTML report
        #[arg(long)]
        no_open: bool,
    },

    /// Count records per category, grouped by day or by dimension
    Aggregate {
        /// JSON file, or directory searched for *.json
        path: PathBuf,

        /// Row dimension
        #[arg(long, value_enum, default_value = "dimension")]
        by: GroupBy,

        /// Scale: grade or sentiment
        #[arg(long, default_value = "grade")]
        scale: String,

        /// Output report file (.html, .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a single score ("null" for a missing one)
    Classify {
        value: String,

        /// Scale: grade or sentiment
        #[arg(long, default_value = "grade")]
        scale: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GroupBy {
    Day,
    Dimension,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => DashboardConfig::default(),
    };

    let code = match args.command {
        Command::Densify {
            ref path,
            ref start,
            ref end,
            ref gap,
            ref scale,
            count,
            ref output,
            ref highlight,
            ref view,
            jobs,
            no_open,
        } => {
            let opts = DensifyOpts {
                path,
                start: start.as_deref(),
                end: end.as_deref(),
                gap,
                scale,
                count,
                output: output.as_deref(),
                highlight: highlight.as_deref(),
                view: view.as_deref(),
                jobs,
                no_open,
            };
            run_densify(&opts, &config, args.quiet)
        }
        Command::Aggregate { ref path, by, ref scale, ref output } => {
            run_aggregate(path, by, scale, output.as_deref(), &config, args.quiet)
        }
        Command::Classify { ref value, ref scale } => run_classify(value, scale, &config),
    };

    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => fail(e),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pulsegrid=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(e: Error) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

struct DensifyOpts<'a> {
    path: &'a Path,
    start: Option<&'a str>,
    end: Option<&'a str>,
    gap: &'a str,
    scale: &'a str,
    count: bool,
    output: Option<&'a Path>,
    highlight: Option<&'a str>,
    view: Option<&'a str>,
    jobs: Option<usize>,
    no_open: bool,
}

fn run_densify(
    opts: &DensifyOpts,
    config: &DashboardConfig,
    quiet: bool,
) -> pulsegrid::Result<i32> {
    let gap = GapPolicy::from_str(opts.gap)?;
    let scale = parse_scale(opts.scale)?;
    let view = match opts.view {
        Some(v) => ViewType::from_str(v)?,
        None => default_view(scale, opts.count),
    };
    let (start, end) = window(opts.start, opts.end, config.default_window_days)?;

    if let Some(jobs) = opts.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = collect_inputs(opts.path);
    if files.is_empty() {
        eprintln!("No JSON files found in {}", opts.path.display());
        return Ok(1);
    }

    if !quiet {
        eprintln!("\x1b[1mPulsegrid - Daily Series\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Window {} to {}, {} input file(s)\n", start, end, files.len());
    }

    let classifier = config.classifier();
    let densifier = Densifier::new(start, end)
        .with_gap_policy(gap)
        .with_scale(scale)
        .with_classifier(classifier.clone());

    let loaded = load_all(&files, quiet);
    let mut failed = 0usize;
    let mut report = Report::new(start, end);

    for (file, decoded) in loaded {
        let name = series_name(&file);
        let decoded = match decoded {
            Ok(d) => d,
            Err(e) => {
                eprintln!("\x1b[31m✗ {}:\x1b[0m {}", file.display(), e);
                failed += 1;
                continue;
            }
        };

        let records = if opts.count {
            pulsegrid::densify::count_by_day(&decoded.records)
        } else {
            decoded.records
        };
        let series = densifier.densify(&records);

        if !quiet {
            println!(
                "{:<30} {:>4}/{:<4} days  {:>4} malformed",
                truncate(&name, 30),
                series.populated(),
                series.len(),
                decoded.malformed
            );
        }
        report = report.with_series(NamedSeries::new(name, view, scale, series, &classifier));
    }

    let mut selection = SelectionCoordinator::new(config.style.clone());
    if let Some(key) = opts.highlight {
        let found = report.series.iter().any(|s| s.series.index_of_key(key).is_some());
        if !found {
            tracing::warn!(key, "highlight key does not occur in any series");
        }
        selection.report_click(Some(key), view);
    }
    let report = report.with_selection(selection);

    if !quiet {
        print_summary(&report);
    }

    let output = opts
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| auto_report_path("html"));
    report::generate(&output, &report)?;
    if !quiet {
        eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output.display());
    }
    if !opts.no_open && !quiet && is_html(&output) {
        if let Err(e) = open::that(&output) {
            eprintln!("Failed to open report: {}", e);
        }
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

fn run_aggregate(
    path: &Path,
    by: GroupBy,
    scale: &str,
    output: Option<&Path>,
    config: &DashboardConfig,
    quiet: bool,
) -> pulsegrid::Result<i32> {
    let scale = parse_scale(scale)?.ok_or_else(|| Error::UnknownScale("none".to_string()))?;

    let files = collect_inputs(path);
    if files.is_empty() {
        eprintln!("No JSON files found in {}", path.display());
        return Ok(1);
    }

    let mut records: Vec<MetricRecord> = Vec::new();
    let mut failed = 0usize;
    for (file, decoded) in load_all(&files, quiet) {
        match decoded {
            Ok(d) => records.extend(d.records),
            Err(e) => {
                eprintln!("\x1b[31m✗ {}:\x1b[0m {}", file.display(), e);
                failed += 1;
            }
        }
    }

    let classifier = config.classifier();
    let (name, matrix) = match by {
        GroupBy::Day => ("by day", aggregate_by_day(&records, scale, &classifier)),
        GroupBy::Dimension => (
            "by dimension",
            aggregate_by_dimension(&records, scale, &classifier),
        ),
    };

    print_matrix(&matrix);

    if let Some(output) = output {
        let today = Local::now().date_naive();
        let start = records.iter().map(|r| r.date).min().unwrap_or(today);
        let end = records.iter().map(|r| r.date).max().unwrap_or(today);
        let report = Report::new(start, end).with_matrix(format!("{} {}", scale, name), matrix);
        report::generate(output, &report)?;
        if !quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output.display());
        }
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

fn run_classify(value: &str, scale: &str, config: &DashboardConfig) -> pulsegrid::Result<i32> {
    let scale = parse_scale(scale)?.ok_or_else(|| Error::UnknownScale("none".to_string()))?;
    let value = match value.trim() {
        "" | "null" | "none" => None,
        v => match v.parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => {
                eprintln!("Not a number: {}", v);
                return Ok(1);
            }
        },
    };

    let category = config.classifier().classify(value, scale);
    println!("{}\t{}", category, pulsegrid::classify_to_color(category));
    Ok(0)
}

/// `none` turns classification off
fn parse_scale(name: &str) -> pulsegrid::Result<Option<Scale>> {
    if name.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Scale::from_str(name).map(Some)
}

fn default_view(scale: Option<Scale>, count: bool) -> ViewType {
    match scale {
        _ if count => ViewType::Prompts,
        Some(Scale::Sentiment) => ViewType::Sentiment,
        Some(Scale::LetterGrade) => ViewType::WorkProduct,
        None => ViewType::Prompts,
    }
}

/// Inclusive window. Missing ends default to the last `days` days ending
/// today.
fn window(
    start: Option<&str>,
    end: Option<&str>,
    days: u32,
) -> pulsegrid::Result<(NaiveDate, NaiveDate)> {
    let end = match end {
        Some(e) => parse_day(e)?,
        None => Local::now().date_naive(),
    };
    let start = match start {
        Some(s) => parse_day(s)?,
        None => end
            .checked_sub_signed(Duration::days(i64::from(days.saturating_sub(1))))
            .ok_or(Error::WindowOutOfRange { end, days })?,
    };
    Ok((start, end))
}

fn collect_inputs(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Decode every file in parallel, keeping input order
fn load_all(files: &[PathBuf], quiet: bool) -> Vec<(PathBuf, pulsegrid::Result<Decoded>)> {
    let pb = if !quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let loaded = files
        .par_iter()
        .map(|path| {
            let decoded = load_records(path);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(series_name(path));
            }
            (path.clone(), decoded)
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    loaded
}

fn print_summary(report: &Report) {
    let summary = report.summary();
    eprintln!("\n{}", "─".repeat(70));
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  Series:      {}", summary.series);
    eprintln!("  \x1b[32m✓ With data:\x1b[0m {}", summary.populated);
    eprintln!("  \x1b[90m· Gaps:\x1b[0m      {}", summary.gaps);
    for (label, n) in &summary.tiers {
        eprintln!("    {:<22} {}", label, n);
    }
}

fn print_matrix(matrix: &CategoryMatrix) {
    if matrix.is_empty() {
        println!("No classifiable records.");
        return;
    }
    let header: Vec<String> = matrix
        .categories
        .iter()
        .map(|c: &Category| format!("{:>6}", short_label(c)))
        .collect();
    println!("{:<30} {}  {:>6}", "", header.join(" "), "TOTAL");
    println!("{}", "-".repeat(40 + 7 * matrix.categories.len()));
    for (r, label) in matrix.row_labels.iter().enumerate() {
        let cells: Vec<String> = matrix.counts[r].iter().map(|n| format!("{:>6}", n)).collect();
        println!("{:<30} {}  {:>6}", truncate(label, 30), cells.join(" "), matrix.row_total(r));
    }
}

fn short_label(category: &Category) -> String {
    match category {
        Category::Grade(pulsegrid::GradeTier::AccessError) => "ERR".to_string(),
        c => truncate(c.label(), 6),
    }
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn auto_report_path(ext: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("pulsegrid_report_{}.{}", timestamp, ext))
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
