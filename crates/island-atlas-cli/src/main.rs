use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::ImageReader;
use island_atlas_core::config::{AtlasConfig, IslandMode};
use island_atlas_core::{CompileOutput, SourceAsset, compile_atlases, to_json, to_json_with_stats};
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "island-atlas",
    about = "Compile sprites into texture atlases",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a folder of sprites into atlases
    Compile(CompileArgs),
    /// Simple timing bench (compiles once, prints time + occupancy)
    Bench(CompileArgs),
}

#[derive(Parser, Debug, Clone)]
struct CompileArgs {
    // Input/Output
    /// Source folder to compile images from
    #[arg(help_heading = "Input/Output")]
    source_folder: PathBuf,
    /// Target folder to export atlases to
    #[arg(help_heading = "Input/Output")]
    target_folder: PathBuf,
    /// Target name template for each atlas (routing keys are inserted before the extension)
    #[arg(default_value = "atlas.png", help_heading = "Input/Output")]
    target_path: String,
    /// Only file names matching this regex are included (extension included)
    #[arg(short = 'r', long, default_value = r".*?\.(?:png)", help_heading = "Input/Output")]
    regex_restrict: String,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// YAML config file path (overrides island/routing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Process only the first N sources (in discovery order)
    #[arg(long, help_heading = "Input/Output")]
    limit: Option<usize>,

    // Routing
    /// File names (without extension) are grouped into atlases by the text this regex matches
    #[arg(short = 's', long, default_value = "", help_heading = "Routing")]
    regex_separate: String,

    // Islands
    /// Island crop mode: no_crop | crop_full | crop_largest | crop_many
    #[arg(long, default_value = "no_crop", help_heading = "Islands")]
    island_crop: String,
    /// Pixels with at least this alpha belong to an island
    #[arg(long, default_value_t = 16, help_heading = "Islands")]
    island_opacity: u8,
    /// Islands with fewer pixels than this are discarded
    #[arg(long, default_value_t = 1, help_heading = "Islands")]
    island_size: u32,
    /// Extract islands in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Islands")]
    parallel: bool,

    // Export
    /// Metadata file name (default: <target stem>.json)
    #[arg(long, help_heading = "Export")]
    metadata: Option<String>,
    /// Export per-atlas stats into the metadata document under "stats"
    #[arg(long, default_value_t = false, help_heading = "Export")]
    export_stats: bool,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compile and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Compile(args) => run_compile(args, cli.progress && !cli.quiet),
        Commands::Bench(args) => run_bench(args),
    }
}

fn build_config(cli: &CompileArgs) -> anyhow::Result<AtlasConfig> {
    let island_mode = parse_island_mode(&cli.island_crop)?;
    let base = AtlasConfig {
        island_mode,
        opacity_threshold: cli.island_opacity,
        min_island_area: cli.island_size,
        separate_pattern: cli.regex_separate.clone(),
        target_name: cli.target_path.clone(),
        limit: cli.limit,
        parallel: cli.parallel,
    };
    // Config file sets island/routing options en bloc
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_atlas_config(base)?
    } else {
        base
    };
    cfg.validate()?;
    Ok(cfg)
}

fn run_compile(cli: &CompileArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let paths = gather_paths(&cli.source_folder, &cli.regex_restrict, &cli.exclude)?;
    info!(count = paths.len(), "found images to compile");
    let sources = load_sources_with_progress(&paths, show_progress)?;
    info!(count = sources.len(), "loaded sources");

    // Nothing is written unless every source routed and packed.
    let out = compile_atlases(&sources, &cfg)?;
    log_stats(&out);
    if cli.dry_run {
        return Ok(());
    }

    fs::create_dir_all(&cli.target_folder)
        .with_context(|| format!("create target folder {}", cli.target_folder.display()))?;
    for atlas in &out.atlases {
        let png_path = cli.target_folder.join(atlas.name());
        if let Some(parent) = png_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        atlas
            .canvas()
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        let (w, h) = atlas.canvas().dimensions();
        info!(?png_path, w, h, entries = atlas.records().len(), "wrote atlas");
    }

    let json_path = cli
        .target_folder
        .join(metadata_name(&cli.target_path, cli.metadata.as_deref()));
    let doc = if cli.export_stats {
        to_json_with_stats(&out.atlases)
    } else {
        to_json(&out.atlases)
    };
    fs::write(&json_path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, atlases = out.atlases.len(), "metadata written");
    Ok(())
}

fn run_bench(cli: &CompileArgs) -> anyhow::Result<()> {
    use std::time::Instant;
    let cfg = build_config(cli)?;
    let paths = gather_paths(&cli.source_folder, &cli.regex_restrict, &cli.exclude)?;
    let sources = load_sources_with_progress(&paths, false)?;
    let start = Instant::now();
    let out = compile_atlases(&sources, &cfg)?;
    let dur = start.elapsed();
    let (used, total) = compute_stats(&out);
    let occ = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    println!(
        "atlases={} occupancy={:.2}% time={}",
        out.atlases.len(),
        occ,
        bench_fmt_dur(dur)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn parse_island_mode(s: &str) -> anyhow::Result<IslandMode> {
    s.parse::<IslandMode>()
        .map_err(|_| anyhow::anyhow!("unknown island crop mode: {}", s))
}

/// `<target stem>.json` unless overridden.
fn metadata_name(target_path: &str, explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    let stem = Path::new(target_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("atlas");
    format!("{}.json", stem)
}

fn gather_paths(path: &Path, restrict: &str, exclude: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let restrict =
        Regex::new(restrict).with_context(|| format!("invalid restrict pattern {}", restrict))?;
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, &restrict, exc_set.as_ref()) {
            list.push(path.to_path_buf());
        }
    } else {
        // Sorted walk keeps discovery order, and therefore the layout, stable.
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, &restrict, exc_set.as_ref()) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(p: &Path, restrict: &Regex, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    let file = p.file_name().and_then(|f| f.to_str()).unwrap_or("");
    !restrict.is_match(file)
}

fn load_sources_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<SourceAsset>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_source(p) {
            Ok(source) => list.push(source),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_source(p: &Path) -> anyhow::Result<SourceAsset> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    let name = p
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SourceAsset::new(name, p, img))
}

fn compute_stats(out: &CompileOutput) -> (u64, u64) {
    let mut used: u64 = 0;
    let mut total: u64 = 0;
    for atlas in &out.atlases {
        let s = atlas.stats();
        used += s.used_area;
        total += s.canvas_area;
    }
    (used, total)
}

fn log_stats(out: &CompileOutput) {
    let (used_area, total_area) = compute_stats(out);
    let occupancy = if total_area > 0 {
        used_area as f64 / total_area as f64
    } else {
        0.0
    };
    info!(
        atlases = out.atlases.len(),
        used_area,
        total_area,
        occupancy = format!("{:.2}%", occupancy * 100.0),
        "stats"
    );
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    island_mode: Option<String>,
    opacity_threshold: Option<u8>,
    min_island_area: Option<u32>,
    separate_pattern: Option<String>,
    target_name: Option<String>,
    limit: Option<usize>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_atlas_config(self, mut cfg: AtlasConfig) -> anyhow::Result<AtlasConfig> {
        if let Some(v) = self.island_mode {
            cfg.island_mode = parse_island_mode(&v)?;
        }
        if let Some(v) = self.opacity_threshold {
            cfg.opacity_threshold = v;
        }
        if let Some(v) = self.min_island_area {
            cfg.min_island_area = v;
        }
        if let Some(v) = self.separate_pattern {
            cfg.separate_pattern = v;
        }
        if let Some(v) = self.target_name {
            cfg.target_name = v;
        }
        if let Some(v) = self.limit {
            cfg.limit = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
