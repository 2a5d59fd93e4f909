use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tex_atlas_core::prelude::*;
use tex_atlas_core::to_json_manifest;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "tex-atlas",
    about = "Merge compatible textures into shared atlases",
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
    /// Build atlases and write their PNGs plus a JSON manifest
    Pack(PackArgs),
    /// Print which atlas every input would land in; writes nothing
    Plan(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name for outputs (name_0.png, name_1.png, ..., name.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file (limits and per-pattern sampler rules)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Limits
    /// Max atlas width
    #[arg(long, default_value_t = 4096, help_heading = "Limits")]
    max_width: u32,
    /// Max atlas height
    #[arg(long, default_value_t = 4096, help_heading = "Limits")]
    max_height: u32,
    /// Bleed margin around each member on non-repeating axes
    #[arg(long, default_value_t = 8, help_heading = "Limits")]
    margin: u32,

    // Sampler defaults (for files no rule matches)
    /// Wrap mode on U: clamp|clamp_to_edge|clamp_to_border|repeat|mirrored_repeat
    #[arg(long, default_value = "clamp_to_edge", help_heading = "Sampler")]
    wrap_u: String,
    /// Wrap mode on V
    #[arg(long, default_value = "clamp_to_edge", help_heading = "Sampler")]
    wrap_v: String,
    /// Minification filter: nearest|linear|linear_mipmap_linear|...
    #[arg(long, default_value = "linear", help_heading = "Sampler")]
    min_filter: String,
    /// Magnification filter: nearest|linear
    #[arg(long, default_value = "linear", help_heading = "Sampler")]
    mag_filter: String,

    // Export
    /// Export build stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: build and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

/// Optional YAML file. Limits override the CLI flags; sampler rules are
/// tried in order and the first matching pattern wins.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct YamlConfig {
    max_width: Option<u32>,
    max_height: Option<u32>,
    margin: Option<u32>,
    samplers: Vec<SamplerRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct SamplerRule {
    pattern: String,
    #[serde(flatten)]
    sampler: SamplerDesc,
}

#[derive(Debug, Serialize)]
struct MergedConfig {
    atlas: AtlasConfig,
    default_sampler: SamplerDesc,
    samplers: Vec<SamplerRule>,
}

struct SamplerRules {
    rules: Vec<(GlobMatcher, SamplerDesc)>,
    fallback: SamplerDesc,
}

impl SamplerRules {
    fn compile(rules: &[SamplerRule], fallback: SamplerDesc) -> anyhow::Result<Self> {
        let rules = rules
            .iter()
            .map(|r| {
                let glob = Glob::new(&r.pattern)
                    .with_context(|| format!("bad sampler pattern {:?}", r.pattern))?;
                Ok((glob.compile_matcher(), r.sampler))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules, fallback })
    }

    fn sampler_for(&self, key: &str) -> SamplerDesc {
        self.rules
            .iter()
            .find(|(m, _)| m.is_match(key))
            .map(|(_, s)| *s)
            .unwrap_or(self.fallback)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Pack(args) => run_pack(args, show_progress, false),
        Commands::Plan(args) => {
            let mut a = args.clone();
            a.dry_run = true;
            run_pack(&a, show_progress, true)
        }
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool, plan: bool) -> anyhow::Result<()> {
    let yaml = match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_yaml::from_str::<YamlConfig>(&file)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => YamlConfig::default(),
    };
    let cfg = AtlasConfig::builder()
        .with_max_dimensions(
            yaml.max_width.unwrap_or(cli.max_width),
            yaml.max_height.unwrap_or(cli.max_height),
        )
        .margin(yaml.margin.unwrap_or(cli.margin))
        .build();
    let default_sampler = default_sampler(cli)?;

    if cli.print_config {
        let merged = MergedConfig {
            atlas: cfg,
            default_sampler,
            samplers: yaml.samplers,
        };
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&merged)?),
            _ => println!("{}", serde_json::to_string_pretty(&merged)?),
        }
        return Ok(());
    }

    let rules = SamplerRules::compile(&yaml.samplers, default_sampler)?;
    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let mut builder = AtlasBuilder::new(cfg).context("invalid atlas configuration")?;
    let candidates = load_candidates_with_progress(&cli.input, &paths, &rules, show_progress);
    let added = builder.add_all(candidates);
    info!(count = added, "loaded input images");

    let start = Instant::now();
    builder.build()?;
    let stats = builder.stats();
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "{}", stats.summary());

    if plan {
        print_plan(&builder);
    }

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        let mut manifest = to_json_manifest(&builder);
        for atlas in builder.atlases() {
            let Some(img) = atlas.image() else { continue };
            let file = format!("{}_{}.png", cli.name, atlas.id().0);
            let path = cli.out_dir.join(&file);
            img.to_dynamic_image()?
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            if let Some(entry) = manifest["atlases"].get_mut(atlas.id().0) {
                entry["image"] = serde_json::Value::String(file);
            }
            info!(?path, w = atlas.width(), h = atlas.height(), "atlas written");
        }
        let path = cli.out_dir.join(format!("{}.json", cli.name));
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, "manifest written");
    }

    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!(
                "atlases={} atlased={}/{} occupancy={:.2}% waste={:.2}%",
                stats.num_atlases,
                stats.num_atlased,
                stats.num_candidates,
                stats.occupancy * 100.0,
                stats.waste_percentage()
            );
        }
    }
    Ok(())
}

fn default_sampler(cli: &PackArgs) -> anyhow::Result<SamplerDesc> {
    let wrap = |s: &str| {
        s.parse::<WrapMode>()
            .map_err(|_| anyhow::anyhow!("unknown wrap mode: {}", s))
    };
    let filter = |s: &str| {
        s.parse::<FilterMode>()
            .map_err(|_| anyhow::anyhow!("unknown filter: {}", s))
    };
    Ok(SamplerDesc::default()
        .with_wrap(wrap(cli.wrap_u.as_str())?, wrap(cli.wrap_v.as_str())?)
        .with_filters(filter(cli.min_filter.as_str())?, filter(cli.mag_filter.as_str())?))
}

fn print_plan<S: DiagnosticSink<String>>(builder: &AtlasBuilder<String, S>) {
    for atlas in builder.atlases() {
        println!(
            "atlas {} ({}x{}, {} members)",
            atlas.id().0,
            atlas.width(),
            atlas.height(),
            atlas.members().len()
        );
        for &m in atlas.members() {
            let Some(c) = builder.candidates().get(m) else { continue };
            if let Some(p) = c.placement() {
                println!("  {} @ {},{}", c.key, p.x, p.y);
            }
        }
    }
    for (_, c) in builder.candidates().iter() {
        if c.placement().is_none() {
            println!("unplaced {}", c.key);
        }
    }
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Candidate key: path relative to the input root, forward slashes.
fn candidate_key(root: &Path, p: &Path) -> String {
    let rel = p.strip_prefix(root).ok().filter(|r| !r.as_os_str().is_empty());
    rel.unwrap_or(p).to_string_lossy().replace('\\', "/")
}

fn load_candidates_with_progress(
    root: &Path,
    paths: &[PathBuf],
    rules: &SamplerRules,
    progress: bool,
) -> Vec<Candidate<String>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = progress.then(|| {
        let b = ProgressBar::new(paths.len() as u64);
        match ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ) {
            Ok(style) => b.set_style(style),
            Err(e) => warn!(error = %e, "progress template rejected"),
        }
        b
    });
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        if let Some(b) = &bar {
            let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
        }
        let key = candidate_key(root, p);
        match load_image(p).and_then(|img| Ok(PixelBuffer::from_dynamic_image(&img)?)) {
            Ok(pixels) => {
                let sampler = rules.sampler_for(&key);
                list.push(Candidate::new(key, pixels, Some(sampler)));
            }
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
    list
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
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
