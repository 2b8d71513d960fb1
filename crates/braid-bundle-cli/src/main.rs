//! Braid Bundle CLI - drive the bundler from the command line

mod config;
mod walk;

use anyhow::{bail, Context, Result};
use braid_bundle_minify::MinifyOptions;
use braid_bundle_obfuscate::ObfuscateOptions;
use braid_bundle_pipeline::{Pipeline, PipelineOptions, Step};
use clap::{Parser, Subcommand};
use config::BuildConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "braid")]
#[command(about = "Braid Bundler - one artifact from a tree of ES modules", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle an ES-module tree into a single file
    Bundle {
        /// Entry module id, e.g. ./index.js
        entry: Option<String>,

        /// Source directory to walk for modules
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop unreachable modules before bundling
        #[arg(long)]
        tree_shake: bool,

        /// Minify the bundle
        #[arg(short, long)]
        minify: bool,

        /// Keep comments when minifying
        #[arg(long)]
        keep_comments: bool,

        /// Obfuscate the bundle
        #[arg(long)]
        obfuscate: bool,

        /// Rename identifiers while obfuscating
        #[arg(long)]
        rename_identifiers: bool,

        /// Skip string encoding while obfuscating
        #[arg(long)]
        no_encode_strings: bool,

        /// Build config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Bundle {
            entry,
            root,
            output,
            tree_shake,
            minify,
            keep_comments,
            obfuscate,
            rename_identifiers,
            no_encode_strings,
            config,
            verbose,
        } => {
            let file = match config {
                Some(path) => BuildConfig::load(&path)?,
                None => BuildConfig::default(),
            };

            let entry = entry
                .or(file.entry)
                .context("no entry module; pass one or set `entry` in the config")?;
            let root = root.or(file.root).unwrap_or_else(|| PathBuf::from("."));
            let output = output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from("dist/bundle.js"));

            let mut steps = Vec::new();
            if tree_shake || file.tree_shake.unwrap_or(false) {
                steps.push(Step::TreeShake);
            }
            steps.push(Step::Bundle);
            if minify || file.minify.unwrap_or(false) {
                steps.push(Step::Minify);
            }
            if obfuscate || file.obfuscate.unwrap_or(false) {
                steps.push(Step::Obfuscate);
            }

            let options = PipelineOptions {
                minify: MinifyOptions {
                    keep_comments: keep_comments || file.keep_comments.unwrap_or(false),
                },
                obfuscate: ObfuscateOptions {
                    encode_strings: !no_encode_strings && file.encode_strings.unwrap_or(true),
                    rename_identifiers: rename_identifiers
                        || file.rename_identifiers.unwrap_or(false),
                    flatten_ifs: false,
                },
            };

            bundle_command(entry, root, output, steps, options, verbose)
        }
    }
}

fn bundle_command(
    entry: String,
    root: PathBuf,
    output: PathBuf,
    steps: Vec<Step>,
    options: PipelineOptions,
    verbose: bool,
) -> Result<()> {
    let total_start = Instant::now();

    println!("📦 Braid Bundler");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let walk_start = Instant::now();
    let modules = walk::collect_modules(&root)?;
    let walk_time = walk_start.elapsed();

    if modules.is_empty() {
        bail!("no modules found under {}", root.display());
    }
    if !modules.contains(&entry) {
        tracing::warn!("entry {entry} does not match any walked module");
    }
    if verbose {
        println!(
            "🔍 Loaded {} modules in {:.2}ms",
            modules.len(),
            walk_time.as_secs_f64() * 1000.0
        );
    }

    let pipeline = Pipeline {
        steps,
        entry: entry.clone(),
        options,
    };
    let run_start = Instant::now();
    let result = braid_bundle_pipeline::run(&pipeline, modules)?;
    let run_time = run_start.elapsed();

    for diagnostic in &result.diagnostics {
        tracing::warn!("{diagnostic}");
    }

    let Some(code) = result.artifact.as_code() else {
        bail!("pipeline finished without producing code");
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&output, code)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let total_time = total_start.elapsed();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Bundle complete!");
    println!("   ├─ Output:     {}", output.display());
    println!("   ├─ Size:       {} KB", code.len() / 1024);
    println!("   ├─ Entry:      {entry}");
    println!("   └─ Time:       {:.2}ms", total_time.as_secs_f64() * 1000.0);
    if verbose {
        println!("\n   Breakdown:");
        println!("   ├─ Walk:       {:.2}ms", walk_time.as_secs_f64() * 1000.0);
        println!("   └─ Pipeline:   {:.2}ms", run_time.as_secs_f64() * 1000.0);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}
