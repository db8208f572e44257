use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use declsynth_contracts::MANIFEST_SCHEMA_VERSION;
use declsynth_core::diagnostics::render_diagnostics_md;
use declsynth_core::source::{expand_source, SourceExpansion};

#[derive(Parser, Debug)]
#[command(name = "declsynth")]
#[command(about = "Expand declsynth directives in Rust sources.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand every directive in one Rust file.
    Expand {
        #[arg(long)]
        r#in: PathBuf,
        /// Output file; prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        /// If set, fail if output differs; do not write.
        #[arg(long, default_value_t = false, requires = "out")]
        check: bool,
        /// Write the diagnostics report (JSON) here.
        #[arg(long)]
        report_json: Option<PathBuf>,
    },
    /// Expand multiple files from a manifest.
    Batch {
        #[arg(long)]
        manifest: PathBuf,
        /// If set, fail if any output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Print the diagnostics catalog (markdown).
    Diagnostics,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    try_main().map_err(|err| {
        eprintln!("{err:#}");
        err
    })
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Expand {
            r#in,
            out,
            check,
            report_json,
        } => run_expand(&r#in, out.as_deref(), check, report_json.as_deref()),
        Command::Batch { manifest, check } => run_batch(&manifest, check),
        Command::Diagnostics => {
            print!("{}", render_diagnostics_md());
            Ok(())
        }
    }
}

fn run_expand(
    src_path: &Path,
    out_path: Option<&Path>,
    check: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let src = std::fs::read_to_string(src_path)
        .with_context(|| format!("read Rust source: {}", src_path.display()))?;
    let expansion = expand_source(&src)
        .with_context(|| format!("expand Rust source: {}", src_path.display()))?;

    if let Some(report_path) = report_path {
        write_report(src_path, &expansion, report_path)?;
    }

    if !expansion.is_ok() {
        for diag in &expansion.diagnostics {
            eprintln!(
                "{}:{}:{}: {} {}",
                src_path.display(),
                diag.location.line,
                diag.location.column,
                diag.kind.code_str(),
                diag.message
            );
        }
        anyhow::bail!(
            "{} diagnostic(s) in {}",
            expansion.diagnostics.len(),
            src_path.display()
        );
    }

    tracing::info!(source = %src_path.display(), "expanded");
    let rendered = expansion.render();
    match out_path {
        Some(out_path) => write_output(out_path, &rendered, check),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

fn write_report(src_path: &Path, expansion: &SourceExpansion, report_path: &Path) -> Result<()> {
    let report = expansion
        .report()
        .with_source_path(src_path.to_string_lossy());
    let mut bytes = serde_json::to_vec_pretty(&report).context("encode diagnostics report")?;
    bytes.push(b'\n');
    std::fs::write(report_path, bytes)
        .with_context(|| format!("write report: {}", report_path.display()))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    schema_version: String,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct ManifestEntry {
    source: String,
    out: String,
}

fn run_batch(manifest_path: &Path, check: bool) -> Result<()> {
    let bytes = std::fs::read(manifest_path)
        .with_context(|| format!("read manifest: {}", manifest_path.display()))?;
    let m: Manifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest JSON: {}", manifest_path.display()))?;
    if m.schema_version.trim() != MANIFEST_SCHEMA_VERSION {
        anyhow::bail!(
            "manifest schema_version mismatch: expected {MANIFEST_SCHEMA_VERSION} got {:?}",
            m.schema_version
        );
    }

    // Relative paths in the manifest are resolved against its directory.
    let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    for (idx, e) in m.entries.iter().enumerate() {
        let src_path = base.join(&e.source);
        let out_path = base.join(&e.out);
        run_expand(&src_path, Some(&out_path), check, None)
            .with_context(|| format!("manifest entry[{idx}] {}", e.source))?;
    }
    tracing::info!(entries = m.entries.len(), check, "batch complete");
    Ok(())
}

fn write_output(out_path: &Path, src: &str, check: bool) -> Result<()> {
    if check {
        let cur = std::fs::read_to_string(out_path)
            .with_context(|| format!("read existing output: {}", out_path.display()))?;
        if cur != src {
            anyhow::bail!("generated output differs: {}", out_path.display());
        }
        return Ok(());
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(out_path, src.as_bytes())
        .with_context(|| format!("write output: {}", out_path.display()))?;
    Ok(())
}
