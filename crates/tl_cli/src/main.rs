use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tl_common::{Dialect, SourceKind};
use tl_pipeline::{Options, Outcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tl", about = "typeless — strip type syntax, keep your formatting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip type syntax from one file and emit plain JavaScript.
    Strip {
        /// Input .ts/.tsx/.vue file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Treat the file as TSX regardless of extension.
        #[arg(long)]
        tsx: bool,
        /// Keep all imports, even ones erasure left unused.
        #[arg(long)]
        keep_imports: bool,
        /// Transform container script sections without a dialect marker.
        #[arg(long)]
        force: bool,
    },
    /// Strip every file matched by the given glob patterns.
    Batch {
        /// Glob patterns, e.g. "src/**/*.ts".
        patterns: Vec<String>,
        /// Directory to write results into (next to the input if omitted).
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        keep_imports: bool,
        #[arg(long)]
        force: bool,
    },
    /// Parse the file and report any syntax errors.
    Check {
        input: PathBuf,
        /// Dump the parsed module as JSON instead of just checking.
        #[arg(long)]
        ast: bool,
        #[arg(long)]
        tsx: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Strip {
            input,
            output,
            tsx,
            keep_imports,
            force,
        } => {
            let options = Options {
                keep_imports,
                force,
                ..Options::default()
            };
            let out = strip_file(&input, tsx, &options)?;
            match &output {
                Some(path) => {
                    std::fs::write(path, &out.text)
                        .with_context(|| format!("failed to write {}", path.display()))?
                }
                None => print!("{}", out.text),
            }
        }
        Commands::Batch {
            patterns,
            out_dir,
            keep_imports,
            force,
        } => {
            let options = Options {
                keep_imports,
                force,
                ..Options::default()
            };
            let failures = batch(&patterns, out_dir.as_deref(), &options)?;
            if failures > 0 {
                bail!("{failures} file(s) failed");
            }
        }
        Commands::Check { input, ast, tsx } => {
            let source = read_input(&input)?;
            let filename = input.display().to_string();
            let dialect = dialect_of(&input, tsx)?;
            let parsed = tl_parse::parse_module(&source, &filename, dialect)?;
            if ast {
                let json = serde_json::to_string_pretty(&parsed.module)?;
                println!("{json}");
            } else {
                eprintln!("OK: {filename}");
            }
        }
    }

    Ok(())
}

fn strip_file(input: &Path, tsx: bool, options: &Options) -> Result<tl_pipeline::Output> {
    let source = read_input(input)?;
    let filename = input.display().to_string();
    let kind = if tsx {
        SourceKind::Script(Dialect::tsx())
    } else {
        SourceKind::from_extension(&filename)?
    };
    Ok(tl_pipeline::process(&source, &filename, kind, options)?)
}

fn batch(patterns: &[String], out_dir: Option<&Path>, options: &Options) -> Result<usize> {
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut failures = 0usize;
    for pattern in patterns {
        for entry in glob::glob(pattern).with_context(|| format!("bad pattern {pattern:?}"))? {
            let path = entry?;
            match strip_file(&path, false, options) {
                Ok(out) => {
                    let dest = output_path(&path, out_dir);
                    // An in-place no-op write would only churn mtimes.
                    if out.outcome == Outcome::Skipped && dest == path {
                        info!(input = %path.display(), "skipped");
                        continue;
                    }
                    std::fs::write(&dest, &out.text)
                        .with_context(|| format!("failed to write {}", dest.display()))?;
                    info!(input = %path.display(), output = %dest.display(), "stripped");
                }
                Err(err) => {
                    warn!(input = %path.display(), %err, "skipping");
                    failures += 1;
                }
            }
        }
    }
    Ok(failures)
}

fn read_input(input: &Path) -> Result<String> {
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn dialect_of(input: &Path, tsx: bool) -> Result<Dialect> {
    if tsx {
        return Ok(Dialect::tsx());
    }
    match SourceKind::from_extension(&input.display().to_string())? {
        SourceKind::Script(dialect) => Ok(dialect),
        // Containers are parsed per-section; checking the whole file as a
        // script makes no sense, so default to the plain dialect.
        SourceKind::Container => Ok(Dialect::ts()),
    }
}

/// Map the input path to its output path: type-dialect extensions become
/// their plain counterparts, container files keep their extension.
fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mapped = match ext {
        "ts" => "js",
        "tsx" => "jsx",
        "mts" => "mjs",
        "cts" => "cjs",
        other => other,
    };
    let renamed = input.with_extension(mapped);
    match out_dir {
        Some(dir) => dir.join(renamed.file_name().unwrap_or_default()),
        None => renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_plain_counterparts() {
        assert_eq!(output_path(Path::new("a/b.ts"), None), PathBuf::from("a/b.js"));
        assert_eq!(output_path(Path::new("b.tsx"), None), PathBuf::from("b.jsx"));
        assert_eq!(output_path(Path::new("b.mts"), None), PathBuf::from("b.mjs"));
        assert_eq!(output_path(Path::new("b.cts"), None), PathBuf::from("b.cjs"));
        assert_eq!(output_path(Path::new("w.vue"), None), PathBuf::from("w.vue"));
    }

    #[test]
    fn out_dir_flattens_the_destination() {
        assert_eq!(
            output_path(Path::new("src/deep/b.ts"), Some(Path::new("dist"))),
            PathBuf::from("dist/b.js")
        );
    }
}
