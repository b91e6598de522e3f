//! CLI and batch driver: resolve inputs, fan out with rayon, report a
//! colored per-file status line, and keep going after one file fails.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;

use crate::model::{Config, Protocol};
use crate::parse::comment::DEFAULT_INVALID_MARKER;
use crate::parse::{parse_source, ParseContext};
use crate::source::{FileSource, Source};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Go enum wrapper types from iota const blocks
#[derive(Parser, Debug)]
#[command(name = "enumgen", version)]
pub struct CommandLineInterface {
    /// One or more .go files. May be literal paths or quoted glob patterns
    #[arg(num_args = 1.., required = true)]
    input: Vec<String>,

    /// generated Parse* returns an error when nothing matches
    #[arg(short, long)]
    failfast: bool,

    /// emit slice-based iteration instead of iter.Seq
    #[arg(short, long)]
    legacy: bool,

    /// case-insensitive string matching in generated code
    #[arg(short, long)]
    insensitive: bool,

    /// import the constraints package instead of inlining the numeric constraint
    #[arg(short, long)]
    constraints: bool,

    /// serialization protocols to emit hooks for
    #[arg(short, long, value_enum, value_delimiter = ',',
          default_values_t = vec![Protocol::Json, Protocol::Text])]
    protocols: Vec<Protocol>,

    /// marker token that flags a member comment as the invalid sentinel
    #[arg(long, default_value = DEFAULT_INVALID_MARKER)]
    marker: String,

    /// print generated source to stdout instead of writing files
    #[arg(long)]
    stdout: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> ExitCode {
        let source_paths = match resolve_file_path_patterns(&self.input) {
            Ok(paths) => paths,
            Err(error) => {
                eprintln!("{} {error:#}", "error:".red().bold());
                return ExitCode::FAILURE;
            }
        };

        let config = self.config();
        let ctx = ParseContext { marker: self.marker.clone(), ..Default::default() };

        let results: Vec<(PathBuf, anyhow::Result<usize>)> = source_paths
            .par_iter()
            .map(|path| (path.clone(), self.process_file(path, &config, &ctx)))
            .collect();

        let mut failures = 0usize;
        for (path, result) in &results {
            match result {
                Ok(count) => {
                    println!("{} {} ({count} enums)", "ok".green().bold(), path.display());
                }
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {error:#}", "FAIL".red().bold(), path.display());
                }
            }
        }

        if failures > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }

    fn config(&self) -> Config {
        Config {
            failfast: self.failfast,
            legacy: self.legacy,
            insensitive: self.insensitive,
            constraints: self.constraints,
            protocols: self.protocols.clone(),
        }
    }

    /// Parse one file and write (or print) every generated enum file.
    /// Returns the number of groups generated.
    fn process_file(
        &self,
        path: &Path,
        config: &Config,
        ctx: &ParseContext,
    ) -> anyhow::Result<usize> {
        let source = FileSource::new(path);
        let extraction = parse_source(&source, ctx)?;
        let requests = crate::request::assemble(&extraction, config, source.filename());
        let count = requests.len();
        for request in requests {
            let mut cg = crate::codegen::Codegen::new();
            cg.emit(&request);
            let generated = cg.into_string();
            if self.stdout {
                println!("{generated}");
            } else {
                std::fs::write(&request.output_filename, generated)
                    .with_context(|| format!("failed to write {}", request.output_filename))?;
            }
        }
        Ok(count)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)
                .with_context(|| format!("bad glob pattern: {pattern}"))?
            {
                let path = entry.with_context(|| format!("glob walk failed: {pattern}"))?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
