use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use formstamp::calibrate::{self, DEFAULT_GRID_STEP};
use formstamp::{Catalog, Error, FieldRenderer, Record, RenderOptions, TemplateDocument};

/// Environment variable naming the default catalog file.
const CATALOG_ENV: &str = "FORMSTAMP_CATALOG";

#[derive(Parser, Debug)]
#[command(version, about = "Stamp flat records onto fixed-layout PDF templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a template with one record
    Fill {
        template: PathBuf,
        /// JSON object of field name to value
        record: PathBuf,
        output: PathBuf,
        /// Catalog file; the built-in layout if neither this nor FORMSTAMP_CATALOG is set
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Directory relative image paths are resolved against
        #[arg(long)]
        image_root: Option<PathBuf>,
        /// Write the per-field report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Overlay a labelled coordinate grid for calibration
    Grid {
        template: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_GRID_STEP)]
        step: f32,
    },
    /// Draw test values with position markers
    Probe {
        template: PathBuf,
        output: PathBuf,
        /// NAME=VALUE, repeatable
        #[arg(long = "field", required = true, value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print page count and sizes
    Inspect { template: PathBuf },
    /// Print the catalog as JSON
    Catalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}

fn load_catalog(flag: Option<&Path>) -> Result<Catalog, Error> {
    let from_env = std::env::var_os(CATALOG_ENV).map(PathBuf::from);
    match flag.map(Path::to_path_buf).or(from_env) {
        Some(path) => Catalog::from_path(&path),
        None => Ok(formstamp::catalog::builtin()),
    }
}

fn run(command: Command) -> Result<(), Error> {
    match command {
        Command::Fill {
            template,
            record,
            output,
            catalog,
            image_root,
            report,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let record = Record::from_path(&record)?;
            let renderer = FieldRenderer::new(&catalog).with_options(RenderOptions {
                image_root,
                ..RenderOptions::default()
            });
            let result = formstamp::fill_template_with(&template, &record, renderer, &output)?;
            for (outcome, reason) in result.skipped().filter(|(_, r)| r.is_notable()) {
                println!("skipped {}: {reason}", outcome.field);
            }
            for (outcome, reason) in result.failed() {
                println!("failed {}: {reason}", outcome.field);
            }
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result).map_err(|e| Error::Io(e.into()))?;
                std::fs::write(&path, json).map_err(|source| Error::Write { path, source })?;
            }
            println!("{}", output.display());
        }
        Command::Grid {
            template,
            output,
            step,
        } => {
            let t0 = Instant::now();
            let mut doc = TemplateDocument::open(&template)?;
            calibrate::draw_grid(&mut doc, step)?;
            doc.save(&output)?;
            log::info!("Grid written in {:.1}ms", t0.elapsed().as_secs_f64() * 1000.0);
            println!("{}", output.display());
        }
        Command::Probe {
            template,
            output,
            fields,
            catalog,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let mut doc = TemplateDocument::open(&template)?;
            for (name, value) in &fields {
                let status = calibrate::probe_field(&mut doc, &catalog, name, value)?;
                println!("{name}: {status:?}");
            }
            doc.save(&output)?;
            println!("{}", output.display());
        }
        Command::Inspect { template } => {
            let doc = TemplateDocument::open(&template)?;
            let pages = calibrate::inspect(&doc)?;
            println!("{}: {} pages", template.display(), pages.len());
            for page in pages {
                println!("  page {}: {:.1} x {:.1} pt", page.index, page.width, page.height);
            }
        }
        Command::Catalog { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            println!("{}", catalog.to_json_string()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
