use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{ensure, Result};
use hermine_detector::{
    certificate, is_supported_image_format, Analysis, Config, HermineDetector, RequestOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

fn main() -> Result<ExitCode> {
    let config = Config::new();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let image_paths = collect_image_paths(&config.inputs)?;
    ensure!(!image_paths.is_empty(), "No jpg, jpeg or png image found");

    let detector = HermineDetector::with_onnx_model(&config);
    let mut failures = 0;

    for path in &image_paths {
        let spinner = spinner(path)?;
        let outcome = detector.handle(path);
        spinner.finish_and_clear();

        match outcome {
            RequestOutcome::Certified(analysis) => {
                print_analysis(path, &analysis);
                if !config.no_certificate {
                    match certificate::save(&analysis.certified, &config.output_dir) {
                        Ok(saved) => println!("  certificate: {}", saved.display()),
                        Err(err) => {
                            failures += 1;
                            println!("  {}", err.user_message());
                        }
                    }
                }
            }
            RequestOutcome::Failed(err) => {
                failures += 1;
                println!("{}: {}", path.display(), err.user_message());
            }
        }
    }

    tracing::info!(
        "Processed {} image(s), {} failed",
        image_paths.len(),
        failures
    );
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Expand directories into the supported images they contain, keeping files as given.
fn collect_image_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut image_paths = Vec::new();
    for input in inputs {
        ensure!(input.exists(), "Input does not exist: {}", input.display());

        if input.is_dir() {
            let mut found = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_supported_image_format(e.path()))
                .map(|e| e.into_path())
                .collect::<Vec<_>>();
            tracing::debug!("{} image(s) found in {}", found.len(), input.display());
            image_paths.append(&mut found);
        } else {
            image_paths.push(input.clone());
        }
    }
    Ok(image_paths)
}

fn spinner(path: &Path) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Analysing {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn print_analysis(path: &Path, analysis: &Analysis) {
    let verdict = analysis.verdict();
    println!(
        "{}: {} ({}, confidence {})",
        path.display(),
        verdict.headline(),
        verdict.label(),
        analysis.confidence_percent()
    );
}
