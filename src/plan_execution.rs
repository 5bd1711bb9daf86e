use std::path::Path;
use std::sync::mpsc::channel;

use anyhow::{anyhow, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use crate::data_loader::{self, Dataset};
use crate::plan::{ExportFileType, ExportProfileItem, Plan};
use crate::snapshot::Snapshot;

fn separator_for(file_path: &str) -> Result<u8> {
    let extension = Path::new(file_path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    match extension {
        "csv" => Ok(b','),
        "tsv" => Ok(b'\t'),
        _ => {
            error!("Error: unsupported extension {}", extension);
            anyhow::bail!("Unsupported extension");
        }
    }
}

/// Loads every import profile into one dataset, in profile order.
fn load_dataset(plan: &Plan, plan_file_path: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::default();

    for profile in &plan.import.profiles {
        let parent_dir = plan_file_path
            .parent()
            .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;
        let import_file_path = parent_dir.join(&profile.filename);
        info!("Importing transcripts: {}", import_file_path.display());

        let file_path_str = import_file_path.to_str().ok_or_else(|| {
            anyhow!(
                "Import file path contains invalid UTF-8: {}",
                import_file_path.display()
            )
        })?;
        let separator = separator_for(file_path_str)?;
        data_loader::append_transcripts(&mut dataset, file_path_str, separator)?;
    }

    info!("Dataset loaded with {} rows", dataset.len());
    Ok(dataset)
}

/// Renders one export profile and writes it out. Export failures are logged
/// and do not abort the remaining profiles.
fn export_report(dataset: &Dataset, snapshot: &Snapshot, profile: &ExportProfileItem) -> Result<()> {
    info!(
        "Starting export to file: {} using exporter {:?}",
        profile.filename, profile.exporter
    );

    let result = match &profile.exporter {
        ExportFileType::JSON => crate::export::to_json::render(dataset, snapshot),
        ExportFileType::CSVRows => crate::export::to_csv_rows::render(dataset, snapshot),
        ExportFileType::Text => crate::export::to_text::render(dataset, snapshot),
        ExportFileType::Custom(template_config) => {
            crate::export::to_custom::render(dataset, snapshot, template_config)
        }
    };

    match result {
        Ok(output) => {
            if let Err(e) = crate::common::write_string_to_file(&profile.filename, &output) {
                error!("Failed to write to file {}: {}", profile.filename, e);
            }
        }
        Err(e) => {
            error!("Failed to export file {}: {}", profile.filename, e);
        }
    }

    Ok(())
}

/// Executes a single report plan: load, snapshot once, export.
fn run_plan(plan: Plan, plan_file_path: &Path) -> Result<()> {
    let dataset = load_dataset(&plan, plan_file_path)?;
    let snapshot = Snapshot::build(&dataset);

    for profile in &plan.export.profiles {
        if let Err(e) = export_report(&dataset, &snapshot, profile) {
            error!("Failed to export report: {}", e);
        }
    }

    Ok(())
}

/// Main function to execute a plan, with optional file watching
pub fn execute_plan(plan: String, watch: bool) -> Result<()> {
    info!("Executing plan {}", plan);

    let plan_file_path = Path::new(&plan);
    let path_content = std::fs::read_to_string(plan_file_path)?;
    let plan: Plan = serde_yaml::from_str(&path_content)?;

    debug!("Executing plan: {:?}", plan);
    run_plan(plan.clone(), plan_file_path)?;

    if watch {
        watch_for_changes(plan, plan_file_path)?;
    }

    Ok(())
}

/// Sets up file watching for input files to re-run the plan on changes
fn watch_for_changes(plan: Plan, plan_file_path: &Path) -> Result<()> {
    info!("Watching for changes");
    let files: Vec<String> = plan
        .import
        .profiles
        .iter()
        .map(|profile| profile.filename.clone())
        .collect();

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    for file in &files {
        let parent_dir = plan_file_path
            .parent()
            .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;
        let path = parent_dir.join(file);
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if let Ok(event) = event {
                    if let EventKind::Modify(_) = event.kind {
                        debug!("File modified {:?}", event.paths);
                        info!("Change detected, re-executing plan");
                        run_plan(plan.clone(), plan_file_path)?;
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }
}
