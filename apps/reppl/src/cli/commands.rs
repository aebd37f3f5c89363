//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Completion;
use crate::config::Config;
use crate::eval::{EvalOutcome, EvalRequest, evaluate};
use crate::executor::SubprocessExecutor;
use crate::store::{init_project, load_project, save_project};
use reppl_core::{ReppError, Ware};
use std::path::{Path, PathBuf};

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty project file.
pub fn cmd_init(project_path: &Path, force: bool) -> Result<Completion, ReppError> {
    init_project(project_path, force)?;
    println!("Initialized empty reppl project at {:?}", project_path);
    Ok(Completion::Done)
}

// =============================================================================
// PUT COMMAND
// =============================================================================

/// Bind a tag to a literal hash and remember where the ware can be found.
pub fn cmd_put_hash(
    project_path: &Path,
    tag: &str,
    hash: &str,
    kind: &str,
    warehouses: &[String],
) -> Result<Completion, ReppError> {
    let mut project = load_project(project_path)?;
    let ware = Ware::new(kind, hash);

    project.bind_manual(tag, ware.clone())?;
    project.append_warehouses(&ware, warehouses);
    save_project(&project, project_path)?;

    tracing::info!(tag, ware = %ware, "tag bound");
    println!("{} = {}", tag, ware);
    Ok(Completion::Done)
}

// =============================================================================
// UNSET COMMAND
// =============================================================================

/// Remove a tag.
pub fn cmd_unset(project_path: &Path, tag: &str) -> Result<Completion, ReppError> {
    let mut project = load_project(project_path)?;

    if !project.remove_tag(tag)? {
        println!("Tag {:?} not found", tag);
        return Ok(Completion::Done);
    }
    save_project(&project, project_path)?;

    println!("Removed tag {:?}", tag);
    Ok(Completion::Done)
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show tags and store counts.
pub fn cmd_show(project_path: &Path, json_mode: bool) -> Result<Completion, ReppError> {
    let project = load_project(project_path)?;

    if json_mode {
        let tags: serde_json::Map<String, serde_json::Value> = project
            .tags()
            .iter()
            .map(|(tag, release)| {
                (
                    tag.clone(),
                    serde_json::json!({
                        "type": release.ware.kind,
                        "hash": release.ware.hash,
                        "run_record": release.run_record_hid,
                    }),
                )
            })
            .collect();
        let output = serde_json::json!({
            "project": project_path.to_string_lossy(),
            "tags": tags,
            "run_records": project.run_records().len(),
            "memos": project.memos().len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output)
                .map_err(|e| ReppError::Encode(e.to_string()))?
        );
        return Ok(Completion::Done);
    }

    println!("reppl Project Status");
    println!("====================");
    println!("Project:     {:?}", project_path);
    println!();
    println!("Tags:        {}", project.tags().len());
    println!("Run Records: {}", project.run_records().len());
    println!("Memos:       {}", project.memos().len());

    if !project.tags().is_empty() {
        println!();
        for (tag, release) in project.tags() {
            if release.is_manual() {
                println!("  {} = {}  (manual)", tag, release.ware);
            } else {
                println!(
                    "  {} = {}  (run record {})",
                    tag, release.ware, release.run_record_hid
                );
            }
        }
    }

    Ok(Completion::Done)
}

// =============================================================================
// EVAL COMMAND
// =============================================================================

/// Evaluate a formula through the configured engine.
pub async fn cmd_eval(
    config: &Config,
    formula: PathBuf,
    force: bool,
    env: Vec<String>,
) -> Result<Completion, ReppError> {
    let request = EvalRequest {
        formula,
        project: config.project.clone(),
        force,
        env,
    };
    let mut executor = SubprocessExecutor::new(&config.engine)?;

    match evaluate(&request, &mut executor).await? {
        EvalOutcome::NoOp { .. } | EvalOutcome::Succeeded { .. } => Ok(Completion::Done),
        EvalOutcome::Failed { .. } => Ok(Completion::ActionFailed),
    }
}
