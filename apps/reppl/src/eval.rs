//! # Evaluation Orchestrator
//!
//! One evaluation of one formula:
//!
//! ```text
//! START → LOADED → PINNED → HASHED → MEMO_HIT ───────────────────────────▶ END
//!                                  └ MEMO_MISS / forced → EXECUTING ─┬ ok ─▶ RECORDED → PERSISTED → END
//!                                                                    └ failed ─────────────────────▶ END
//! ```
//!
//! The pin file is written before the engine runs, whatever the outcome, so
//! it always shows exactly what was executed. The project file is only
//! rewritten on success; a memo hit or a failed action leaves it untouched.

use crate::executor::Executor;
use crate::store;
use reppl_core::{ExitStatus, Pinner, Plan, ReppError, parse_env_assignment};
use std::path::PathBuf;

/// What to evaluate and how.
#[derive(Debug, Clone)]
pub struct EvalRequest {
    /// Formula source file.
    pub formula: PathBuf,
    /// Project file.
    pub project: PathBuf,
    /// Evaluate even when a memoized result exists.
    pub force: bool,
    /// `NAME=VALUE` overrides for the action environment.
    pub env: Vec<String>,
}

/// How an evaluation ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Results were already on record; nothing ran.
    NoOp { run_record: String },
    /// The action ran and exited `0`; results were saved.
    Succeeded { run_record: String },
    /// The action ran and reported a non-success exit code.
    Failed { exit_code: String },
}

fn status_line(corner: &str, label: &str, message: &str) {
    println!("{} reppl eval {}{}", corner, label, message);
}

/// Run one evaluation.
pub async fn evaluate<E: Executor>(
    request: &EvalRequest,
    executor: &mut E,
) -> Result<EvalOutcome, ReppError> {
    let overrides = request
        .env
        .iter()
        .map(|item| parse_env_assignment(item))
        .collect::<Result<Vec<_>, _>>()?;

    // LOADED
    let mut formula = store::load_formula(&request.formula)?;
    for (name, value) in overrides {
        formula.set_env(name, value);
    }
    let mut project = store::load_project(&request.project)?;

    // PINNED + HASHED
    let plan = Plan::new(&project, formula)?;
    for name in Pinner::unresolved(plan.pinned()) {
        tracing::warn!(input = name, "input has no hash after pinning");
    }
    tracing::info!(formula_hid = plan.formula_hid(), "formula pinned");

    let label = request.formula.display().to_string();
    match (plan.memoized(&project).map(str::to_string), request.force) {
        (Some(run_record), false) => {
            status_line("┌─", &label, ": no op!  results are on record.");
            return Ok(EvalOutcome::NoOp { run_record });
        }
        (Some(_), true) => status_line(
            "┌─",
            &label,
            ": results are on record, but eval forced.  evaluating...",
        ),
        (None, _) => status_line(
            "┌─",
            &label,
            ": looks new, no memoized result!  evaluating...",
        ),
    }

    // EXECUTING
    let pin_file = store::pin_path(&request.formula);
    store::write_pin(plan.pinned(), &pin_file)?;
    let record = executor.run(&pin_file).await?;
    let status = ExitStatus::of(&record);

    let outcome = if status.is_success() {
        // RECORDED + PERSISTED
        let stamped = plan.record(&mut project, record)?;
        store::save_project(&project, &request.project)?;
        tracing::info!(run_record = %stamped.hid, "results saved");
        println!("├─ reppl eval results saved");
        EvalOutcome::Succeeded {
            run_record: stamped.hid,
        }
    } else {
        tracing::warn!(exit_code = status.code(), "evaluated action failed");
        EvalOutcome::Failed {
            exit_code: status.code().to_string(),
        }
    };

    status_line("└─", &label, &format!(": exitcode={}", status.code()));
    Ok(outcome)
}
