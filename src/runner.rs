//! Patch runner - executes an ordered list of patch ops against the disk.
//!
//! Ops are fully self-describing and independent, so the runner is a plain
//! sequential loop. The only policy decision is what to do when an op hits
//! an I/O error, and that decision is explicit rather than inherited from
//! an unwinding default.

use crate::edit::{EditError, EditOutcome, PatchOp};
use std::path::PathBuf;
use thiserror::Error;

/// What the runner does when an op fails with an I/O error.
///
/// No-ops (missing anchors, already-applied edits) never count as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing op, leaving later ops unapplied. Mirrors
    /// the historical abort-on-first-error behavior.
    #[default]
    FailFast,
    /// Apply every remaining op and report all failures at the end.
    ContinueOnError,
}

/// An op failure, annotated with enough context to diagnose and re-run.
#[derive(Error, Debug)]
#[error("patch #{index} ({file}): {source}")]
pub struct RunError {
    /// Position of the failing op in the patch list.
    pub index: usize,
    pub file: PathBuf,
    #[source]
    pub source: EditError,
}

/// Per-op results of one run, in patch-list order.
///
/// Under [`FailurePolicy::FailFast`] the report is truncated at the failing
/// op; ops after it were never attempted.
#[derive(Debug)]
#[must_use = "RunReport should be checked for failures"]
pub struct RunReport {
    pub results: Vec<Result<EditOutcome, RunError>>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.is_ok())
    }

    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, EditOutcome::Applied { .. }))
    }

    pub fn already_applied(&self) -> usize {
        self.count(|o| matches!(o, EditOutcome::AlreadyApplied { .. }))
    }

    pub fn no_match(&self) -> usize {
        self.count(|o| matches!(o, EditOutcome::NoMatch { .. }))
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    fn count(&self, pred: impl Fn(&EditOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(o) if pred(o)))
            .count()
    }
}

/// Holds the ordered, immutable patch list for one run.
#[derive(Debug, Clone)]
pub struct PatchRunner {
    ops: Vec<PatchOp>,
    policy: FailurePolicy,
}

impl PatchRunner {
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self {
            ops,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Apply every op in order. Each op re-reads its target from disk, so
    /// earlier results never feed into later ops.
    pub fn run(&self) -> RunReport {
        let mut results = Vec::with_capacity(self.ops.len());

        for (index, op) in self.ops.iter().enumerate() {
            match op.apply() {
                Ok(outcome) => results.push(Ok(outcome)),
                Err(source) => {
                    results.push(Err(RunError {
                        index,
                        file: op.file().to_path_buf(),
                        source,
                    }));
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        RunReport { results }
    }
}
