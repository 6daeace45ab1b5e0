//! Checkout Patcher: pins MSBuild paths in a MonoDevelop working copy.
//!
//! After a fresh checkout, a handful of project files point at whatever
//! MSBuild the environment resolves. This crate applies a fixed list of
//! textual patches that pin those paths to a bootstrap MSBuild build, and
//! every patch is idempotent so the tool can be re-run after each checkout.
//!
//! # Architecture
//!
//! There are exactly two edit primitives, both operating on a file's full
//! text: [`PatchOp::TextReplace`] (global substring replace) and
//! [`PatchOp::LineInsertAfter`] (anchored line insertion that preserves the
//! surrounding indentation and line-break style). A [`PatchRunner`] walks
//! the ordered list built by [`PinConfig::patch_set`] and applies each op
//! independently.
//!
//! # Safety
//!
//! - Missing anchors are benign no-ops, never errors
//! - Already-applied edits are detected and skipped
//! - File writes are atomic (tempfile + fsync + rename)
//! - I/O failures surface the target path and the op's position in the list
//!
//! # Example
//!
//! ```no_run
//! use checkout_patcher::{PatchRunner, PinConfig};
//! use std::path::PathBuf;
//!
//! let config = PinConfig {
//!     repo_root: PathBuf::from("/work/monodevelop/main"),
//!     ..PinConfig::default()
//! };
//! let report = PatchRunner::new(config.patch_set()).run();
//! assert!(report.success());
//! ```

pub mod config;
pub mod edit;
pub mod runner;

// Re-exports
pub use config::PinConfig;
pub use edit::{EditError, EditOutcome, PatchOp, Rewrite};
pub use runner::{FailurePolicy, PatchRunner, RunError, RunReport};
