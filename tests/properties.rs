//! Property tests for the in-memory rewrite rules.
//!
//! These run against `PatchOp::rewrite` directly, so no file system is
//! involved and the generators can stay aggressive.

use checkout_patcher::{PatchOp, Rewrite};
use proptest::prelude::*;
use std::path::PathBuf;

fn insert_op(anchor: &str, line: &str) -> PatchOp {
    PatchOp::LineInsertAfter {
        file: PathBuf::from("unused"),
        anchor: anchor.to_string(),
        line: line.to_string(),
    }
}

fn replace_op(pattern: &str, replacement: &str) -> PatchOp {
    PatchOp::TextReplace {
        file: PathBuf::from("unused"),
        pattern: pattern.to_string(),
        replacement: replacement.to_string(),
    }
}

/// Anchor and insert lines drawn from a small alphabet that cannot collide
/// with the line-break handling.
fn line_text() -> impl Strategy<Value = String> {
    "[a-z ();=@\"]{1,30}"
}

proptest! {
    /// Applying an insert twice never changes the text a second time.
    #[test]
    fn insert_is_idempotent(
        prefix in "[a-z\n]{0,20}",
        indent in "[ \t]{0,8}",
        anchor in line_text(),
        line in line_text(),
        suffix in "[a-z\n]{0,20}",
    ) {
        // One well-formed anchor line somewhere in the middle.
        let text = format!("{prefix}\n{indent}{anchor}\n{suffix}");
        let op = insert_op(&anchor, &line);

        if let Rewrite::Changed(once) = op.rewrite(&text) {
            match op.rewrite(&once) {
                Rewrite::Changed(twice) => prop_assert_eq!(twice, once),
                Rewrite::AlreadyApplied | Rewrite::NoMatch => {}
            }
        }
    }

    /// A missing anchor never produces new text.
    #[test]
    fn insert_missing_anchor_never_changes_text(
        text in "[a-m\n ]{0,100}",
        anchor in "[n-z]{1,20}",
        line in line_text(),
    ) {
        let op = insert_op(&anchor, &line);
        prop_assert_eq!(op.rewrite(&text), Rewrite::NoMatch);
    }

    /// After a replace with disjoint pattern/replacement alphabets, the
    /// pattern is gone from the result.
    #[test]
    fn replace_eliminates_disjoint_pattern(
        chunks in proptest::collection::vec("[a-m]{0,10}", 0..8),
        pattern in "[a-m]{2,6}",
        replacement in "[n-z]{0,6}",
    ) {
        let text = chunks.join(&pattern);
        let op = replace_op(&pattern, &replacement);
        match op.rewrite(&text) {
            Rewrite::Changed(out) => prop_assert!(!out.contains(&pattern)),
            Rewrite::AlreadyApplied => prop_assert!(false, "disjoint alphabets cannot be equal"),
            Rewrite::NoMatch => prop_assert!(!text.contains(&pattern)),
        }
    }

    /// Replace is idempotent when pattern and replacement are disjoint.
    #[test]
    fn replace_is_idempotent_for_disjoint_alphabets(
        text in "[a-m\n]{0,60}",
        pattern in "[a-f]{2,5}",
        replacement in "[n-z]{0,5}",
    ) {
        let op = replace_op(&pattern, &replacement);
        if let Rewrite::Changed(once) = op.rewrite(&text) {
            prop_assert_eq!(op.rewrite(&once), Rewrite::NoMatch);
        }
    }
}
