//! Per-file three-way merge decisions
//!
//! For every path in the union of the split-point, current-branch, and
//! given-branch manifests, [`decide`] compares the three blob ids (absence
//! counts as a state of its own) and yields the outcome the merge driver
//! must apply. Blob-id equality stands in for content equality: identical
//! content always shares one id.

use crate::artifacts::objects::object_id::ObjectId;

/// Outcome of the three-way comparison for a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch's version already is the merge result
    KeepCurrent,
    /// Materialize the given branch's version and stage it as an addition
    TakeGiven,
    /// Stage a removal and delete the file from the working tree
    RemoveFromCurrent,
    /// The path stays absent from the merge result
    LeaveAbsent,
    /// Both sides changed the path in different ways
    Conflict,
}

/// Decide the merge outcome for one path
///
/// `base`, `current`, and `given` are the blob ids tracked for the path in
/// the split-point, current-branch, and given-branch manifests (`None`
/// where the path is absent). Rows are tested in order; any combination no
/// row claims is a conflict.
pub fn decide(
    base: Option<&ObjectId>,
    current: Option<&ObjectId>,
    given: Option<&ObjectId>,
) -> MergeOutcome {
    match (base, current, given) {
        // added on the current side only
        (None, Some(_), None) => MergeOutcome::KeepCurrent,
        // added on the given side only
        (None, None, Some(_)) => MergeOutcome::TakeGiven,
        // gone from both sides (regardless of the base)
        (_, None, None) => MergeOutcome::LeaveAbsent,
        // unmodified on the current side, deleted on the given side
        (Some(b), Some(c), None) if b == c => MergeOutcome::RemoveFromCurrent,
        // already removed on the current side, unmodified on the given side
        (Some(b), None, Some(g)) if b == g => MergeOutcome::LeaveAbsent,
        // unmodified on the current side, modified on the given side
        (Some(b), Some(c), Some(g)) if b == c && b != g => MergeOutcome::TakeGiven,
        // unmodified on the given side, modified on the current side
        (Some(b), Some(c), Some(g)) if b == g && b != c => MergeOutcome::KeepCurrent,
        // both sides agree on the result
        (_, Some(c), Some(g)) if c == g => MergeOutcome::KeepCurrent,
        _ => MergeOutcome::Conflict,
    }
}

/// Synthesize conflict-marked content for a path both sides changed
///
/// The current branch's content sits between `<<<<<<< HEAD` and `=======`,
/// the given branch's between `=======` and `>>>>>>>`. A side where the
/// path is absent contributes an empty section.
pub fn conflict_content(current: Option<&str>, given: Option<&str>) -> String {
    format!(
        "<<<<<<< HEAD\n{}=======\n{}>>>>>>>\n",
        current.unwrap_or(""),
        given.unwrap_or("")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use pretty_assertions::assert_eq;

    fn oid(content: &str) -> ObjectId {
        Blob::new(content.to_string()).object_id().unwrap()
    }

    #[test]
    fn added_only_on_current_side_is_kept() {
        let c = oid("current");
        assert_eq!(decide(None, Some(&c), None), MergeOutcome::KeepCurrent);
    }

    #[test]
    fn added_only_on_given_side_is_taken() {
        let g = oid("given");
        assert_eq!(decide(None, None, Some(&g)), MergeOutcome::TakeGiven);
    }

    #[test]
    fn absent_from_both_sides_stays_removed() {
        let b = oid("base");
        assert_eq!(decide(Some(&b), None, None), MergeOutcome::LeaveAbsent);
        assert_eq!(decide(None, None, None), MergeOutcome::LeaveAbsent);
    }

    #[test]
    fn deleted_on_given_side_of_unmodified_file_is_removed() {
        let b = oid("base");
        assert_eq!(
            decide(Some(&b), Some(&b), None),
            MergeOutcome::RemoveFromCurrent
        );
    }

    #[test]
    fn already_removed_on_current_side_stays_absent() {
        let b = oid("base");
        assert_eq!(decide(Some(&b), None, Some(&b)), MergeOutcome::LeaveAbsent);
    }

    #[test]
    fn modified_only_on_given_side_is_taken() {
        let b = oid("base");
        let g = oid("given change");
        assert_eq!(decide(Some(&b), Some(&b), Some(&g)), MergeOutcome::TakeGiven);
    }

    #[test]
    fn modified_only_on_current_side_is_kept() {
        let b = oid("base");
        let c = oid("current change");
        assert_eq!(
            decide(Some(&b), Some(&c), Some(&b)),
            MergeOutcome::KeepCurrent
        );
    }

    #[test]
    fn same_change_on_both_sides_is_kept() {
        let b = oid("base");
        let same = oid("same change");
        assert_eq!(
            decide(Some(&b), Some(&same), Some(&same)),
            MergeOutcome::KeepCurrent
        );
        assert_eq!(
            decide(None, Some(&same), Some(&same)),
            MergeOutcome::KeepCurrent
        );
    }

    #[test]
    fn divergent_changes_conflict() {
        let b = oid("base");
        let c = oid("current change");
        let g = oid("given change");

        // both modified differently
        assert_eq!(decide(Some(&b), Some(&c), Some(&g)), MergeOutcome::Conflict);
        // both added with different content
        assert_eq!(decide(None, Some(&c), Some(&g)), MergeOutcome::Conflict);
        // modified on one side, deleted on the other
        assert_eq!(decide(Some(&b), Some(&c), None), MergeOutcome::Conflict);
        assert_eq!(decide(Some(&b), None, Some(&g)), MergeOutcome::Conflict);
    }

    #[test]
    fn conflict_content_uses_the_marker_format() {
        let content = conflict_content(Some("ours\n"), Some("theirs\n"));
        assert_eq!(
            content,
            "<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>>\n"
        );
    }

    #[test]
    fn conflict_content_with_absent_side_is_empty_there() {
        let content = conflict_content(None, Some("theirs\n"));
        assert_eq!(content, "<<<<<<< HEAD\n=======\ntheirs\n>>>>>>>\n");
    }
}
