//! Ancestor chains and split-point discovery
//!
//! Two deliberately asymmetric traversals cooperate during a merge:
//!
//! - [`first_parent_chain`] walks only mainline (`parents[0]`) edges and is
//!   used to enumerate one side's history.
//! - [`find_split_point`] runs a breadth-first search over **all** parent
//!   edges from the other side, returning the first commit that appears in
//!   the chain.
//!
//! Because the candidate set is first-parent-only, the search can miss a
//! common ancestor reachable solely through a second-parent edge on the
//! candidate side. This is a best-effort nearest-common-ancestor, not a
//! provably lowest one.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::{HashSet, VecDeque};

/// Collect the mainline history of a commit
///
/// Follows only the first-parent link from `start` down to the root,
/// inclusive of `start` itself. Implemented as a loop so arbitrarily long
/// histories cannot exhaust the call stack.
pub fn first_parent_chain(database: &Database, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut chain = vec![start.clone()];
    let mut current = start.clone();

    loop {
        let commit = database
            .parse_object_as_commit(&current)?
            .with_context(|| format!("object {} is not a commit", current))?;

        match commit.parent() {
            Some(parent) => {
                chain.push(parent.clone());
                current = parent.clone();
            }
            None => break,
        }
    }

    Ok(chain)
}

/// Find the merge baseline between two diverging histories
///
/// Breadth-first search from `from` following all parent edges (first and
/// second), visiting each commit once in FIFO order. The first visited
/// commit whose id is a member of `candidates` is the split point; `None`
/// when the traversal exhausts without a match.
pub fn find_split_point(
    database: &Database,
    from: &ObjectId,
    candidates: &[ObjectId],
) -> anyhow::Result<Option<ObjectId>> {
    let mut marked = HashSet::new();
    let mut fringe = VecDeque::new();

    marked.insert(from.clone());
    fringe.push_back(from.clone());

    while let Some(visited) = fringe.pop_front() {
        if candidates.contains(&visited) {
            return Ok(Some(visited));
        }

        let commit = database
            .parse_object_as_commit(&visited)?
            .with_context(|| format!("object {} is not a commit", visited))?;

        for parent in commit.parents() {
            if marked.insert(parent.clone()) {
                fringe.push_back(parent.clone());
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::{Commit, Manifest};
    use crate::artifacts::objects::object::Object;

    fn test_database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    fn store_commit(database: &Database, parents: Vec<ObjectId>, message: &str) -> ObjectId {
        let commit = Commit::new(
            parents,
            Manifest::new(),
            message.to_string(),
            Commit::timestamp_from_env(),
        );
        let oid = commit.object_id().unwrap();
        database.store(commit).unwrap();
        oid
    }

    #[test]
    fn chain_walks_first_parent_to_root() {
        let (_dir, database) = test_database();

        let root = {
            let commit = Commit::root();
            let oid = commit.object_id().unwrap();
            database.store(commit).unwrap();
            oid
        };
        let first = store_commit(&database, vec![root.clone()], "first");
        let second = store_commit(&database, vec![first.clone()], "second");

        let chain = first_parent_chain(&database, &second).unwrap();
        assert_eq!(chain, vec![second, first, root]);
    }

    #[test]
    fn chain_ignores_second_parents() {
        let (_dir, database) = test_database();

        let root = store_commit(&database, vec![], "root");
        let left = store_commit(&database, vec![root.clone()], "left");
        let right = store_commit(&database, vec![root.clone()], "right");
        let merge = store_commit(&database, vec![left.clone(), right.clone()], "merge");

        let chain = first_parent_chain(&database, &merge).unwrap();
        assert_eq!(chain, vec![merge, left, root]);
        assert!(!chain.contains(&right));
    }

    #[test]
    fn split_point_of_simple_divergence_is_the_fork() {
        let (_dir, database) = test_database();

        let root = store_commit(&database, vec![], "root");
        let base = store_commit(&database, vec![root.clone()], "base");
        let ours = store_commit(&database, vec![base.clone()], "ours");
        let theirs = store_commit(&database, vec![base.clone()], "theirs");

        let candidates = first_parent_chain(&database, &theirs).unwrap();
        let split = find_split_point(&database, &ours, &candidates).unwrap();

        assert_eq!(split, Some(base));
    }

    #[test]
    fn split_point_follows_second_parent_edges_on_the_near_side() {
        let (_dir, database) = test_database();

        // candidate side (first-parent only):  root -- base -- theirs
        // near side:  root -- far -- near -- merge, with base -- side as
        // merge's second-parent line, so base is two hops away through the
        // second-parent edge and three through the mainline
        let root = store_commit(&database, vec![], "root");
        let base = store_commit(&database, vec![root.clone()], "base");
        let theirs = store_commit(&database, vec![base.clone()], "theirs");
        let side = store_commit(&database, vec![base.clone()], "side");
        let far = store_commit(&database, vec![root.clone()], "far");
        let near = store_commit(&database, vec![far.clone()], "near");
        let merge = store_commit(&database, vec![near.clone(), side.clone()], "merge");

        let candidates = first_parent_chain(&database, &theirs).unwrap();
        let split = find_split_point(&database, &merge, &candidates).unwrap();

        // reached through merge's second parent before the mainline hits root
        assert_eq!(split, Some(base));
    }

    #[test]
    fn split_point_is_none_when_histories_share_nothing() {
        let (_dir, database) = test_database();

        let lone = store_commit(&database, vec![], "lone");
        let other = store_commit(&database, vec![], "other");

        let split = find_split_point(&database, &lone, &[other]).unwrap();
        assert_eq!(split, None);
    }
}
