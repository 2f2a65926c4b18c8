//! Merging per-branch commit lists into one draw order.

use serde::Serialize;

use super::types::{Commit, CommitId, CommitTable, GitGraph};

/// Global commit order, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Linearization {
    pub order: Vec<CommitId>,
    /// Commits left out because their merge dependency never became emittable
    pub dropped: usize,
}

impl Linearization {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Newest first, the order rows are drawn top to bottom.
    pub fn newest_first(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.order.iter().rev().copied()
    }
}

/// Multi-way merge of every branch's commits.
///
/// Each round looks at the next unemitted commit of every branch. A commit
/// whose merge source has not been emitted yet waits. Among the rest the
/// earliest timestamp wins, ties going to the branch declared first. When
/// every head is waiting the merge stops and the remaining commits are
/// dropped.
///
/// Merge sources resolve through `table`; a commit counts as emitted once
/// its branch cursor has moved past it.
pub fn linearize(graph: &GitGraph, table: &CommitTable<'_>) -> Linearization {
    let total = graph.commit_count();
    let mut cursors = vec![0usize; graph.branches.len()];
    let mut order = Vec::with_capacity(total);

    while order.len() < total {
        let Some(branch) = next_branch(graph, table, &cursors) else {
            break;
        };
        order.push(CommitId {
            branch,
            index: cursors[branch],
        });
        cursors[branch] += 1;
    }

    let dropped = total - order.len();
    if dropped > 0 {
        tracing::warn!(dropped, "merge dependencies never resolved; commits left out of the graph");
    }
    Linearization { order, dropped }
}

fn next_branch(graph: &GitGraph, table: &CommitTable<'_>, cursors: &[usize]) -> Option<usize> {
    let emitted = |id: CommitId| cursors[id.branch] > id.index;
    let waiting = |commit: &Commit| {
        commit
            .merge
            .as_deref()
            .is_some_and(|merge| !table.get(merge).is_some_and(emitted))
    };
    let head = |branch: usize| &graph.branches[branch].commits[cursors[branch]];

    let mut best: Option<usize> = None;
    for (branch, b) in graph.branches.iter().enumerate() {
        let Some(candidate) = b.commits.get(cursors[branch]) else {
            continue;
        };
        let Some(current) = best else {
            best = Some(branch);
            continue;
        };
        let chosen = head(current);
        // a waiting pick defers to whichever branch comes next
        if waiting(chosen) {
            best = Some(branch);
            continue;
        }
        if waiting(candidate) {
            continue;
        }
        if candidate.timestamp() < chosen.timestamp() {
            best = Some(branch);
        }
    }

    best.filter(|&branch| !waiting(head(branch)))
}
