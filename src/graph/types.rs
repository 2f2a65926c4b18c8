//! Core graph types.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Position of a commit inside a [`GitGraph`]: branch lane plus index in
/// that branch's append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CommitId {
    pub branch: usize,
    pub index: usize,
}

/// One commit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Identifier, expected to be unique across the whole input
    pub hash: String,
    /// Free-form message
    pub message: String,
    /// Commit date, `None` when absent or unparsable
    pub date: Option<DateTime<Utc>>,
    /// Hash of the previous commit on the same branch
    pub base: Option<String>,
    /// Hash of the commit this one merges from
    pub merge: Option<String>,
    /// Lane of the owning branch
    pub branch: usize,
}

impl Commit {
    /// Milliseconds since the epoch, zero when the commit has no date.
    pub fn timestamp(&self) -> i64 {
        self.date.map_or(0, |date| date.timestamp_millis())
    }
}

/// A named branch owning an ordered list of commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    /// Declaration order, which is also the horizontal lane
    pub lane: usize,
    pub color: String,
    /// Commits in append (textual) order, oldest first
    pub commits: Vec<Commit>,
}

impl Branch {
    pub fn new(name: impl Into<String>, lane: usize, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lane,
            color: color.into(),
            commits: Vec::new(),
        }
    }

    /// Append a commit, chaining its `base` to the previous tip.
    pub fn push(&mut self, mut commit: Commit) {
        commit.branch = self.lane;
        if let Some(tip) = self.commits.last() {
            commit.base = Some(tip.hash.clone());
        }
        self.commits.push(commit);
    }
}

/// Parse result: every branch in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitGraph {
    pub branches: Vec<Branch>,
}

impl GitGraph {
    pub fn commit_count(&self) -> usize {
        self.branches.iter().map(|b| b.commits.len()).sum()
    }

    pub fn commit(&self, id: CommitId) -> &Commit {
        &self.branches[id.branch].commits[id.index]
    }

    /// All commits with their ids, branch by branch.
    pub fn commits(&self) -> impl Iterator<Item = (CommitId, &Commit)> {
        self.branches.iter().enumerate().flat_map(|(branch, b)| {
            b.commits
                .iter()
                .enumerate()
                .map(move |(index, commit)| (CommitId { branch, index }, commit))
        })
    }

    /// Build the hash lookup table. The first occurrence of a hash wins.
    pub fn table(&self) -> CommitTable<'_> {
        let mut by_hash = HashMap::with_capacity(self.commit_count());
        for (id, commit) in self.commits() {
            by_hash.entry(commit.hash.as_str()).or_insert(id);
        }
        CommitTable { by_hash }
    }

    /// Clear every `merge` that does not name a known commit (or names the
    /// commit itself). Returns how many references were dropped.
    pub(crate) fn drop_dangling_merges(&mut self) -> usize {
        let known: HashSet<String> = self
            .commits()
            .map(|(_, commit)| commit.hash.clone())
            .collect();
        let mut dropped = 0;
        for commit in self.branches.iter_mut().flat_map(|b| b.commits.iter_mut()) {
            let dangling = commit
                .merge
                .as_deref()
                .is_some_and(|merge| merge == commit.hash || !known.contains(merge));
            if dangling {
                tracing::debug!(hash = %commit.hash, merge = ?commit.merge, "dropping dangling merge");
                commit.merge = None;
                dropped += 1;
            }
        }
        dropped
    }
}

/// Hash → commit lookup, built once per render.
#[derive(Debug, Clone, Default)]
pub struct CommitTable<'a> {
    by_hash: HashMap<&'a str, CommitId>,
}

impl CommitTable<'_> {
    pub fn get(&self, hash: &str) -> Option<CommitId> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: "msg".to_string(),
            date: None,
            base: None,
            merge: None,
            branch: 0,
        }
    }

    #[test]
    fn test_push_chains_base_to_previous_tip() {
        let mut branch = Branch::new("main", 0, "#fff");
        branch.push(commit("a"));
        branch.push(commit("b"));
        branch.push(commit("c"));
        assert_eq!(branch.commits[0].base, None);
        assert_eq!(branch.commits[1].base.as_deref(), Some("a"));
        assert_eq!(branch.commits[2].base.as_deref(), Some("b"));
    }

    #[test]
    fn test_push_sets_owning_lane() {
        let mut branch = Branch::new("dev", 3, "#fff");
        branch.push(commit("a"));
        assert_eq!(branch.commits[0].branch, 3);
    }

    #[test]
    fn test_timestamp_defaults_to_zero() {
        assert_eq!(commit("a").timestamp(), 0);
    }

    #[test]
    fn test_table_keeps_first_occurrence() {
        let mut main = Branch::new("main", 0, "#fff");
        main.push(commit("a"));
        let mut dev = Branch::new("dev", 1, "#000");
        dev.push(commit("a"));
        let graph = GitGraph {
            branches: vec![main, dev],
        };
        let table = graph.table();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a"), Some(CommitId { branch: 0, index: 0 }));
        assert!(!table.contains("b"));
    }

    #[test]
    fn test_drop_dangling_merges_clears_unknown_and_self_references() {
        let mut main = Branch::new("main", 0, "#fff");
        main.push(commit("a"));
        let mut dangling = commit("b");
        dangling.merge = Some("zzz".to_string());
        main.push(dangling);
        let mut own = commit("c");
        own.merge = Some("c".to_string());
        main.push(own);
        let mut good = commit("d");
        good.merge = Some("a".to_string());
        main.push(good);

        let mut graph = GitGraph {
            branches: vec![main],
        };
        assert_eq!(graph.drop_dangling_merges(), 2);
        let merges: Vec<_> = graph
            .commits()
            .map(|(_, c)| c.merge.as_deref())
            .collect();
        assert_eq!(merges, vec![None, None, None, Some("a")]);
    }
}
