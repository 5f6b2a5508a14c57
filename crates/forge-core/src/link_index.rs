//! Bidirectional textual-reference index.
//!
//! The index is produced by whatever resolves wiki-links in node content; this
//! crate only stores the resolved adjacency. Both directions are kept in sync
//! by [`LinkIndex::insert`] and [`LinkIndex::remove_node`]. Sorted containers
//! keep iteration order stable, which the graph builder relies on for
//! deterministic output.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `source -> {targets}` plus the reverse map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkIndex {
    #[serde(default)]
    pub outgoing: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub incoming: BTreeMap<String, BTreeSet<String>>,
}

impl LinkIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(source, target)` pairs.
    pub fn from_links<I, S, T>(links: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut index = Self::new();
        for (source, target) in links {
            index.insert(source, target);
        }
        index
    }

    /// Record that `source` references `target`. Returns `false` if the link
    /// was already present.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) -> bool {
        let source = source.into();
        let target = target.into();
        let added = self
            .outgoing
            .entry(source.clone())
            .or_default()
            .insert(target.clone());
        self.incoming.entry(target).or_default().insert(source);
        added
    }

    /// Drop every link to or from `id`.
    pub fn remove_node(&mut self, id: &str) {
        if let Some(targets) = self.outgoing.remove(id) {
            for target in targets {
                remove_from(&mut self.incoming, &target, id);
            }
        }
        if let Some(sources) = self.incoming.remove(id) {
            for source in sources {
                remove_from(&mut self.outgoing, &source, id);
            }
        }
    }

    /// Ids that `id` references.
    pub fn outgoing_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.outgoing
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Ids that reference `id`.
    pub fn incoming_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.incoming
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// All `(source, target)` pairs, sorted by source then target.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outgoing.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |target| (source.as_str(), target.as_str()))
        })
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link_count() == 0
    }
}

fn remove_from(map: &mut BTreeMap<String, BTreeSet<String>>, key: &str, value: &str) {
    if let Some(set) = map.get_mut(key) {
        set.remove(value);
        if set.is_empty() {
            map.remove(key);
        }
    }
}
