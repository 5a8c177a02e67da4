// src/config/allow_list.rs

use std::collections::{BTreeMap, HashSet};

use crate::config::model::UNGROUPED;

/// The set of files clients may tail, filter, list or download.
///
/// Files are kept in named groups for listing; membership checks are exact
/// string comparisons against the union of all groups. No path
/// normalisation happens here: `/var/log/./app.log` is not
/// `/var/log/app.log`.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    groups: BTreeMap<String, Vec<String>>,
    members: HashSet<String>,
}

impl AllowList {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        let members = groups.values().flatten().cloned().collect();
        Self { groups, members }
    }

    /// Build an allow-list holding `files` in the ungrouped group.
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups = BTreeMap::new();
        groups.insert(
            UNGROUPED.to_string(),
            files.into_iter().map(Into::into).collect(),
        );
        Self::new(groups)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.members.contains(file)
    }

    /// Groups in name order, files in configured order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    /// Every allow-listed file once, in group order.
    pub fn files(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.groups
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|f| seen.insert(*f))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
