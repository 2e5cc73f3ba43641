//! Explicit completion metadata supplied by the host, keyed by full dotted path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataEntry {
    pub kind: Option<String>,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub append_dot: bool,
}

/// `fullPath -> entry`. Declaring `a.b.c` implicitly declares `a` and `a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetadataEntry>,
}

/// A direct child segment of some base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataChild<'a> {
    pub segment: &'a str,
    pub full_path: String,
    /// Entry declared for exactly `full_path`, if any.
    pub entry: Option<&'a MetadataEntry>,
    /// Some declared key continues below `full_path`.
    pub has_children: bool,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: MetadataEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn with(mut self, path: impl Into<String>, entry: MetadataEntry) -> Self {
        self.insert(path, entry);
        self
    }

    pub fn get(&self, path: &str) -> Option<&MetadataEntry> {
        self.entries.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children of `base` (`""` is the root), sorted by segment.
    pub fn children_of(&self, base: &str) -> Vec<MetadataChild<'_>> {
        let mut children: BTreeMap<&str, MetadataChild<'_>> = BTreeMap::new();
        for (key, entry) in &self.entries {
            let rest = if base.is_empty() {
                key.as_str()
            } else {
                match key
                    .strip_prefix(base)
                    .and_then(|rest| rest.strip_prefix('.'))
                {
                    Some(rest) => rest,
                    None => continue,
                }
            };
            let (segment, deeper) = match rest.split_once('.') {
                Some((segment, _)) => (segment, true),
                None => (rest, false),
            };
            if segment.is_empty() {
                continue;
            }

            let child = children.entry(segment).or_insert_with(|| MetadataChild {
                segment,
                full_path: if base.is_empty() {
                    segment.to_string()
                } else {
                    format!("{base}.{segment}")
                },
                entry: None,
                has_children: false,
            });
            if deeper {
                child.has_children = true;
            } else {
                child.entry = Some(entry);
            }
        }
        children.into_values().collect()
    }
}

impl FromIterator<(String, MetadataEntry)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, MetadataEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
