//! Ignore rules and type filters applied before descending into directories.

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use fsreport_core::{BuildError, TreeOptions};

/// Compiled form of the ignore list and type filters of a [`TreeOptions`].
///
/// An ignore rule matches a candidate entry when it:
/// - equals the entry name,
/// - is a glob matching the entry name,
/// - contains a `/` and either matches the root-relative path as a glob or
///   is a component-wise fragment of that path.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    names: HashSet<String>,
    name_globs: GlobSet,
    path_globs: GlobSet,
    fragments: Vec<Vec<String>>,
    types: BTreeSet<String>,
}

impl EntryFilter {
    /// Compile the filters of `options`.
    pub fn new(options: &TreeOptions) -> Result<Self, BuildError> {
        let mut names = HashSet::new();
        let mut name_globs = GlobSetBuilder::new();
        let mut path_globs = GlobSetBuilder::new();
        let mut fragments = Vec::new();

        for rule in &options.ignore {
            let rule = rule.trim().trim_end_matches('/');
            if rule.is_empty() {
                continue;
            }

            let is_glob = rule.contains(&['*', '?', '[', '{'][..]);
            if rule.contains('/') {
                let rule = rule.trim_start_matches('/');
                if is_glob {
                    let glob = GlobBuilder::new(rule)
                        .literal_separator(true)
                        .build()
                        .map_err(invalid_rule)?;
                    path_globs.add(glob);
                } else {
                    let fragment: Vec<String> =
                        rule.split('/').filter(|c| !c.is_empty()).map(str::to_string).collect();
                    if !fragment.is_empty() {
                        fragments.push(fragment);
                    }
                }
            } else if is_glob {
                name_globs.add(Glob::new(rule).map_err(invalid_rule)?);
            } else {
                names.insert(rule.to_string());
            }
        }

        Ok(Self {
            names,
            name_globs: name_globs.build().map_err(invalid_rule)?,
            path_globs: path_globs.build().map_err(invalid_rule)?,
            fragments,
            types: options.type_filter_set(),
        })
    }

    /// Check if an entry is excluded by the ignore list.
    ///
    /// `relative` is the entry's path relative to the build root.
    pub fn is_ignored(&self, relative: &Path, name: &str) -> bool {
        if self.names.contains(name) || self.name_globs.is_match(name) {
            return true;
        }
        if self.path_globs.is_match(relative) {
            return true;
        }
        if self.fragments.is_empty() {
            return false;
        }

        let components: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();
        self.fragments.iter().any(|fragment| {
            components
                .windows(fragment.len())
                .any(|window| window.iter().zip(fragment).all(|(a, b)| **a == **b))
        })
    }

    /// Check if a file name passes the type filters.
    pub fn accepts_file(&self, name: &str) -> bool {
        if self.types.is_empty() {
            return true;
        }
        Path::new(name)
            .extension()
            .is_some_and(|ext| self.types.contains(&ext.to_string_lossy().to_lowercase()))
    }

    /// Whether an entry should be created (and, for directories, descended into).
    pub fn keep(&self, relative: &Path, name: &str, is_dir: bool) -> bool {
        !self.is_ignored(relative, name) && (is_dir || self.accepts_file(name))
    }

    /// Check if any type filters are active.
    pub fn has_type_filters(&self) -> bool {
        !self.types.is_empty()
    }
}

fn invalid_rule(err: globset::Error) -> BuildError {
    BuildError::InvalidOptions {
        message: format!("invalid ignore rule: {err}"),
    }
}
