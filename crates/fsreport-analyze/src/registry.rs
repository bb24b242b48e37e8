//! Resolution of analyser identifiers into constructed analysers.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use fsreport_core::{Diagnostic, FileTree};

use crate::analyser::{AnalysisResult, Analyser};
use crate::file_count::FileCountAnalyser;
use crate::file_type_count::FileTypeCountAnalyser;

/// Constructor registered for an analyser identifier.
pub type AnalyserFactory =
    Box<dyn Fn(Arc<FileTree>, &Path) -> AnalysisResult<Box<dyn Analyser>> + Send + Sync>;

/// An analyser constructed for one run, remembering the identifier it was
/// requested under.
#[derive(Debug)]
pub struct ResolvedAnalyser {
    /// Normalised identifier.
    pub id: String,
    /// The constructed analyser.
    pub analyser: Box<dyn Analyser>,
}

/// Outcome of resolving a requested identifier list.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Constructed analysers in requested order.
    pub analysers: Vec<ResolvedAnalyser>,
    /// One diagnostic per identifier that could not be resolved.
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Display names of the resolved analysers, in order.
    pub fn names(&self) -> Vec<String> {
        self.analysers
            .iter()
            .map(|r| r.analyser.name().to_string())
            .collect()
    }
}

/// Maps textual identifiers to analyser constructors.
///
/// Identifiers are matched case-insensitively after trimming whitespace.
pub struct AnalyserRegistry {
    factories: IndexMap<String, AnalyserFactory>,
}

impl AnalyserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create a registry holding the built-in analysers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(FileCountAnalyser::ID, |tree, root| {
            Ok(Box::new(FileCountAnalyser::new(tree, root)))
        });
        registry.register(FileTypeCountAnalyser::ID, |tree, root| {
            Ok(Box::new(FileTypeCountAnalyser::new(tree, root)))
        });
        registry
    }

    /// Register (or replace) the constructor for `id`.
    pub fn register<F>(&mut self, id: &str, factory: F) -> &mut Self
    where
        F: Fn(Arc<FileTree>, &Path) -> AnalysisResult<Box<dyn Analyser>> + Send + Sync + 'static,
    {
        self.factories.insert(normalize_id(id), Box::new(factory));
        self
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(&normalize_id(id))
    }

    /// Registered identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct the requested analysers against `tree`, preserving order.
    ///
    /// Unknown identifiers and failing constructors are skipped with a
    /// diagnostic; they never fail the resolution as a whole.
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        tree: &Arc<FileTree>,
        root_path: &Path,
    ) -> Resolution {
        let mut resolution = Resolution::default();

        for raw in requested {
            let id = normalize_id(raw.as_ref());
            let Some(factory) = self.factories.get(&id) else {
                warn!(analyser = %raw.as_ref(), "unresolved analyser");
                resolution
                    .diagnostics
                    .push(Diagnostic::unresolved_analyser(raw.as_ref().trim()));
                continue;
            };

            match factory(Arc::clone(tree), root_path) {
                Ok(analyser) => {
                    debug!(id = %id, name = analyser.name(), "resolved analyser");
                    resolution.analysers.push(ResolvedAnalyser { id, analyser });
                }
                Err(err) => {
                    warn!(analyser = %id, error = %err, "analyser construction failed");
                    resolution
                        .diagnostics
                        .push(Diagnostic::unresolved_analyser(&id).with_message(err.to_string()));
                }
            }
        }

        resolution
    }
}

impl Default for AnalyserRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for AnalyserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyserRegistry")
            .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Split a comma-separated analyser list, dropping empty tokens.
pub fn parse_analyser_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}
