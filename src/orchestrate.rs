//! Per-target migration diffs.
//!
//! Each scaffold target (`chain`, `module`, `list`, ...) is diffed between two
//! generator versions. Because every feature target is generated on top of a
//! module, which is generated on top of a chain, the raw diff of a feature
//! repeats the changes of its prerequisites. The [`Orchestrator`] removes them:
//!
//! - `chain` is emitted as is
//! - `module` has the `chain` diff subtracted
//! - every other target has the already-subtracted `module` diff subtracted
//!
//! This two-level hierarchy is the default [`SubtractionPolicy`].

use crate::diff::UnifiedDiff;
use crate::ignore::IgnoreGlobSet;
use crate::subtract::subtract_all;
use crate::tree::{TreeDiffError, TreeDiffer};
use error_set::error_set;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Target every other target is ultimately built on
pub const CHAIN: &str = "chain";

/// Target every feature target is built on
pub const MODULE: &str = "module";

/// Targets produced by the scaffold runner
pub const DEFAULT_TARGETS: &[&str] = &[
    "chain", "module", "list", "map", "single", "type", "message", "query", "packet",
];

/// Paths left out of migration diffs: version control, docs, lockfiles, tests,
/// generated protobuf code, editor and build artifacts, and web assets.
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    // version control
    "**/.git/**",
    "**/.github/**",
    "**/.gitignore",
    // docs
    "**.md",
    // lockfiles
    "**/go.sum",
    "**/package-lock.json",
    "**/yarn.lock",
    "**/pnpm-lock.yaml",
    // tests
    "**_test.go",
    "**/testutil/**",
    // generated protobuf and gateway code
    "**.pb.go",
    "**.pb.gw.go",
    "**.pulsar.go",
    "**/docs/static/openapi.yml",
    // editor and build artifacts
    "**/.idea/**",
    "**/.vscode/**",
    "**/.DS_Store",
    "**/build/**",
    "**/dist/**",
    "**/node_modules/**",
    // web assets
    "**.html",
    "**.css",
    "**.scss",
    "**.js",
    "**.ts",
    "**.tsx",
    "**.vue",
    "**.svg",
    "**.png",
    "**.ico",
];

error_set! {
    /// Errors from computing per-target migration diffs
    OrchestrateError := {
        /// A subtraction policy makes a target its own prerequisite
        #[display("Prerequisite cycle through target '{target}'")]
        PrerequisiteCycle { target: String },
        TreeDiffError(TreeDiffError),
    }
}

/// The two directories compared for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTrees {
    /// Output of the older generator version
    pub origin: PathBuf,
    /// Output of the newer generator version
    pub modified: PathBuf,
}

impl TargetTrees {
    pub fn new(origin: impl Into<PathBuf>, modified: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into(),
            modified: modified.into(),
        }
    }
}

/// Map each target name to its subdirectory under both scaffold roots.
pub fn target_pairs<I, S>(from_root: &Path, to_root: &Path, names: I) -> BTreeMap<String, TargetTrees>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            (
                name.to_string(),
                TargetTrees::new(from_root.join(name), to_root.join(name)),
            )
        })
        .collect()
}

/// Which target's diff is subtracted from which.
///
/// The root target has no prerequisite, explicit entries name their own, and
/// every other target falls back to a shared prerequisite. The default is
/// root `chain`, `module` on `chain`, everything else on `module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtractionPolicy {
    root: String,
    fallback: String,
    explicit: BTreeMap<String, String>,
}

impl Default for SubtractionPolicy {
    fn default() -> Self {
        Self {
            root: CHAIN.to_string(),
            fallback: MODULE.to_string(),
            explicit: BTreeMap::from([(MODULE.to_string(), CHAIN.to_string())]),
        }
    }
}

impl SubtractionPolicy {
    /// Give `target` its own prerequisite instead of the fallback
    #[must_use]
    pub fn with_prerequisite(mut self, target: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        self.explicit.insert(target.into(), prerequisite.into());
        self
    }

    /// The target whose diff is subtracted from `target`'s, if any
    pub fn prerequisite(&self, target: &str) -> Option<&str> {
        if target == self.root {
            return None;
        }
        Some(
            self.explicit
                .get(target)
                .map(String::as_str)
                .unwrap_or(&self.fallback),
        )
    }
}

/// Per-target diffs, each list sorted by file path
pub type TargetDiffs = BTreeMap<String, Vec<UnifiedDiff>>;

/// Diffs every target and applies the subtraction policy.
#[derive(Debug, Clone)]
pub struct Orchestrator<'a> {
    ignore: &'a IgnoreGlobSet,
    policy: SubtractionPolicy,
    context_lines: usize,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ignore: &'a IgnoreGlobSet) -> Self {
        Self {
            ignore,
            policy: SubtractionPolicy::default(),
            context_lines: crate::diff::DEFAULT_CONTEXT_LINES,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SubtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Diff each target's trees and subtract its prerequisite.
    ///
    /// Prerequisites are computed before the targets that depend on them, and
    /// a target is reduced by its prerequisite's *reduced* diffs. A
    /// prerequisite missing from `targets` subtracts nothing.
    ///
    /// # Errors
    ///
    /// Fails before any work on a prerequisite cycle, otherwise on the first
    /// tree diff error. No partial result is returned.
    pub fn run(&self, targets: &BTreeMap<String, TargetTrees>) -> Result<TargetDiffs, OrchestrateError> {
        let order = self.resolution_order(targets)?;
        let differ = TreeDiffer::new(self.ignore).context_lines(self.context_lines);
        let mut results = TargetDiffs::new();

        for name in order {
            let Some(trees) = targets.get(name) else {
                continue;
            };

            let diffs: Vec<UnifiedDiff> = differ
                .compute(&trees.origin, &trees.modified)?
                .into_values()
                .collect();
            let raw = diffs.len();

            let diffs = match self.policy.prerequisite(name) {
                Some(prerequisite) => match results.get(prerequisite) {
                    Some(base) => subtract_all(&diffs, base),
                    None => {
                        warn!(target_name = %name, prerequisite, "prerequisite not diffed, nothing subtracted");
                        diffs
                    }
                },
                None => diffs,
            };

            info!(target_name = %name, files = diffs.len(), raw_files = raw, "target diffed");
            results.insert(name.to_string(), diffs);
        }

        Ok(results)
    }

    /// Targets ordered so each comes after its prerequisite
    fn resolution_order<'t>(
        &self,
        targets: &'t BTreeMap<String, TargetTrees>,
    ) -> Result<Vec<&'t str>, OrchestrateError> {
        let mut order = Vec::with_capacity(targets.len());
        let mut placed = HashSet::new();

        for name in targets.keys() {
            let mut pending: Vec<&'t str> = Vec::new();
            let mut current = Some(name.as_str());

            while let Some(target) = current {
                if placed.contains(target) {
                    break;
                }
                if pending.contains(&target) {
                    return Err(OrchestrateError::PrerequisiteCycle {
                        target: target.to_string(),
                    });
                }
                pending.push(target);
                current = self
                    .policy
                    .prerequisite(target)
                    .and_then(|p| targets.get_key_value(p))
                    .map(|(key, _)| key.as_str());
            }

            for target in pending.into_iter().rev() {
                placed.insert(target);
                order.push(target);
            }
        }

        debug!(?order, "resolution order");
        Ok(order)
    }
}

/// Diff every target with the default policy, see [`Orchestrator::run`].
///
/// # Errors
///
/// Fails on the first tree diff error.
pub fn orchestrate(
    targets: &BTreeMap<String, TargetTrees>,
    ignore: &IgnoreGlobSet,
) -> Result<TargetDiffs, OrchestrateError> {
    Orchestrator::new(ignore).run(targets)
}
