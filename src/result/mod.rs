//! Per-component results and the aggregated outcome of a run
//!
//! Reconciliation failures are data, not control flow: every attempt on a
//! (component, target) pair produces exactly one [`ComponentResult`], and the
//! orchestrator collects them into an [`AggregatedResult`] in encounter
//! order. The aggregate never deduplicates — the same component installed
//! into two targets yields two entries.

use std::fmt;

use crate::descriptor::ComponentKind;
use crate::error::RolloutError;
use crate::scope::Target;

/// Outcome of reconciling one component against one target.
#[derive(Debug)]
pub enum ComponentResult {
    Installed {
        component: String,
        target: Target,
    },
    Updated {
        component: String,
        target: Target,
    },
    InstallFailed {
        component: String,
        target: Target,
        cause: RolloutError,
    },
    UpdateFailed {
        component: String,
        target: Target,
        cause: RolloutError,
    },
    NotFound {
        component: String,
        kind: ComponentKind,
    },
    AmbiguousMatch {
        component: String,
        kind: ComponentKind,
        candidates: Vec<String>,
    },
    DeployFailed {
        target: Target,
        cause: RolloutError,
    },
}

impl ComponentResult {
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            ComponentResult::Installed { .. } | ComponentResult::Updated { .. }
        )
    }
}

impl fmt::Display for ComponentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentResult::Installed { component, target } => {
                write!(f, "Successfully installed '{component}' into {target}.")
            }
            ComponentResult::Updated { component, target } => {
                write!(f, "Successfully updated '{component}' in {target}.")
            }
            ComponentResult::InstallFailed {
                component,
                target,
                cause,
            } => write!(f, "Error installing '{component}' into {target}: {cause}"),
            ComponentResult::UpdateFailed {
                component,
                target,
                cause,
            } => write!(f, "Error updating '{component}' in {target}: {cause}"),
            ComponentResult::NotFound { component, kind } => {
                write!(f, "{kind} component '{component}' not found.")
            }
            ComponentResult::AmbiguousMatch {
                component,
                kind,
                candidates,
            } => write!(
                f,
                "Multiple {kind} components found for '{component}': {}",
                candidates.join(", ")
            ),
            ComponentResult::DeployFailed { target, cause } => {
                write!(f, "Error deploying {target}: {cause}")
            }
        }
    }
}

/// Ordered, append-only collection of every result of one run.
#[derive(Debug, Default)]
pub struct AggregatedResult {
    results: Vec<ComponentResult>,
}

impl AggregatedResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ComponentResult) {
        self.results.push(result);
    }

    /// True iff at least one contained result is a failure variant.
    pub fn has_error(&self) -> bool {
        self.results.iter().any(ComponentResult::is_error)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ComponentResult] {
        &self.results
    }

    /// One line per failed component, in encounter order.
    pub fn error_report(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| r.is_error())
            .map(ToString::to_string)
            .collect()
    }
}

impl<'a> IntoIterator for &'a AggregatedResult {
    type Item = &'a ComponentResult;
    type IntoIter = std::slice::Iter<'a, ComponentResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
