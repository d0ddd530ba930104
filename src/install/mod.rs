//! Installation orchestration: one archive, one aggregated outcome
//!
//! The orchestrator drives a fixed phase order — upload, layer binding for
//! feature archives, services, project apps, web apps, deployment — and
//! records one [`ComponentResult`] per (component, target) pair. Only
//! precondition failures (bad parameters, a failed upload, a rejected layer
//! binding) abort the run; everything after the upload is isolated per
//! component. Phases run strictly sequentially: the environment's install
//! primitives are not safe under concurrent invocation for the same
//! component.

use tracing::{debug, error, info, warn};

use crate::client::Environment;
use crate::descriptor::ComponentKind;
use crate::error::{Result, RolloutError};
use crate::layers;
use crate::params::{BatchEntry, InstallationParameters};
use crate::progress::ProgressDisplay;
use crate::reconcile::Reconciler;
use crate::result::{AggregatedResult, ComponentResult};
use crate::scope::Target;

/// Drives installations against one environment.
pub struct Installer<'a, E: Environment> {
    env: &'a mut E,
}

impl<'a, E: Environment> Installer<'a, E> {
    pub fn new(env: &'a mut E) -> Self {
        Self { env }
    }

    /// Run one full installation.
    ///
    /// `Err` is reserved for fatal preconditions; once the archive is up,
    /// per-component failures land in the aggregate and the run continues.
    pub fn install(&mut self, params: &InstallationParameters) -> Result<AggregatedResult> {
        params.validate()?;
        if let Some(project) = &params.project {
            if !self.env.project_exists(project)? {
                return Err(RolloutError::ProjectNotFound {
                    name: project.clone(),
                });
            }
        }

        info!("installing archive '{}'...", params.archive.display());
        let descriptor = self.env.upload_archive(&params.archive)?;
        info!(
            "module '{}' (revision {}) installed",
            descriptor.name, descriptor.revision
        );

        if let Some(inventory) = &descriptor.layers {
            let expression =
                layers::parse_expression(params.layer_mapping.as_deref().unwrap_or(""))?;
            let mapping = layers::resolve(&expression, &inventory.mapped, &inventory.unmapped)?;
            for (source, destination) in &mapping {
                debug!("layer mapping: {source} -> {destination}");
            }
            self.env.activate_layers(&descriptor.name, &mapping)?;
        }

        let mut aggregate = AggregatedResult::new();
        let mut touched_web_apps: Vec<(Target, bool)> = Vec::new();
        {
            let mut reconciler = Reconciler::new(&mut *self.env, &descriptor);

            for component in descriptor.components_of(ComponentKind::Service) {
                let config = params.service_config(&component.name);
                aggregate.push(reconciler.reconcile_service(&component.name, config));
            }

            match &params.project {
                Some(project) => {
                    let target = Target::Project(project.clone());
                    for component in descriptor.components_of(ComponentKind::ProjectApp) {
                        aggregate.push(reconciler.reconcile(
                            ComponentKind::ProjectApp,
                            &component.name,
                            &target,
                            params.project_app_config.as_deref(),
                        ));
                    }
                }
                None => {
                    if descriptor
                        .components_of(ComponentKind::ProjectApp)
                        .next()
                        .is_some()
                    {
                        warn!(
                            "archive '{}' declares project apps, but no target project was named; skipping them",
                            descriptor.name
                        );
                    }
                }
            }

            for component in descriptor.components_of(ComponentKind::WebApp) {
                for scope in &params.web_app_scopes {
                    if !component.scopes.is_empty() && !component.scopes.contains(scope) {
                        debug!(
                            "component '{}' does not declare scope '{scope}', attempting anyway",
                            component.name
                        );
                    }
                    let target = Target::web_app(scope.clone(), params.project.as_deref());
                    let result = reconciler.reconcile(
                        ComponentKind::WebApp,
                        &component.name,
                        &target,
                        params.web_app_config(scope),
                    );
                    touched_web_apps.push((target, result.is_error()));
                    aggregate.push(result);
                }
            }
        }

        if params.deploy {
            self.deploy_touched_web_apps(touched_web_apps, &mut aggregate);
        }

        Ok(aggregate)
    }

    /// Deploy every distinct web-app target whose reconciliation succeeded.
    /// A failed deployment is recorded and does not undo prior results.
    fn deploy_touched_web_apps(
        &mut self,
        touched: Vec<(Target, bool)>,
        aggregate: &mut AggregatedResult,
    ) {
        let failed: Vec<&Target> = touched
            .iter()
            .filter(|(_, failed)| *failed)
            .map(|(target, _)| target)
            .collect();
        let mut deployed: Vec<&Target> = Vec::new();
        for (target, _) in &touched {
            if failed.contains(&target) || deployed.contains(&target) {
                continue;
            }
            deployed.push(target);
            match self.env.deploy_web_app(target) {
                Ok(true) => info!("deployed {target}"),
                Ok(false) => aggregate.push(ComponentResult::DeployFailed {
                    target: target.clone(),
                    cause: RolloutError::Environment {
                        operation: "deploy_web_app".to_string(),
                        message: "the environment reported an unsuccessful deployment"
                            .to_string(),
                    },
                }),
                Err(cause) => aggregate.push(ComponentResult::DeployFailed {
                    target: target.clone(),
                    cause,
                }),
            }
        }
    }
}

/// Outcome of one batch entry: the entry's aggregate, or the fatal error
/// that stopped it. Entries are independent either way.
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive: std::path::PathBuf,
    pub outcome: Result<AggregatedResult>,
}

impl BatchOutcome {
    pub fn has_error(&self) -> bool {
        match &self.outcome {
            Ok(aggregate) => aggregate.has_error(),
            Err(_) => true,
        }
    }
}

/// Run an ordered collection of installations one after another.
///
/// There is no cross-entry rollback: a fatal error in one entry is folded
/// into its outcome slot and the next entry still runs.
pub fn install_all<E: Environment>(
    env: &mut E,
    entries: Vec<BatchEntry>,
    progress: Option<&ProgressDisplay>,
) -> Vec<BatchOutcome> {
    let total = entries.len();
    let mut outcomes = Vec::with_capacity(total);
    for (index, entry) in entries.into_iter().enumerate() {
        let archive = entry.archive.clone();
        if let Some(progress) = progress {
            progress.update_entry(&archive.display().to_string(), index + 1, total);
        }
        let outcome = entry
            .into_parameters()
            .and_then(|params| Installer::new(env).install(&params));
        if let Err(e) = &outcome {
            error!("installation of '{}' failed: {e}", archive.display());
        }
        outcomes.push(BatchOutcome { archive, outcome });
        if let Some(progress) = progress {
            progress.inc_entry();
        }
    }
    if let Some(progress) = progress {
        progress.finish();
    }
    outcomes
}
