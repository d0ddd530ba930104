//! Install-vs-update reconciliation for single components
//!
//! The reconciler decides, per (component, target) pair, whether the
//! environment already uses the component there — making the operation an
//! update — or not, and performs it through the environment's idempotent
//! install primitive. Every outcome, including remote failures, is returned
//! as a [`ComponentResult`]; nothing raised here ever aborts the surrounding
//! run.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::client::Environment;
use crate::descriptor::{ComponentDescriptor, ComponentKind, Descriptor};
use crate::error::{Result, RolloutError};
use crate::result::ComponentResult;
use crate::scope::Target;

/// Reconciles the components of one descriptor against one environment.
pub struct Reconciler<'a, E: Environment> {
    env: &'a mut E,
    descriptor: &'a Descriptor,
}

impl<'a, E: Environment> Reconciler<'a, E> {
    pub fn new(env: &'a mut E, descriptor: &'a Descriptor) -> Self {
        Self { env, descriptor }
    }

    /// Reconcile one project-app or web-app component against one target.
    ///
    /// `name` may be the declared name or the display name; an unresolvable
    /// or ambiguous lookup is terminal for this component. A configuration
    /// upload failure demotes an otherwise successful result — the component
    /// only counts as reconciled once its configuration landed too.
    pub fn reconcile(
        &mut self,
        kind: ComponentKind,
        name: &str,
        target: &Target,
        config: Option<&Path>,
    ) -> ComponentResult {
        let component = match resolve_component(self.descriptor, kind, name) {
            Ok(component) => component.name.clone(),
            Err(result) => return result,
        };
        let module = self.descriptor.name.clone();

        let update = match self.env.usages(&module, &component) {
            Ok(usages) => usages.contains(target),
            Err(cause) => return failed(false, &component, target, cause),
        };
        if update {
            debug!("updating component '{module}:{component}' in {target}...");
        } else {
            debug!("installing component '{module}:{component}' into {target}...");
        }

        if let Err(cause) = self.env.install_component(&module, &component, target) {
            return failed(update, &component, target, cause);
        }

        if let Some(path) = config {
            if let Err(cause) = self.upload_config(&module, &component, Some(target), path) {
                return failed(update, &component, target, cause);
            }
        }

        if update {
            ComponentResult::Updated {
                component,
                target: target.clone(),
            }
        } else {
            ComponentResult::Installed {
                component,
                target: target.clone(),
            }
        }
    }

    /// Configure one service: upload its configuration if one was supplied,
    /// make sure it starts with the server, and restart it so the
    /// configuration takes effect. A service that was already running counts
    /// as updated.
    pub fn reconcile_service(&mut self, name: &str, config: Option<&Path>) -> ComponentResult {
        let component = match resolve_component(self.descriptor, ComponentKind::Service, name) {
            Ok(component) => component.name.clone(),
            Err(result) => return result,
        };
        let module = self.descriptor.name.clone();
        let target = Target::Server;

        let was_running = match self.env.is_running(&component) {
            Ok(running) => running,
            Err(cause) => return failed(false, &component, &target, cause),
        };

        match config {
            Some(path) => {
                if let Err(cause) = self.upload_config(&module, &component, None, path) {
                    return failed(was_running, &component, &target, cause);
                }
            }
            None => {
                info!("no configuration file for service '{module}:{component}', nothing to upload");
            }
        }

        if let Err(cause) = self.ensure_auto_start(&component) {
            return failed(was_running, &component, &target, cause);
        }

        debug!("restarting service '{module}:{component}'...");
        if let Err(cause) = self
            .env
            .stop_service(&component)
            .and_then(|()| self.env.start_service(&component))
        {
            return failed(was_running, &component, &target, cause);
        }
        match self.env.is_running(&component) {
            Ok(running) => info!(
                "service '{module}:{component}' is {}",
                if running { "RUNNING" } else { "STOPPED" }
            ),
            Err(_) => debug!("run state of service '{module}:{component}' unavailable"),
        }

        if was_running {
            ComponentResult::Updated { component, target }
        } else {
            ComponentResult::Installed { component, target }
        }
    }

    fn ensure_auto_start(&mut self, service: &str) -> Result<()> {
        if self.env.is_auto_start(service)? {
            return Ok(());
        }
        debug!("enabling autostart for service '{service}'");
        self.env.set_auto_start(service, true)
    }

    fn upload_config(
        &mut self,
        module: &str,
        component: &str,
        target: Option<&Target>,
        path: &Path,
    ) -> Result<()> {
        let contents = fs::read(path).map_err(|e| RolloutError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("uploading configuration file '{file_name}' for '{module}:{component}'...");
        let mut sink = self.env.config_sink(module, component, target)?;
        sink.store(&file_name, &contents)
    }
}

fn failed(update: bool, component: &str, target: &Target, cause: RolloutError) -> ComponentResult {
    if update {
        ComponentResult::UpdateFailed {
            component: component.to_string(),
            target: target.clone(),
            cause,
        }
    } else {
        ComponentResult::InstallFailed {
            component: component.to_string(),
            target: target.clone(),
            cause,
        }
    }
}

fn resolve_component<'d>(
    descriptor: &'d Descriptor,
    kind: ComponentKind,
    name: &str,
) -> std::result::Result<&'d ComponentDescriptor, ComponentResult> {
    let matches = descriptor.find_components(kind, name);
    match matches.as_slice() {
        [] => Err(ComponentResult::NotFound {
            component: name.to_string(),
            kind,
        }),
        [component] => Ok(component),
        _ => Err(ComponentResult::AmbiguousMatch {
            component: name.to_string(),
            kind,
            candidates: matches.iter().map(|c| c.name.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockEnvironment;
    use crate::descriptor::Revision;
    use crate::scope::WebScope;

    fn descriptor() -> Descriptor {
        Descriptor::new("forms-module", Revision(1))
            .with_component(ComponentDescriptor::new(ComponentKind::Service, "indexer"))
            .with_component(
                ComponentDescriptor::new(ComponentKind::ProjectApp, "forms-app")
                    .with_display_name("Forms"),
            )
            .with_component(ComponentDescriptor::new(ComponentKind::WebApp, "forms-web"))
            .with_component(
                ComponentDescriptor::new(ComponentKind::WebApp, "legacy-a")
                    .with_display_name("Legacy"),
            )
            .with_component(
                ComponentDescriptor::new(ComponentKind::WebApp, "legacy-b")
                    .with_display_name("Legacy"),
            )
    }

    fn config_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_first_reconcile_installs_second_updates() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let first = reconciler.reconcile(ComponentKind::ProjectApp, "forms-app", &target, None);
        assert!(matches!(first, ComponentResult::Installed { .. }));

        let second = reconciler.reconcile(ComponentKind::ProjectApp, "forms-app", &target, None);
        assert!(matches!(second, ComponentResult::Updated { .. }));
    }

    #[test]
    fn test_existing_usage_is_an_update() {
        let target = Target::web_app(WebScope::Webedit, Some("Mithras"));
        let mut env = MockEnvironment::new().with_usage("forms-web", target.clone());
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::WebApp, "forms-web", &target, None);
        assert!(matches!(result, ComponentResult::Updated { .. }));
    }

    #[test]
    fn test_install_failure_is_reported_not_raised() {
        let mut env = MockEnvironment::new().failing_install("forms-app");
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::ProjectApp, "forms-app", &target, None);
        assert!(matches!(result, ComponentResult::InstallFailed { .. }));
    }

    #[test]
    fn test_update_failure_keeps_the_update_label() {
        let target = Target::Project("Mithras".to_string());
        let mut env = MockEnvironment::new()
            .with_usage("forms-app", target.clone())
            .failing_install("forms-app");
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::ProjectApp, "forms-app", &target, None);
        assert!(matches!(result, ComponentResult::UpdateFailed { .. }));
    }

    #[test]
    fn test_config_upload_failure_demotes_the_result() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config_file(&temp, "forms.json");
        let mut env = MockEnvironment::new().failing_config("forms-app");
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(
            ComponentKind::ProjectApp,
            "forms-app",
            &target,
            Some(&config),
        );
        assert!(matches!(result, ComponentResult::InstallFailed { .. }));
        // the install itself went through before the configuration failed
        assert_eq!(env.installed().len(), 1);
    }

    #[test]
    fn test_config_upload_lands_after_install() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config_file(&temp, "forms.json");
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(
            ComponentKind::ProjectApp,
            "forms-app",
            &target,
            Some(&config),
        );
        assert!(matches!(result, ComponentResult::Installed { .. }));
        assert_eq!(
            env.stored_configs(),
            vec![("forms-app".to_string(), "forms.json".to_string())]
        );
    }

    #[test]
    fn test_lookup_by_display_name() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::ProjectApp, "Forms", &target, None);
        assert!(
            matches!(result, ComponentResult::Installed { ref component, .. } if component == "forms-app")
        );
    }

    #[test]
    fn test_unknown_component_is_not_found() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::ProjectApp, "nope", &target, None);
        assert!(matches!(result, ComponentResult::NotFound { .. }));
        assert!(env.installed().is_empty());
    }

    #[test]
    fn test_ambiguous_display_name_is_terminal() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::web_app(WebScope::Webedit, Some("Mithras"));
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(ComponentKind::WebApp, "Legacy", &target, None);
        match result {
            ComponentResult::AmbiguousMatch { candidates, .. } => {
                assert_eq!(candidates, vec!["legacy-a", "legacy-b"]);
            }
            other => panic!("expected AmbiguousMatch, got {other:?}"),
        }
        assert!(env.installed().is_empty());
    }

    #[test]
    fn test_service_restart_enables_autostart() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile_service("indexer", None);
        assert!(matches!(result, ComponentResult::Installed { .. }));
        assert!(env.is_auto_start_enabled("indexer"));
        assert_eq!(env.restarted_services(), vec!["indexer".to_string()]);
    }

    #[test]
    fn test_running_service_counts_as_updated() {
        let mut env = MockEnvironment::new().with_running_service("indexer");
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile_service("indexer", None);
        assert!(matches!(result, ComponentResult::Updated { .. }));
    }

    #[test]
    fn test_service_config_is_uploaded_before_restart() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config_file(&temp, "indexer.json");
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile_service("indexer", Some(&config));
        assert!(matches!(result, ComponentResult::Installed { .. }));
        assert_eq!(
            env.stored_configs(),
            vec![("indexer".to_string(), "indexer.json".to_string())]
        );
    }

    #[test]
    fn test_service_start_failure_is_reported() {
        let mut env = MockEnvironment::new().failing_start("indexer");
        let descriptor = descriptor();
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile_service("indexer", None);
        assert!(matches!(result, ComponentResult::InstallFailed { .. }));
    }

    #[test]
    fn test_missing_config_file_demotes_the_result() {
        let mut env = MockEnvironment::new();
        let descriptor = descriptor();
        let target = Target::Project("Mithras".to_string());
        let mut reconciler = Reconciler::new(&mut env, &descriptor);

        let result = reconciler.reconcile(
            ComponentKind::ProjectApp,
            "forms-app",
            &target,
            Some(Path::new("/does/not/exist.json")),
        );
        assert!(matches!(
            result,
            ComponentResult::InstallFailed {
                cause: RolloutError::FileReadFailed { .. },
                ..
            }
        ));
    }
}
