//! Scriptable in-memory environment used by the unit tests

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use super::{ConfigSink, Environment};
use crate::descriptor::Descriptor;
use crate::error::{Result, RolloutError};
use crate::layers::LayerMapping;
use crate::scope::Target;

#[derive(Default)]
struct MockState {
    descriptor: Option<Descriptor>,
    projects: BTreeSet<String>,
    usages: Vec<(String, Target)>,
    running: BTreeSet<String>,
    auto_start: BTreeSet<String>,
    fail_upload: bool,
    fail_activate_layers: bool,
    fail_install: BTreeSet<String>,
    fail_config: BTreeSet<String>,
    fail_start: BTreeSet<String>,
    fail_deploy: Vec<Target>,
    installed: Vec<(String, Target)>,
    stored_configs: Vec<(String, String)>,
    deployed: Vec<Target>,
    activated_mapping: Option<LayerMapping>,
    restarts: Vec<String>,
}

fn remote_error(operation: &str, message: impl Into<String>) -> RolloutError {
    RolloutError::Environment {
        operation: operation.to_string(),
        message: message.into(),
    }
}

/// In-memory [`Environment`] with canned state and per-component failure
/// injection. Successful component installs are added to the usage set, so a
/// second reconciliation of the same pair observes an update.
#[derive(Clone, Default)]
pub struct MockEnvironment {
    state: Rc<RefCell<MockState>>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(self, descriptor: Descriptor) -> Self {
        self.state.borrow_mut().descriptor = Some(descriptor);
        self
    }

    pub fn with_project(self, name: &str) -> Self {
        self.state.borrow_mut().projects.insert(name.to_string());
        self
    }

    pub fn with_usage(self, component: &str, target: Target) -> Self {
        self.state
            .borrow_mut()
            .usages
            .push((component.to_string(), target));
        self
    }

    pub fn with_running_service(self, service: &str) -> Self {
        self.state.borrow_mut().running.insert(service.to_string());
        self
    }

    pub fn failing_upload(self) -> Self {
        self.state.borrow_mut().fail_upload = true;
        self
    }

    pub fn failing_layer_activation(self) -> Self {
        self.state.borrow_mut().fail_activate_layers = true;
        self
    }

    pub fn failing_install(self, component: &str) -> Self {
        self.state
            .borrow_mut()
            .fail_install
            .insert(component.to_string());
        self
    }

    pub fn failing_config(self, component: &str) -> Self {
        self.state
            .borrow_mut()
            .fail_config
            .insert(component.to_string());
        self
    }

    pub fn failing_start(self, service: &str) -> Self {
        self.state
            .borrow_mut()
            .fail_start
            .insert(service.to_string());
        self
    }

    pub fn failing_deploy(self, target: Target) -> Self {
        self.state.borrow_mut().fail_deploy.push(target);
        self
    }

    pub fn installed(&self) -> Vec<(String, Target)> {
        self.state.borrow().installed.clone()
    }

    pub fn stored_configs(&self) -> Vec<(String, String)> {
        self.state.borrow().stored_configs.clone()
    }

    pub fn deployed(&self) -> Vec<Target> {
        self.state.borrow().deployed.clone()
    }

    pub fn activated_mapping(&self) -> Option<LayerMapping> {
        self.state.borrow().activated_mapping.clone()
    }

    pub fn restarted_services(&self) -> Vec<String> {
        self.state.borrow().restarts.clone()
    }

    pub fn is_auto_start_enabled(&self, service: &str) -> bool {
        self.state.borrow().auto_start.contains(service)
    }
}

impl Environment for MockEnvironment {
    fn upload_archive(&mut self, archive: &Path) -> Result<Descriptor> {
        let state = self.state.borrow();
        if state.fail_upload {
            return Err(remote_error("upload_archive", "connection reset"));
        }
        state
            .descriptor
            .clone()
            .ok_or_else(|| RolloutError::ArchiveInstallFailed {
                path: archive.display().to_string(),
                reason: "no descriptor staged".to_string(),
            })
    }

    fn install_component(
        &mut self,
        _module: &str,
        component: &str,
        target: &Target,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_install.contains(component) {
            return Err(remote_error(
                "install_component",
                format!("server refused component '{component}'"),
            ));
        }
        state.installed.push((component.to_string(), target.clone()));
        state.usages.push((component.to_string(), target.clone()));
        Ok(())
    }

    fn usages(&mut self, _module: &str, component: &str) -> Result<Vec<Target>> {
        Ok(self
            .state
            .borrow()
            .usages
            .iter()
            .filter(|(name, _)| name == component)
            .map(|(_, target)| target.clone())
            .collect())
    }

    fn config_sink(
        &mut self,
        _module: &str,
        component: &str,
        _target: Option<&Target>,
    ) -> Result<Box<dyn ConfigSink>> {
        Ok(Box::new(MockSink {
            state: Rc::clone(&self.state),
            component: component.to_string(),
        }))
    }

    fn is_auto_start(&mut self, service: &str) -> Result<bool> {
        Ok(self.state.borrow().auto_start.contains(service))
    }

    fn set_auto_start(&mut self, service: &str, enabled: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if enabled {
            state.auto_start.insert(service.to_string());
        } else {
            state.auto_start.remove(service);
        }
        Ok(())
    }

    fn stop_service(&mut self, service: &str) -> Result<()> {
        self.state.borrow_mut().running.remove(service);
        Ok(())
    }

    fn start_service(&mut self, service: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_start.contains(service) {
            return Err(remote_error(
                "start_service",
                format!("service '{service}' refused to start"),
            ));
        }
        state.running.insert(service.to_string());
        state.restarts.push(service.to_string());
        Ok(())
    }

    fn is_running(&mut self, service: &str) -> Result<bool> {
        Ok(self.state.borrow().running.contains(service))
    }

    fn activate_layers(&mut self, _module: &str, mapping: &LayerMapping) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_activate_layers {
            return Err(remote_error("activate_layers", "layer binding rejected"));
        }
        state.activated_mapping = Some(mapping.clone());
        Ok(())
    }

    fn deploy_web_app(&mut self, target: &Target) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.fail_deploy.contains(target) {
            return Ok(false);
        }
        state.deployed.push(target.clone());
        Ok(true)
    }

    fn project_exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.state.borrow().projects.contains(name))
    }
}

struct MockSink {
    state: Rc<RefCell<MockState>>,
    component: String,
}

impl ConfigSink for MockSink {
    fn store(&mut self, file_name: &str, _contents: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_config.contains(&self.component) {
            return Err(remote_error(
                "config_sink",
                format!("could not store '{file_name}'"),
            ));
        }
        state
            .stored_configs
            .push((self.component.clone(), file_name.to_string()));
        Ok(())
    }
}
