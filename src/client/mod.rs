//! Capability surface of the target environment
//!
//! The remote client lives outside this crate; the orchestrator and the
//! reconciler only ever talk to this trait. Every call blocks until the
//! server-side operation has completed — long-running operations (archive
//! analysis, archive installation) are waited on inside the implementation,
//! with no timeout surface. Install primitives are idempotent at this
//! boundary: installing an already-present component updates it.

use std::path::Path;

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::layers::LayerMapping;
use crate::scope::Target;

#[cfg(test)]
pub(crate) mod mock;

/// Blocking capability interface to one target environment.
pub trait Environment {
    /// Upload an archive, install the module server-side and return its
    /// parsed descriptor. Failing here fails the whole run.
    fn upload_archive(&mut self, archive: &Path) -> Result<Descriptor>;

    /// Install (or, when already present, update) a component in a target.
    fn install_component(&mut self, module: &str, component: &str, target: &Target)
    -> Result<()>;

    /// Targets where the component is already present.
    fn usages(&mut self, module: &str, component: &str) -> Result<Vec<Target>>;

    /// File-system-like handle for a component's configuration file set.
    /// `target` is `None` for services, whose configuration is server-wide.
    fn config_sink(
        &mut self,
        module: &str,
        component: &str,
        target: Option<&Target>,
    ) -> Result<Box<dyn ConfigSink>>;

    fn is_auto_start(&mut self, service: &str) -> Result<bool>;

    fn set_auto_start(&mut self, service: &str, enabled: bool) -> Result<()>;

    fn stop_service(&mut self, service: &str) -> Result<()>;

    fn start_service(&mut self, service: &str) -> Result<()>;

    fn is_running(&mut self, service: &str) -> Result<bool>;

    /// Activate the database-layer bindings of a feature archive.
    fn activate_layers(&mut self, module: &str, mapping: &LayerMapping) -> Result<()>;

    /// Deploy a web app; `Ok(false)` means the environment reported an
    /// unsuccessful deployment without raising an error.
    fn deploy_web_app(&mut self, target: &Target) -> Result<bool>;

    fn project_exists(&mut self, name: &str) -> Result<bool>;
}

/// Write handle for one component's configuration files.
pub trait ConfigSink {
    fn store(&mut self, file_name: &str, contents: &[u8]) -> Result<()>;
}
