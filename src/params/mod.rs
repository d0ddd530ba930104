//! Installation parameters and the batch configuration format
//!
//! One [`InstallationParameters`] value describes a single archive
//! installation and is read-only once built. The builder accepts the raw
//! string forms the configuration surface uses (comma-separated `name=path`
//! lists, scope lists, the layer-mapping expression) and parses them up
//! front, so a malformed value fails before any component is touched.
//!
//! The batch format is an ordered JSON array with one [`BatchEntry`] per
//! independent installation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, RolloutError};
use crate::layers;
use crate::scope::{self, WebScope};

/// Everything one installation run needs, validated before use.
#[derive(Debug, Clone)]
pub struct InstallationParameters {
    pub archive: PathBuf,
    pub project: Option<String>,
    pub web_app_scopes: Vec<WebScope>,
    pub deploy: bool,
    pub service_configs: BTreeMap<String, PathBuf>,
    pub project_app_config: Option<PathBuf>,
    pub web_app_configs: BTreeMap<WebScope, PathBuf>,
    /// Raw mapping expression; resolved against the archive's layer
    /// inventory at install time. Parse-checked by the builder.
    pub layer_mapping: Option<String>,
}

impl InstallationParameters {
    pub fn builder(archive: impl Into<PathBuf>) -> InstallationParametersBuilder {
        InstallationParametersBuilder::new(archive.into())
    }

    pub fn service_config(&self, name: &str) -> Option<&Path> {
        self.service_configs.get(name).map(PathBuf::as_path)
    }

    pub fn web_app_config(&self, scope: &WebScope) -> Option<&Path> {
        self.web_app_configs.get(scope).map(PathBuf::as_path)
    }

    /// Local validation: the archive and every referenced configuration file
    /// must exist and be regular files. Project existence is checked against
    /// the environment at install start.
    pub fn validate(&self) -> Result<()> {
        if !is_regular_file(&self.archive) {
            return Err(RolloutError::ArchiveNotFound {
                path: self.archive.display().to_string(),
            });
        }
        for (name, path) in &self.service_configs {
            ensure_regular_file(name, path)?;
        }
        if let Some(path) = &self.project_app_config {
            ensure_regular_file("project app", path)?;
        }
        for (scope, path) in &self.web_app_configs {
            ensure_regular_file(&scope.to_string(), path)?;
        }
        Ok(())
    }
}

fn is_regular_file(path: &Path) -> bool {
    dunce::canonicalize(path)
        .map(|canonical| canonical.is_file())
        .unwrap_or(false)
}

fn ensure_regular_file(component: &str, path: &Path) -> Result<()> {
    match dunce::canonicalize(path) {
        Err(_) => Err(RolloutError::ConfigFileNotFound {
            component: component.to_string(),
            path: path.display().to_string(),
        }),
        Ok(canonical) if !canonical.is_file() => Err(RolloutError::ConfigFileNotRegular {
            component: component.to_string(),
            path: path.display().to_string(),
        }),
        Ok(_) => Ok(()),
    }
}

/// Builder accepting the raw string forms of the configuration surface.
#[derive(Debug, Default)]
pub struct InstallationParametersBuilder {
    archive: PathBuf,
    project: Option<String>,
    web_app_scopes: Option<String>,
    deploy: bool,
    service_config_files: Option<String>,
    project_app_config: Option<PathBuf>,
    web_app_config_files: Option<String>,
    layer_mapping: Option<String>,
}

impl InstallationParametersBuilder {
    fn new(archive: PathBuf) -> Self {
        Self {
            archive,
            deploy: true,
            ..Self::default()
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Comma-separated scope list, e.g. `webedit,global(root)`.
    pub fn web_app_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.web_app_scopes = Some(scopes.into());
        self
    }

    pub fn deploy(mut self, deploy: bool) -> Self {
        self.deploy = deploy;
        self
    }

    /// Comma-separated `service=path` list.
    pub fn service_config_files(mut self, files: impl Into<String>) -> Self {
        self.service_config_files = Some(files.into());
        self
    }

    pub fn project_app_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_app_config = Some(path.into());
        self
    }

    /// Comma-separated `scope=path` list.
    pub fn web_app_config_files(mut self, files: impl Into<String>) -> Self {
        self.web_app_config_files = Some(files.into());
        self
    }

    pub fn layer_mapping(mut self, expression: impl Into<String>) -> Self {
        self.layer_mapping = Some(expression.into());
        self
    }

    pub fn build(self) -> Result<InstallationParameters> {
        let web_app_scopes =
            scope::parse_scope_list(self.web_app_scopes.as_deref().unwrap_or(""))?;
        let service_configs =
            parse_named_paths("service configuration files", self.service_config_files.as_deref())?;
        let web_app_configs =
            parse_named_paths("web app configuration files", self.web_app_config_files.as_deref())?
                .into_iter()
                .map(|(scope, path)| Ok((WebScope::parse(&scope)?, path)))
                .collect::<Result<BTreeMap<_, _>>>()?;
        if let Some(expression) = self.layer_mapping.as_deref() {
            // parse-check only; resolution needs the archive's inventory
            layers::parse_expression(expression)?;
        }
        Ok(InstallationParameters {
            archive: self.archive,
            project: self.project.filter(|p| !p.trim().is_empty()),
            web_app_scopes,
            deploy: self.deploy,
            service_configs,
            project_app_config: self.project_app_config,
            web_app_configs,
            layer_mapping: self.layer_mapping,
        })
    }
}

fn parse_named_paths(list: &str, raw: Option<&str>) -> Result<BTreeMap<String, PathBuf>> {
    let mut entries = BTreeMap::new();
    let Some(raw) = raw else {
        return Ok(entries);
    };
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, path) = part.split_once('=').ok_or_else(|| {
            RolloutError::InvalidListEntry {
                list: list.to_string(),
                entry: part.to_string(),
            }
        })?;
        let name = name.trim();
        let path = path.trim();
        if name.is_empty() || path.is_empty() {
            return Err(RolloutError::InvalidListEntry {
                list: list.to_string(),
                entry: part.to_string(),
            });
        }
        entries.insert(name.to_string(), PathBuf::from(path));
    }
    Ok(entries)
}

/// One entry of the JSON batch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchEntry {
    pub archive: PathBuf,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub web_app_scopes: Vec<String>,
    #[serde(default = "default_deploy")]
    pub deploy: bool,
    #[serde(default)]
    pub service_configs: Vec<String>,
    #[serde(default)]
    pub project_app_config: Option<PathBuf>,
    #[serde(default)]
    pub web_app_configs: Vec<String>,
    #[serde(default)]
    pub layer_mapping: Option<String>,
}

fn default_deploy() -> bool {
    true
}

impl BatchEntry {
    pub fn into_parameters(self) -> Result<InstallationParameters> {
        let mut builder = InstallationParameters::builder(self.archive)
            .web_app_scopes(self.web_app_scopes.join(","))
            .deploy(self.deploy)
            .service_config_files(self.service_configs.join(","))
            .web_app_config_files(self.web_app_configs.join(","));
        if let Some(project) = self.project {
            builder = builder.project(project);
        }
        if let Some(path) = self.project_app_config {
            builder = builder.project_app_config_file(path);
        }
        if let Some(expression) = self.layer_mapping {
            builder = builder.layer_mapping(expression);
        }
        builder.build()
    }
}

/// Load the ordered batch configuration from a JSON file.
pub fn load_batch_config(path: &Path) -> Result<Vec<BatchEntry>> {
    let raw = fs::read_to_string(path).map_err(|e| RolloutError::BatchConfigRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| RolloutError::BatchConfigParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
