//! In-memory model of an uploaded deployment archive
//!
//! A [`Descriptor`] is what the environment hands back after an archive has
//! been uploaded and installed server-side: the module name and revision plus
//! the ordered list of declared components. Feature archives additionally
//! carry a [`LayerInventory`] of their database layers. Descriptors are
//! immutable for the duration of a run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scope::WebScope;

/// Opaque, ordered revision id of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Revision(pub u64);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a declared component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Service,
    ProjectApp,
    WebApp,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Service => write!(f, "service"),
            ComponentKind::ProjectApp => write!(f, "project app"),
            ComponentKind::WebApp => write!(f, "web app"),
        }
    }
}

/// A single component declared by an archive.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub kind: ComponentKind,
    pub name: String,
    pub display_name: Option<String>,
    /// Scopes the component declares itself for; meaningful for web apps only.
    pub scopes: BTreeSet<WebScope>,
}

impl ComponentDescriptor {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            display_name: None,
            scopes: BTreeSet::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_scope(mut self, scope: WebScope) -> Self {
        self.scopes.insert(scope);
        self
    }
}

/// Database layers referenced by a feature archive: the ones the archive
/// already knows a destination for, and the ones it does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInventory {
    #[serde(default)]
    pub mapped: BTreeMap<String, String>,
    #[serde(default)]
    pub unmapped: BTreeSet<String>,
}

/// Parsed manifest of an uploaded archive.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub display_name: Option<String>,
    pub revision: Revision,
    pub components: Vec<ComponentDescriptor>,
    /// Present for feature archives only.
    pub layers: Option<LayerInventory>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, revision: Revision) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            revision,
            components: Vec::new(),
            layers: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_layers(mut self, layers: LayerInventory) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Declared components of one kind, in declaration order.
    pub fn components_of(
        &self,
        kind: ComponentKind,
    ) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter().filter(move |c| c.kind == kind)
    }

    /// Look a component up by its declared name or its display name.
    ///
    /// An exact (case-insensitive) name match wins and yields exactly that
    /// component. Otherwise all components of the kind whose display name
    /// matches are returned, so the caller can report an ambiguous lookup.
    pub fn find_components(
        &self,
        kind: ComponentKind,
        name_or_display_name: &str,
    ) -> Vec<&ComponentDescriptor> {
        if let Some(component) = self
            .components_of(kind)
            .find(|c| c.name.eq_ignore_ascii_case(name_or_display_name))
        {
            return vec![component];
        }
        self.components_of(kind)
            .filter(|c| {
                c.display_name
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(name_or_display_name))
            })
            .collect()
    }
}
