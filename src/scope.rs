//! Web scopes and installation targets
//!
//! A component lands either in the server itself (services), in a project
//! (project apps) or in a web app addressed by a scope and, for non-global
//! scopes, a project.

use std::fmt;

use crate::error::{Result, RolloutError};

/// A web-app scope of the target environment.
///
/// Global scopes address a server-wide web app by name and carry no project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WebScope {
    Preview,
    Staging,
    Webedit,
    Live,
    Global(String),
}

impl WebScope {
    /// Parse a single scope from its textual form, e.g. `webedit` or
    /// `global(root)`. Matching is case-insensitive; the global web-app name
    /// keeps its case.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "preview" => Ok(WebScope::Preview),
            "staging" => Ok(WebScope::Staging),
            "webedit" => Ok(WebScope::Webedit),
            "live" => Ok(WebScope::Live),
            lower => {
                if lower.starts_with("global(") && trimmed.ends_with(')') {
                    let name = trimmed["global(".len()..trimmed.len() - 1].trim();
                    if !name.is_empty() {
                        return Ok(WebScope::Global(name.to_string()));
                    }
                }
                Err(RolloutError::UnknownScope {
                    scope: trimmed.to_string(),
                })
            }
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, WebScope::Global(_))
    }
}

impl fmt::Display for WebScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebScope::Preview => write!(f, "preview"),
            WebScope::Staging => write!(f, "staging"),
            WebScope::Webedit => write!(f, "webedit"),
            WebScope::Live => write!(f, "live"),
            WebScope::Global(name) => write!(f, "global({name})"),
        }
    }
}

/// Parse a comma-separated scope list; empty input yields no scopes.
pub fn parse_scope_list(input: &str) -> Result<Vec<WebScope>> {
    let mut scopes = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        scopes.push(WebScope::parse(part)?);
    }
    Ok(scopes)
}

/// Where a component gets installed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The server itself; services live here.
    Server,
    /// A named project; project apps live here.
    Project(String),
    /// A web app addressed by scope and, unless the scope is global, project.
    WebApp {
        scope: WebScope,
        project: Option<String>,
    },
}

impl Target {
    /// Build the web-app target for a scope: global scopes drop the project.
    pub fn web_app(scope: WebScope, project: Option<&str>) -> Self {
        let project = if scope.is_global() {
            None
        } else {
            project.map(str::to_string)
        };
        Target::WebApp { scope, project }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Server => write!(f, "the server"),
            Target::Project(name) => write!(f, "project '{name}'"),
            Target::WebApp {
                scope,
                project: Some(project),
            } => write!(f, "web app '{scope}' of project '{project}'"),
            Target::WebApp {
                scope,
                project: None,
            } => write!(f, "web app '{scope}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_scopes() {
        assert_eq!(WebScope::parse("preview").unwrap(), WebScope::Preview);
        assert_eq!(WebScope::parse("STAGING").unwrap(), WebScope::Staging);
        assert_eq!(WebScope::parse(" webedit ").unwrap(), WebScope::Webedit);
        assert_eq!(WebScope::parse("live").unwrap(), WebScope::Live);
    }

    #[test]
    fn test_parse_global_scope_keeps_name_case() {
        assert_eq!(
            WebScope::parse("global(RootApp)").unwrap(),
            WebScope::Global("RootApp".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_scope() {
        let err = WebScope::parse("backstage").unwrap_err();
        assert!(matches!(err, RolloutError::UnknownScope { .. }));
    }

    #[test]
    fn test_parse_empty_global_name_is_rejected() {
        assert!(WebScope::parse("global()").is_err());
    }

    #[test]
    fn test_parse_scope_list() {
        let scopes = parse_scope_list("webedit, global(root)").unwrap();
        assert_eq!(
            scopes,
            vec![
                WebScope::Webedit,
                WebScope::Global("root".to_string())
            ]
        );
        assert!(parse_scope_list("").unwrap().is_empty());
    }

    #[test]
    fn test_web_app_target_for_global_scope_drops_project() {
        let target = Target::web_app(WebScope::Global("root".to_string()), Some("Mithras"));
        assert_eq!(
            target,
            Target::WebApp {
                scope: WebScope::Global("root".to_string()),
                project: None,
            }
        );
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::Server.to_string(), "the server");
        assert_eq!(
            Target::Project("Mithras".to_string()).to_string(),
            "project 'Mithras'"
        );
        assert_eq!(
            Target::web_app(WebScope::Webedit, Some("Mithras")).to_string(),
            "web app 'webedit' of project 'Mithras'"
        );
        assert_eq!(
            Target::web_app(WebScope::Global("root".to_string()), None).to_string(),
            "web app 'global(root)'"
        );
    }
}
