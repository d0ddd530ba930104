//! Database-layer mapping resolution
//!
//! Turns a user-supplied mapping expression plus a feature archive's layer
//! inventory into a complete source→destination table. Pure and
//! side-effect-free; the resulting table is consumed once by the
//! environment's layer-binding activation.
//!
//! Precedence, highest to lowest: explicit per-source entry, wildcard
//! fallback (wildcard path only), carried destination (mapped layers,
//! no-wildcard path), identity (unmapped layers, no-wildcard path).

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, RolloutError};

/// Expression key capturing every source layer not explicitly keyed.
pub const WILDCARD: &str = "*";

/// Expression value requesting a brand-new destination layer.
pub const CREATE_NEW: &str = "CREATE_NEW";

/// Reserved destination name the target environment interprets as
/// "provision a new layer". Substituted for [`CREATE_NEW`] before resolution.
pub const CREATE_NEW_LAYER: &str = "#create_new_layer";

/// Complete source→destination table, deterministically ordered.
pub type LayerMapping = BTreeMap<String, String>;

/// Parse a `src=dst,src2=dst2[,*=fallback]` expression into its pair map.
///
/// Pairs may be delimited by `=` or `:`; empty input yields an empty map and
/// a later key overrides an earlier one.
pub fn parse_expression(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (source, destination) = part
            .split_once('=')
            .or_else(|| part.split_once(':'))
            .ok_or_else(|| RolloutError::InvalidMappingExpression {
                expression: raw.to_string(),
                reason: format!("'{part}' is not a key-value pair"),
            })?;
        let source = source.trim();
        let destination = destination.trim();
        if source.is_empty() || destination.is_empty() {
            return Err(RolloutError::InvalidMappingExpression {
                expression: raw.to_string(),
                reason: format!("'{part}' has an empty layer name"),
            });
        }
        pairs.insert(source.to_string(), destination.to_string());
    }
    Ok(pairs)
}

/// Resolve the total mapping for every source layer in `mapped` ∪ `unmapped`.
pub fn resolve(
    expression: &BTreeMap<String, String>,
    mapped: &BTreeMap<String, String>,
    unmapped: &BTreeSet<String>,
) -> Result<LayerMapping> {
    let explicit = substitute_create_new(expression);
    if let Some(source) = explicit.iter().find(|(_, dst)| *dst == WILDCARD) {
        return Err(RolloutError::InvalidMappingExpression {
            expression: format_pairs(expression),
            reason: format!("'{}' maps onto the wildcard token", source.0),
        });
    }
    if explicit.is_empty() {
        return Ok(identity(mapped, unmapped));
    }
    if explicit.contains_key(WILDCARD) {
        with_wildcard_fallback(&explicit, mapped, unmapped)
    } else {
        without_wildcard_fallback(&explicit, mapped, unmapped)
    }
}

/// Replace [`CREATE_NEW`] with the reserved destination wherever it appears
/// as a value. The literal as a key is left untouched.
fn substitute_create_new(expression: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    expression
        .iter()
        .map(|(source, destination)| {
            let destination = if destination == CREATE_NEW {
                CREATE_NEW_LAYER.to_string()
            } else {
                destination.clone()
            };
            (source.clone(), destination)
        })
        .collect()
}

/// No user input: mapped layers keep their destinations, unmapped layers map
/// onto themselves.
fn identity(mapped: &BTreeMap<String, String>, unmapped: &BTreeSet<String>) -> LayerMapping {
    let mut result = mapped.clone();
    for layer in unmapped {
        result.insert(layer.clone(), layer.clone());
    }
    result
}

fn with_wildcard_fallback(
    explicit: &BTreeMap<String, String>,
    mapped: &BTreeMap<String, String>,
    unmapped: &BTreeSet<String>,
) -> Result<LayerMapping> {
    let fallback = explicit
        .get(WILDCARD)
        .ok_or(RolloutError::NoFallbackLayer)?;
    let mut result = LayerMapping::new();
    // every source layer gets at least the fallback destination
    for source in mapped.keys() {
        result.insert(source.clone(), fallback.clone());
    }
    for source in unmapped {
        result.insert(source.clone(), fallback.clone());
    }
    // explicit per-layer entries win over the wildcard
    for (source, destination) in explicit {
        if source != WILDCARD {
            result.insert(source.clone(), destination.clone());
        }
    }
    Ok(result)
}

fn without_wildcard_fallback(
    explicit: &BTreeMap<String, String>,
    mapped: &BTreeMap<String, String>,
    unmapped: &BTreeSet<String>,
) -> Result<LayerMapping> {
    if explicit.contains_key(WILDCARD) {
        return Err(RolloutError::UnexpectedWildcard);
    }
    let mut result = LayerMapping::new();
    for layer in unmapped {
        result.insert(layer.clone(), layer.clone());
    }
    for (source, destination) in mapped {
        result.insert(source.clone(), destination.clone());
    }
    for (source, destination) in explicit {
        result.insert(source.clone(), destination.clone());
    }
    Ok(result)
}

fn format_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(source, destination)| format!("{source}={destination}"))
        .collect::<Vec<_>>()
        .join(",")
}
