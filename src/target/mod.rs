//! Target selection.
//!
//! A target names a rendering variant of the template. Each target is passed
//! to the template as the `target` argument and published on its own
//! channel. The wildcard `*` stands for "no target": the template is rendered
//! without the argument and published on the base channel itself.

use std::fmt;

use serde::Serialize;

/// Token that selects the unset target
pub const WILDCARD: &str = "*";

/// A rendering variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Target {
    /// No target argument; publishes on the base channel
    Unset,
    /// Named target, passed to the template verbatim
    Named(String),
}

impl Target {
    pub fn named(name: impl Into<String>) -> Self {
        Target::Named(name.into())
    }

    /// Value handed to the template as the `target` argument
    pub fn value(&self) -> Option<&str> {
        match self {
            Target::Unset => None,
            Target::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Unset => f.write_str("<unset>"),
            Target::Named(name) => f.write_str(name),
        }
    }
}

/// Where the target list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    /// Comma-separated spec string, parsed with [`resolve`]
    Spec(String),
    /// Caller-provided list; takes precedence over any spec string
    Explicit(Vec<Target>),
}

impl TargetSelection {
    /// Resolve the selection into an ordered target list.
    ///
    /// May return an empty list only for an empty `Explicit` selection;
    /// the coordinator decides what an empty list means.
    pub fn into_targets(self) -> Vec<Target> {
        match self {
            TargetSelection::Spec(spec) => resolve(&spec),
            TargetSelection::Explicit(targets) => targets,
        }
    }
}

impl Default for TargetSelection {
    fn default() -> Self {
        TargetSelection::Spec(WILDCARD.to_string())
    }
}

/// Parse a target spec into an ordered list of targets.
///
/// Pieces are trimmed but never dropped or deduplicated, so `"a,,a"` yields
/// `[a, "", a]`. A piece equal to `*` is the unset target.
pub fn resolve(spec: &str) -> Vec<Target> {
    if spec.trim() == WILDCARD {
        return vec![Target::Unset];
    }

    spec.split(',')
        .map(str::trim)
        .map(|piece| {
            if piece == WILDCARD {
                Target::Unset
            } else {
                Target::named(piece)
            }
        })
        .collect()
}
