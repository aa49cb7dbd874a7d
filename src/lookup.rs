//! Ordered field lookup over loosely-shaped provider payloads.
//!
//! The provider does not use one canonical shape for every account: the iccid
//! of a freshly assigned eSIM may show up as `iccid`, `simcard_iccid` or
//! `simcard_details.iccid`. A [`FieldChain`] lists the candidate paths in
//! preference order and reports the first one that is present.

use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Dot-separated path into a JSON object, e.g. `data.simcard_details.qr_code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the path. A `null` leaf is returned like any other value.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        if self.segments.is_empty() {
            return None;
        }
        let mut current = root;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Result of resolving a [`FieldChain`].
///
/// `Found` only says the field exists; an empty string or `null` is still
/// `Found`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// First candidate present in the payload.
    Found {
        /// Candidate that matched.
        path: &'a FieldPath,
        /// Value at that path.
        value: &'a Value,
    },
    /// No candidate was present.
    NotFound,
}

impl<'a> Lookup<'a> {
    /// Whether a candidate matched.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Interpret the found value as a scalar string.
    ///
    /// Strings are trimmed and integers are rendered. Returns
    /// `Some(Err(path))` when the field exists but is empty, `null`, not a
    /// scalar, or a number that only fits a float (its digits are lost).
    pub fn scalar(&self) -> Option<Result<String, &'a FieldPath>> {
        match self {
            Self::NotFound => None,
            Self::Found { path, value } => Some(match value {
                Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
                _ => Err(*path),
            }),
        }
    }
}

/// Candidate field paths tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChain {
    paths: Vec<FieldPath>,
}

impl FieldChain {
    /// Build a chain from paths in preference order.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a lower-priority candidate.
    pub fn or(mut self, path: impl Into<FieldPath>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Candidates in preference order.
    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Return the first candidate present in `root`.
    pub fn resolve<'a>(&'a self, root: &'a Value) -> Lookup<'a> {
        self.paths
            .iter()
            .find_map(|path| path.get(root).map(|value| Lookup::Found { path, value }))
            .unwrap_or(Lookup::NotFound)
    }
}

impl Display for FieldChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.paths.iter().map(ToString::to_string).collect();
        write!(f, "{}", names.join(" | "))
    }
}
