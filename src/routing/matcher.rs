//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile `/users/:id/status` style patterns into segment lists
//! - Match a pathname segment by segment, capturing `:name` values
//! - Match literal prefixes for patterns ending in `/`
//!
//! # Design Decisions
//! - Patterns are compiled once at registration; lookups never build regexes
//! - Literal segments are case-sensitive
//! - A capture matches exactly one non-empty segment

use std::collections::HashMap;

/// Values captured from `:name` segments.
pub type PathParams = HashMap<String, String>;

/// One compiled segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/users/:id`.
    pub fn compile(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = split_segments(&raw)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Capture(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the pattern contains at least one capture.
    pub fn has_captures(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Capture(_)))
    }

    /// Returns true if the pattern is a prefix route (ends in `/`).
    pub fn is_prefix(&self) -> bool {
        self.raw.len() > 1 && self.raw.ends_with('/')
    }

    /// Match a whole pathname, returning captured params on success.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::new();
        let mut parts = split_segments(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Returns true if `path` starts with this pattern's literal text.
    pub fn matches_prefix(&self, path: &str) -> bool {
        self.is_prefix() && path.starts_with(&self.raw)
    }
}

fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Strip the query string and fragment from a URL, leaving the pathname.
pub fn pathname(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
