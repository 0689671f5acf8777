//! Path patterns with named segments.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{pattern}`: `:` segment needs a name")]
    EmptyParam { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern: literal segments and `:named` captures.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

/// What a successful match yields: captured params, the consumed prefix,
/// and the unmatched suffix (for nested tables).
#[derive(Debug, Clone, Default)]
pub struct RouteMatch {
    pub params: HashMap<String, String>,
    pub matched: String,
    pub rest: String,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn segments_of(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join(parts: &[&str]) -> String {
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        for part in segments_of(raw) {
            match part.strip_prefix(':') {
                Some("") => {
                    return Err(PatternError::EmptyParam {
                        pattern: raw.to_string(),
                    });
                }
                Some(name) => segments.push(Segment::Param(name.to_string())),
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Matches `path` against the pattern. Exact mode requires the whole
    /// path to be consumed; otherwise the leftover suffix lands in
    /// [`RouteMatch::rest`]. A param segment never matches an absent one:
    /// `/topics/:id` does not match `/topics`.
    pub fn match_path(&self, path: &str, exact: bool) -> Option<RouteMatch> {
        let parts: Vec<&str> = segments_of(path).collect();
        if parts.len() < self.segments.len() {
            return None;
        }
        if exact && parts.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(RouteMatch {
            params,
            matched: join(&parts[..self.segments.len()]),
            rest: join(&parts[self.segments.len()..]),
        })
    }
}
