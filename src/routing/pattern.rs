//! Path pattern compilation.
//!
//! # Responsibilities
//! - Turn a pattern string (`/patient/:id/3d-view`) into typed segments
//! - Reject malformed patterns up front
//! - Match a split path against compiled segments
//! - Build a concrete path from a compiled pattern and parameters
//!
//! # Pattern Syntax
//! - `literal` matches itself, case-sensitive
//! - `:name` captures exactly one segment
//! - `:name?` captures one segment or nothing; optional segments must form
//!   a contiguous suffix of the pattern
//! - `*name` (or bare `*`, bound as `pathMatch`) captures the remaining
//!   segments, possibly none; only allowed as the last segment

use std::collections::{HashMap, HashSet};

use crate::error::{RouterError, RouterResult};
use crate::routing::path::{decode_segment, encode_segment, normalize_path, segments};

/// Parameter name bound by a bare `*` segment.
pub const DEFAULT_CATCH_ALL: &str = "pathMatch";

/// A single compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Static text.
    Literal(String),
    /// Named parameter capturing one path segment.
    Param { name: String, optional: bool },
    /// Named parameter capturing the rest of the path.
    CatchAll(String),
}

impl Segment {
    fn is_required(&self) -> bool {
        match self {
            Segment::Literal(_) => true,
            Segment::Param { optional, .. } => !optional,
            Segment::CatchAll(_) => false,
        }
    }
}

/// A compiled, matchable path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    source: String,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// The normalized pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of every parameter, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Literal(_) => None,
            Segment::Param { name, .. } | Segment::CatchAll(name) => Some(name.as_str()),
        })
    }

    /// True when the pattern contains no parameters.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Match already-split path segments, returning the decoded parameters.
    ///
    /// Every path segment must be consumed and every required pattern
    /// segment satisfied. Optional parameters with no corresponding path
    /// segment are left unbound.
    pub fn match_segments(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        let mut consumed = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    if path.get(consumed).copied() != Some(text.as_str()) {
                        return None;
                    }
                    consumed += 1;
                }
                Segment::Param { name, optional } => match path.get(consumed) {
                    Some(value) => {
                        params.insert(name.clone(), decode_segment(value));
                        consumed += 1;
                    }
                    None if *optional => {}
                    None => return None,
                },
                Segment::CatchAll(name) => {
                    let rest = path[consumed..]
                        .iter()
                        .map(|value| decode_segment(value))
                        .collect::<Vec<_>>()
                        .join("/");
                    params.insert(name.clone(), rest);
                    consumed = path.len();
                }
            }
        }

        (consumed == path.len()).then_some(params)
    }

    /// Substitute `params` into the pattern.
    ///
    /// Values are percent-encoded. Returns the name of the first required
    /// parameter with no (or an empty) value as the error.
    pub fn build(&self, params: &HashMap<String, String>) -> Result<String, String> {
        let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => parts.push(text.clone()),
                Segment::Param { name, optional } => {
                    match params.get(name).filter(|value| !value.is_empty()) {
                        Some(value) => parts.push(encode_segment(value)),
                        // optional segments form a suffix, nothing follows
                        None if *optional => break,
                        None => return Err(name.clone()),
                    }
                }
                Segment::CatchAll(name) => {
                    if let Some(value) = params.get(name) {
                        parts.extend(
                            value
                                .split('/')
                                .filter(|part| !part.is_empty())
                                .map(encode_segment),
                        );
                    }
                }
            }
        }

        Ok(format!("/{}", parts.join("/")))
    }
}

/// Compile a pattern string.
///
/// Deterministic and side-effect free: the same input always yields an equal
/// [`CompiledPattern`].
pub fn compile(pattern: &str) -> RouterResult<CompiledPattern> {
    let invalid = |reason: String| RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    let source = normalize_path(pattern).into_owned();
    let mut compiled = Vec::new();
    let mut seen = HashSet::new();
    let mut optional_seen = false;

    for raw in segments(&source) {
        if matches!(compiled.last(), Some(Segment::CatchAll(_))) {
            return Err(invalid(format!("segment '{}' follows a catch-all", raw)));
        }

        let segment = classify_segment(raw).map_err(invalid)?;

        if optional_seen && segment.is_required() {
            return Err(invalid(format!(
                "required segment '{}' follows an optional parameter",
                raw
            )));
        }
        if optional_seen && matches!(segment, Segment::CatchAll(_)) {
            return Err(invalid("catch-all follows an optional parameter".to_string()));
        }

        if let Segment::Param { name, optional } = &segment {
            optional_seen |= *optional;
            if !seen.insert(name.clone()) {
                return Err(invalid(format!("duplicate parameter '{}'", name)));
            }
        }
        if let Segment::CatchAll(name) = &segment {
            if !seen.insert(name.clone()) {
                return Err(invalid(format!("duplicate parameter '{}'", name)));
            }
        }

        compiled.push(segment);
    }

    Ok(CompiledPattern {
        source,
        segments: compiled,
    })
}

/// Classify one raw pattern segment.
fn classify_segment(raw: &str) -> Result<Segment, String> {
    if let Some(param) = raw.strip_prefix(':') {
        let (name, optional) = match param.strip_suffix('?') {
            Some(name) => (name, true),
            None => (param, false),
        };
        validate_param_name(name)?;
        return Ok(Segment::Param {
            name: name.to_string(),
            optional,
        });
    }

    if let Some(name) = raw.strip_prefix('*') {
        if name.is_empty() {
            return Ok(Segment::CatchAll(DEFAULT_CATCH_ALL.to_string()));
        }
        validate_param_name(name)?;
        return Ok(Segment::CatchAll(name.to_string()));
    }

    Ok(Segment::Literal(raw.to_string()))
}

fn validate_param_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty parameter name".to_string());
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!("invalid character '{}' in parameter '{}'", bad, name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_compile_segments() {
        let compiled = compile("/patient/:id/3d-view").unwrap();
        assert_eq!(
            compiled.segments(),
            &[
                Segment::Literal("patient".into()),
                Segment::Param {
                    name: "id".into(),
                    optional: false
                },
                Segment::Literal("3d-view".into()),
            ]
        );
        assert_eq!(compiled.source(), "/patient/:id/3d-view");
        assert!(!compiled.is_static());
    }

    #[test]
    fn test_compile_root_and_normalization() {
        let root = compile("/").unwrap();
        assert!(root.segments().is_empty());
        assert!(root.is_static());

        let messy = compile("//patient-manage/").unwrap();
        assert_eq!(messy.source(), "/patient-manage");
    }

    #[test]
    fn test_compile_is_deterministic() {
        assert_eq!(compile("/a/:b?/").unwrap(), compile("/a/:b?/").unwrap());
    }

    #[test]
    fn test_optional_must_be_suffix() {
        assert!(compile("/posts/:year?/:month?").is_ok());

        let err = compile("/posts/:year?/:slug").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));

        let err = compile("/posts/:year?/archive").unwrap_err();
        assert!(err.to_string().contains("follows an optional parameter"));
    }

    #[test]
    fn test_invalid_param_names() {
        assert!(compile("/users/:").is_err());
        assert!(compile("/users/:id/:id").is_err());
        assert!(compile("/users/:na.me").is_err());
        assert!(compile("/users/:user_id/:post-id").is_ok());
    }

    #[test]
    fn test_catch_all_rules() {
        let compiled = compile("/docs/*rest").unwrap();
        assert_eq!(compiled.segments().last(), Some(&Segment::CatchAll("rest".into())));

        let bare = compile("/*").unwrap();
        assert_eq!(bare.param_names().collect::<Vec<_>>(), vec![DEFAULT_CATCH_ALL]);

        assert!(compile("/docs/*rest/edit").is_err());
        assert!(compile("/docs/:v?/*rest").is_err());
    }

    #[test]
    fn test_match_segments() {
        let compiled = compile("/patient/:id").unwrap();
        assert_eq!(compiled.match_segments(&["patient", "42"]), Some(params(&[("id", "42")])));
        assert_eq!(compiled.match_segments(&["patient"]), None);
        assert_eq!(compiled.match_segments(&["patient", "42", "3d-view"]), None);
        assert_eq!(compiled.match_segments(&["Patient", "42"]), None);
    }

    #[test]
    fn test_match_optional_and_catch_all() {
        let optional = compile("/reports/:year?").unwrap();
        assert_eq!(optional.match_segments(&["reports"]), Some(HashMap::new()));
        assert_eq!(
            optional.match_segments(&["reports", "2024"]),
            Some(params(&[("year", "2024")]))
        );

        let catch_all = compile("/*rest").unwrap();
        assert_eq!(catch_all.match_segments(&[]), Some(params(&[("rest", "")])));
        assert_eq!(
            catch_all.match_segments(&["a", "b%20c"]),
            Some(params(&[("rest", "a/b c")]))
        );
    }

    #[test]
    fn test_build() {
        let compiled = compile("/patient/:id/3d-view").unwrap();
        assert_eq!(
            compiled.build(&params(&[("id", "42")])),
            Ok("/patient/42/3d-view".to_string())
        );
        assert_eq!(compiled.build(&HashMap::new()), Err("id".to_string()));
        assert_eq!(compiled.build(&params(&[("id", "")])), Err("id".to_string()));

        let optional = compile("/reports/:year?/:month?").unwrap();
        assert_eq!(optional.build(&HashMap::new()), Ok("/reports".to_string()));
        assert_eq!(
            optional.build(&params(&[("year", "2024")])),
            Ok("/reports/2024".to_string())
        );

        let encoded = compile("/search/:q").unwrap();
        assert_eq!(
            encoded.build(&params(&[("q", "a b/c")])),
            Ok("/search/a%20b%2Fc".to_string())
        );

        assert_eq!(compile("/").unwrap().build(&HashMap::new()), Ok("/".to_string()));
    }
}
