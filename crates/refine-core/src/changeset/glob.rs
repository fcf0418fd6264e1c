//! Glob matching against absolute modification paths
//!
//! Patterns support `*`, `?`, `[...]`, `{a,b}` alternatives and `**/` for
//! zero or more directories. Matching is case-insensitive and works one path
//! component at a time, so no wildcard crosses a `/`. A component starting
//! with `.` only matches a pattern component that starts with `.` too, and
//! `**/` never descends into such directories. A trailing `**` matches a
//! single component, like `*`.

use std::borrow::Cow;
use std::path::{Component, Path};

use globset::{GlobBuilder, GlobMatcher};
use tracing::warn;

/// Expand every `{a,b,...}` group into the full set of alternatives.
///
/// `/**/` is first rewritten to `{/**/,/}` so a recursive wildcard also
/// matches zero directories.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let pattern = pattern.replace("/**/", "{/**/,/}");
    let mut expansions = vec![String::new()];
    let mut rest = pattern.as_str();

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        let literal = &rest[..open];
        let alternatives: Vec<&str> = rest[open + 1..close].split(',').collect();
        expansions = expansions
            .iter()
            .flat_map(|prefix| {
                alternatives
                    .iter()
                    .map(move |alternative| format!("{prefix}{literal}{alternative}"))
            })
            .collect();
        rest = &rest[close + 1..];
    }

    for expansion in &mut expansions {
        expansion.push_str(rest);
    }
    expansions
}

#[derive(Debug, Clone)]
enum Segment {
    /// `**` followed by more components.
    AnyDirectories,
    Component { matcher: GlobMatcher, dotted: bool },
}

/// A compiled pattern: one segment list per brace alternative.
#[derive(Debug, Clone, Default)]
pub struct PathGlob {
    alternatives: Vec<Vec<Segment>>,
}

impl PathGlob {
    pub fn is_match(&self, path: &Path) -> bool {
        let components: Vec<Cow<'_, str>> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        self.alternatives
            .iter()
            .any(|segments| matches(segments, &components))
    }
}

fn matches(segments: &[Segment], components: &[Cow<'_, str>]) -> bool {
    match segments.split_first() {
        None => components.is_empty(),
        Some((Segment::AnyDirectories, rest)) => {
            matches(rest, components)
                || match components.split_first() {
                    Some((first, tail)) => !first.starts_with('.') && matches(segments, tail),
                    None => false,
                }
        }
        Some((Segment::Component { matcher, dotted }, rest)) => match components.split_first() {
            Some((first, tail)) => {
                (*dotted || !first.starts_with('.'))
                    && matcher.is_match(&**first)
                    && matches(rest, tail)
            }
            None => false,
        },
    }
}

fn compile_alternative(expansion: &str) -> Result<Vec<Segment>, globset::Error> {
    let parts: Vec<&str> = expansion.split('/').filter(|part| !part.is_empty()).collect();
    let last = parts.len().saturating_sub(1);
    parts
        .iter()
        .enumerate()
        .map(|(position, part)| {
            if *part == "**" && position != last {
                return Ok(Segment::AnyDirectories);
            }
            let part = if *part == "**" { "*" } else { part };
            let glob = GlobBuilder::new(part)
                .literal_separator(true)
                .case_insensitive(true)
                .build()?;
            Ok(Segment::Component {
                matcher: glob.compile_matcher(),
                dotted: part.starts_with('.'),
            })
        })
        .collect()
}

/// Compile a pattern into a matcher over absolute paths. Alternatives that
/// fail to compile are dropped with a warning and never match.
pub fn compile(pattern: &str) -> PathGlob {
    let alternatives = expand_braces(pattern)
        .into_iter()
        .filter_map(|expansion| match compile_alternative(&expansion) {
            Ok(segments) => Some(segments),
            Err(e) => {
                warn!("Ignoring invalid glob {}: {}", expansion, e);
                None
            }
        })
        .collect();
    PathGlob { alternatives }
}
