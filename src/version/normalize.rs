//! Constraint and version string normalization
//!
//! Handles the constraint forms found across npm, Composer and PEP 440:
//! - Operators: `^1.2.3`, `~1.2`, `>=2.0`, `~=1.4.2`, `==2.28.0`
//! - Alternatives: `^7.4|^8.0`, `1.x || 2.x` (first alternative wins)
//! - Comma/space ranges: `>=2.0,<3`, `>=1.0.0 <2.0.0` (first comparator wins)
//! - Hyphen ranges: `1.0.0 - 2.0.0` (lower bound)
//! - Wildcards: `*`, `1.x`, `1.2.*` (wildcard parts become 0)
//! - Prefixes and suffixes: `v1.2.3`, `1.2.3+build`, `2.0.0b1`, `1.0.post1`

use regex::Regex;
use semver::Prerelease;
use std::sync::LazyLock;

use super::CanonicalVersion;
use crate::error::InvalidVersion;

/// Leading numeric core: up to three components, extra numeric parts, then the suffix
static CORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?(?:\.\d+)*(.*)$").unwrap()
});

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '!', '~', '^'];

/// Splits a raw constraint into its leading operator and first version token.
///
/// `"^7.4|^8.0"` gives `("^", "7.4")`, `">= 2.0, <3"` gives `(">=", "2.0")`.
pub fn split_constraint(raw: &str) -> (&str, &str) {
    let alternative = raw
        .split('|')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("");

    let version_start = alternative
        .find(|c: char| !OPERATOR_CHARS.contains(&c) && !c.is_whitespace())
        .unwrap_or(alternative.len());
    let operator = alternative[..version_start].trim();

    let rest = &alternative[version_start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == ',')
        .unwrap_or(rest.len());

    (operator, &rest[..end])
}

/// Display form of a constraint: the first version token without operators.
///
/// Non-numeric constraints such as `dev-main` pass through unchanged.
pub fn clean_constraint(raw: &str) -> String {
    split_constraint(raw).1.to_string()
}

/// Reduces a constraint or registry version string to a canonical version.
pub fn normalize(raw: &str) -> Result<CanonicalVersion, InvalidVersion> {
    let (_, token) = split_constraint(raw);
    // Composer stability flags: `1.0@dev`
    let token = token.split('@').next().unwrap_or(token);
    let token = strip_v_prefix(token);

    if token.is_empty() {
        return Err(InvalidVersion::new(raw, "empty version"));
    }

    let caps = CORE_RE
        .captures(token)
        .ok_or_else(|| InvalidVersion::new(raw, "no numeric version"))?;

    let major = component(caps.get(1), raw)?;
    let minor = component(caps.get(2), raw)?;
    let patch = component(caps.get(3), raw)?;
    let suffix = caps.get(4).map_or("", |m| m.as_str());
    // `x`/`*` only stand in for numbers: `1.x` is a range, `xyz` and `x-dev` are not
    let has_wildcard = (1..=3).any(|i| caps.get(i).is_some_and(|m| is_wildcard(m.as_str())));
    if has_wildcard && !suffix.is_empty() {
        return Err(InvalidVersion::new(raw, "wildcard followed by text"));
    }
    let pre = parse_suffix(suffix).map_err(|reason| InvalidVersion::new(raw, reason))?;

    Ok(CanonicalVersion {
        major,
        minor,
        patch,
        pre,
    })
}

fn strip_v_prefix(token: &str) -> &str {
    token
        .strip_prefix(['v', 'V'])
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(token)
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

fn component(m: Option<regex::Match<'_>>, raw: &str) -> Result<u64, InvalidVersion> {
    match m.map(|m| m.as_str()) {
        None => Ok(0),
        Some(part) if is_wildcard(part) => Ok(0),
        Some(digits) => digits
            .parse()
            .map_err(|_| InvalidVersion::new(raw, "version component out of range")),
    }
}

/// Maps whatever follows the numeric core onto a semver prerelease.
///
/// Build metadata is dropped and PEP 440 post releases count as stable.
fn parse_suffix(rest: &str) -> Result<Prerelease, &'static str> {
    let without_build = match rest.find('+') {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    let Some(first) = without_build.chars().next() else {
        return Ok(Prerelease::EMPTY);
    };
    if !(matches!(first, '-' | '.' | '_') || first.is_ascii_alphabetic()) {
        return Err("unexpected characters after version");
    }

    let tag = without_build
        .trim_start_matches(['-', '.', '_'])
        .to_ascii_lowercase();
    if tag.is_empty() || is_post_release(&tag) {
        return Ok(Prerelease::EMPTY);
    }
    if !tag.is_ascii() {
        return Err("unsupported characters in prerelease tag");
    }

    let mut identifiers = Vec::new();
    for chunk in tag.split(['.', '-', '_']).filter(|c| !c.is_empty()) {
        for piece in split_digit_runs(chunk) {
            if piece.bytes().all(|b| b.is_ascii_digit()) {
                let n: u64 = piece
                    .parse()
                    .map_err(|_| "prerelease number out of range")?;
                identifiers.push(n.to_string());
            } else if piece.bytes().all(|b| b.is_ascii_alphabetic()) {
                identifiers.push(piece.to_string());
            } else {
                return Err("unsupported characters in prerelease tag");
            }
        }
    }

    Prerelease::new(&identifiers.join(".")).map_err(|_| "invalid prerelease tag")
}

fn is_post_release(tag: &str) -> bool {
    tag.strip_prefix("post").is_some_and(|n| {
        n.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
    })
}

/// `rc1` -> `["rc", "1"]`; ASCII input only.
fn split_digit_runs(chunk: &str) -> Vec<&str> {
    let bytes = chunk.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    for i in 1..bytes.len() {
        if bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit() {
            pieces.push(&chunk[start..i]);
            start = i;
        }
    }
    pieces.push(&chunk[start..]);
    pieces
}
