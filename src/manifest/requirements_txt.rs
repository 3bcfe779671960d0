//! requirements.txt parser for pip projects
//!
//! Handles:
//! - `name==1.0`, `name>=1.0,<2`, `name~=1.4`, `Name (>=1.0)`
//! - extras (`name[security]==2.31.0`) and markers (`; python_version < "3.8"`)
//! - comments and blank lines
//!
//! Option lines (`-r`, `-e`, `--index-url`), URL/VCS/path requirements and
//! bare names without a version specifier are skipped.

use crate::domain::{DeclaredDependency, ManifestKind};
use crate::error::ManifestError;
use crate::manifest::{merge_declarations, rewrite_constraint, ManifestParser};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Parser for requirements.txt files
pub struct RequirementsTxtParser;

// PEP 508 requirement with a version specifier:
// name, optional extras, optional parentheses, specifier, optional marker
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[^\]]*\])?\s*\(?\s*([<>=!~][^;()]*?)\s*\)?\s*(?:;.*)?$",
    )
    .unwrap()
});

/// A requirement's name and the byte range of its specifier within the line
pub(crate) struct RequirementSpan<'a> {
    pub name: &'a str,
    pub constraint: Range<usize>,
}

/// Parses one PEP 508 requirement string with a version specifier
pub(crate) fn parse_requirement(spec: &str) -> Option<RequirementSpan<'_>> {
    let caps = REQUIREMENT_RE.captures(spec)?;
    let name = caps.get(1)?.as_str();
    let constraint = caps.get(2)?.range();
    Some(RequirementSpan { name, constraint })
}

/// PEP 503 name comparison: case-insensitive, `-`, `_` and `.` are equivalent
pub(crate) fn same_distribution(a: &str, b: &str) -> bool {
    fn canonical(name: &str) -> String {
        name.to_ascii_lowercase().replace(['_', '.'], "-")
    }
    canonical(a) == canonical(b)
}

/// The part of a requirements line before any comment
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(0) => "",
        Some(idx) if line[..idx].ends_with(char::is_whitespace) => &line[..idx],
        _ => line,
    }
}

impl ManifestParser for RequirementsTxtParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::RequirementsTxt
    }

    fn extract(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let entries = content.lines().filter_map(|line| {
            let code = strip_comment(line);
            let requirement = parse_requirement(code)?;
            Some((
                requirement.name.to_string(),
                code[requirement.constraint].to_string(),
                false,
            ))
        });

        Ok(merge_declarations(entries))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let mut output = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            let code = strip_comment(line.trim_end_matches(['\r', '\n']));
            match parse_requirement(code) {
                Some(requirement) if same_distribution(requirement.name, package) => {
                    let range = requirement.constraint;
                    output.push_str(&line[..range.start]);
                    output.push_str(&rewrite_constraint(&code[range.clone()], new_version));
                    output.push_str(&line[range.end..]);
                }
                _ => output.push_str(line),
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<DeclaredDependency> {
        RequirementsTxtParser.extract(content).unwrap()
    }

    #[test]
    fn test_extract_basic() {
        let deps = extract("requests==2.28.0\nflask>=2.0,<3\nnumpy~=1.24\n");
        assert_eq!(
            deps,
            vec![
                DeclaredDependency::production("requests", "==2.28.0"),
                DeclaredDependency::production("flask", ">=2.0,<3"),
                DeclaredDependency::production("numpy", "~=1.24"),
            ]
        );
    }

    #[test]
    fn test_extract_skips_comments_options_and_urls() {
        let content = "\
# production deps
-r base.txt
--index-url https://example.com/simple
-e git+https://github.com/acme/tool.git#egg=tool
git+https://github.com/acme/other.git
https://example.com/pkg.tar.gz
./local/package
pkg @ https://example.com/pkg.whl
unpinned

django==4.2.7  # LTS
";
        let deps = extract(content);
        assert_eq!(deps, vec![DeclaredDependency::production("django", "==4.2.7")]);
    }

    #[test]
    fn test_extract_extras_markers_and_parentheses() {
        let content = "\
requests[security,socks]==2.31.0
importlib-metadata>=4.0 ; python_version < \"3.10\"
Pillow (>=9.0)
";
        let deps = extract(content);
        assert_eq!(deps[0], DeclaredDependency::production("requests", "==2.31.0"));
        assert_eq!(
            deps[1],
            DeclaredDependency::production("importlib-metadata", ">=4.0")
        );
        assert_eq!(deps[2], DeclaredDependency::production("Pillow", ">=9.0"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let deps = extract("requests==2.0.0\nflask==2.0\nrequests==2.31.0\n");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].constraint, "==2.31.0");
    }

    #[test]
    fn test_hash_inside_token_is_not_comment() {
        assert_eq!(strip_comment("pkg==1.0 # note"), "pkg==1.0 ");
        assert_eq!(strip_comment("# all comment"), "");
        assert_eq!(strip_comment("pkg==1.0#frag"), "pkg==1.0#frag");
    }

    #[test]
    fn test_same_distribution() {
        assert!(same_distribution("Django", "django"));
        assert!(same_distribution("importlib_metadata", "importlib-metadata"));
        assert!(same_distribution("zope.interface", "zope-interface"));
        assert!(!same_distribution("flask", "flask-cors"));
    }

    #[test]
    fn test_update_version_preserves_layout() {
        let content = "\
# pinned
requests==2.28.0  # http
flask>=2.0,<3 ; python_version >= \"3.8\"
numpy~=1.24\r
";
        let parser = RequirementsTxtParser;
        let updated = parser.update_version(content, "requests", "2.31.0").unwrap();
        let updated = parser.update_version(&updated, "Flask", "3.0.0").unwrap();
        let updated = parser.update_version(&updated, "numpy", "1.26.2").unwrap();

        assert_eq!(
            updated,
            "\
# pinned
requests==2.31.0  # http
flask>=3.0.0 ; python_version >= \"3.8\"
numpy~=1.26.2\r
"
        );
    }

    #[test]
    fn test_update_version_missing_package_is_noop() {
        let content = "requests==2.28.0\n";
        let updated = RequirementsTxtParser
            .update_version(content, "flask", "3.0.0")
            .unwrap();
        assert_eq!(updated, content);
    }
}
