//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - project.dependencies (PEP 621)
//! - project.optional-dependencies (PEP 621)
//! - tool.poetry.dependencies (Poetry)
//! - tool.poetry.dev-dependencies (Poetry)
//! - tool.poetry.group.*.dependencies (Poetry 1.2+)

use crate::domain::{DeclaredDependency, ManifestKind};
use crate::error::ManifestError;
use crate::manifest::requirements_txt::{parse_requirement, same_distribution};
use crate::manifest::{merge_declarations, rewrite_constraint, ManifestParser};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use toml::{Table, Value};

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

// `[table]` and `[[array.of.tables]]` header lines
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\[\[?([^\[\]\n]+)\]\]?[ \t]*(?:#[^\n]*)?\n?").unwrap());

static DEPENDENCIES_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*dependencies[ \t]*=[ \t]*\[").unwrap());

// Single-line basic or literal TOML strings
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"\\\n]*"|'[^'\n]*'"#).unwrap());

type Entry = (String, String, bool);

/// PEP 508 strings of an array such as `project.dependencies`
fn pep508_entries(deps: Option<&Value>, is_dev: bool, out: &mut Vec<Entry>) {
    let Some(deps) = deps.and_then(|d| d.as_array()) else {
        return;
    };
    for spec in deps.iter().filter_map(|d| d.as_str()) {
        if let Some(requirement) = parse_requirement(spec) {
            out.push((
                requirement.name.to_string(),
                spec[requirement.constraint].to_string(),
                is_dev,
            ));
        }
    }
}

/// Poetry `name = "^1.0"` / `name = { version = "^1.0" }` tables
fn poetry_entries(deps: Option<&Value>, is_dev: bool, out: &mut Vec<Entry>) {
    let Some(deps) = deps.and_then(|d| d.as_table()) else {
        return;
    };
    for (name, value) in deps {
        // Skip python version requirement
        if name.eq_ignore_ascii_case("python") {
            continue;
        }
        let constraint = match value {
            Value::String(s) => s.as_str(),
            Value::Table(t) => match t.get("version").and_then(|v| v.as_str()) {
                Some(version) => version,
                None => continue,
            },
            _ => continue,
        };
        out.push((name.clone(), constraint.to_string(), is_dev));
    }
}

impl ManifestParser for PyprojectTomlParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PyprojectToml
    }

    fn extract(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let doc: Table = toml::from_str(content)
            .map_err(|e: toml::de::Error| ManifestError::parse(self.kind(), e.to_string()))?;

        let mut entries = Vec::new();

        let project = doc.get("project");
        pep508_entries(project.and_then(|p| p.get("dependencies")), false, &mut entries);
        if let Some(optional) = project
            .and_then(|p| p.get("optional-dependencies"))
            .and_then(|d| d.as_table())
        {
            for group in optional.values() {
                pep508_entries(Some(group), true, &mut entries);
            }
        }

        let poetry = doc.get("tool").and_then(|t| t.get("poetry"));
        poetry_entries(poetry.and_then(|p| p.get("dependencies")), false, &mut entries);
        poetry_entries(poetry.and_then(|p| p.get("dev-dependencies")), true, &mut entries);
        if let Some(groups) = poetry.and_then(|p| p.get("group")).and_then(|g| g.as_table()) {
            for group in groups.values() {
                poetry_entries(group.get("dependencies"), true, &mut entries);
            }
        }

        entries.retain(|(name, _, _)| !name.eq_ignore_ascii_case("python"));
        Ok(merge_declarations(entries))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let escaped = regex::escape(package);
        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                ManifestError::parse(self.kind(), format!("invalid pattern for {}: {}", package, e))
            })
        };

        // Poetry simple form: name = "^1.0.0"
        let simple = build(format!(r#"(?m)^(\s*"?{}"?\s*=\s*)"([^"\n]*)""#, escaped))?;
        // Poetry inline table: name = { version = "^1.0.0", ... }
        let table = build(format!(
            r#"(?m)^(\s*"?{}"?\s*=\s*\{{[^}}\n]*?\bversion\s*=\s*)"([^"\n]*)""#,
            escaped
        ))?;

        let rewrite_pair = |caps: &regex::Captures| {
            format!(
                r#"{}"{}""#,
                &caps[1],
                rewrite_constraint(&caps[2], new_version)
            )
        };

        let mut result = String::with_capacity(content.len());
        for section in table_sections(content) {
            let body = &content[section.body.clone()];
            result.push_str(&content[section.header]);

            if is_poetry_dependency_table(&section.name) {
                let updated = simple.replace_all(body, rewrite_pair);
                result.push_str(&table.replace_all(&updated, rewrite_pair));
            } else if section.name == "project" {
                match dependencies_array(body) {
                    Some(array) => {
                        result.push_str(&body[..array.start]);
                        result.push_str(&rewrite_pep508(&body[array.clone()], package, new_version));
                        result.push_str(&body[array.end..]);
                    }
                    None => result.push_str(body),
                }
            } else if section.name == "project.optional-dependencies" {
                result.push_str(&rewrite_pep508(body, package, new_version));
            } else {
                result.push_str(body);
            }
        }

        Ok(result)
    }
}

/// One TOML table: its header line and the text up to the next header
struct TableSection {
    name: String,
    header: Range<usize>,
    body: Range<usize>,
}

/// Splits TOML text into tables. Text before the first header has an empty name.
fn table_sections(content: &str) -> Vec<TableSection> {
    let mut sections = Vec::new();
    let mut name = String::new();
    let mut header = 0..0;

    for caps in HEADER_RE.captures_iter(content) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        sections.push(TableSection {
            name: std::mem::take(&mut name),
            header: header.clone(),
            body: header.end..whole.start,
        });
        name = caps[1].replace(['"', '\'', ' ', '\t'], "");
        header = whole;
    }
    sections.push(TableSection {
        name,
        header: header.clone(),
        body: header.end..content.len(),
    });

    sections
}

/// `tool.poetry.dependencies`, `tool.poetry.dev-dependencies`, `tool.poetry.group.<g>.dependencies`
fn is_poetry_dependency_table(name: &str) -> bool {
    match name.strip_prefix("tool.poetry.") {
        Some("dependencies") | Some("dev-dependencies") => true,
        Some(rest) => rest
            .strip_prefix("group.")
            .and_then(|g| g.strip_suffix(".dependencies"))
            .is_some_and(|group| !group.is_empty() && !group.contains('.')),
        None => false,
    }
}

/// Range of the `dependencies = [ ... ]` array within a `[project]` table body
fn dependencies_array(body: &str) -> Option<Range<usize>> {
    let start = DEPENDENCIES_KEY_RE.find(body)?.end();
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut comment = false;
    let mut depth = 1usize;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if comment {
            comment = b != b'\n';
            continue;
        }
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'#' => comment = true,
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(start..start + offset);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Rewrites quoted PEP 508 strings naming `package`: "package[extra]>=1.0; marker"
fn rewrite_pep508(text: &str, package: &str, new_version: &str) -> String {
    QUOTED_RE
        .replace_all(text, |caps: &regex::Captures| {
            let whole = &caps[0];
            let quote = &whole[..1];
            let inner = &whole[1..whole.len() - 1];
            match parse_requirement(inner) {
                Some(requirement) if same_distribution(requirement.name, package) => {
                    let range = requirement.constraint;
                    format!(
                        "{quote}{}{}{}{quote}",
                        &inner[..range.start],
                        rewrite_constraint(&inner[range.clone()], new_version),
                        &inner[range.end..],
                    )
                }
                _ => whole.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEP621: &str = r#"
[project]
name = "my-app"
requires-python = ">=3.9"
dependencies = [
    "requests>=2.28.0",
    "click==8.1.3",
    "rich[jupyter]~=13.0; python_version >= '3.8'",
    "local-pkg @ file:///opt/local-pkg",
]

[project.optional-dependencies]
test = ["pytest>=7.0"]
"#;

    const POETRY: &str = r#"
[tool.poetry]
name = "my-app"

[tool.poetry.dependencies]
python = "^3.10"
fastapi = "^0.100.0"
sqlalchemy = { version = "^2.0.0", extras = ["asyncio"] }
mylib = { path = "../mylib" }

[tool.poetry.dev-dependencies]
black = "^23.0"

[tool.poetry.group.test.dependencies]
pytest = "^7.4"
"#;

    #[test]
    fn test_extract_pep621() {
        let deps = PyprojectTomlParser.extract(PEP621).unwrap();
        assert_eq!(
            deps,
            vec![
                DeclaredDependency::production("requests", ">=2.28.0"),
                DeclaredDependency::production("click", "==8.1.3"),
                DeclaredDependency::production("rich", "~=13.0"),
                DeclaredDependency::development("pytest", ">=7.0"),
            ]
        );
    }

    #[test]
    fn test_extract_poetry() {
        let deps = PyprojectTomlParser.extract(POETRY).unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["fastapi", "sqlalchemy", "black", "pytest"]);

        let sqlalchemy = deps.iter().find(|d| d.name == "sqlalchemy").unwrap();
        assert_eq!(sqlalchemy.constraint, "^2.0.0");
        assert!(deps.iter().find(|d| d.name == "pytest").unwrap().is_dev);
    }

    #[test]
    fn test_extract_without_dependencies() {
        let deps = PyprojectTomlParser
            .extract("[build-system]\nrequires = [\"setuptools\"]\n")
            .unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_extract_malformed_toml() {
        let err = PyprojectTomlParser.extract("[project\nname = ").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Parse {
                kind: ManifestKind::PyprojectToml,
                ..
            }
        ));
    }

    #[test]
    fn test_update_pep508_keeps_marker_and_extras() {
        let updated = PyprojectTomlParser
            .update_version(PEP621, "rich", "13.7.0")
            .unwrap();
        assert!(updated.contains(r#""rich[jupyter]~=13.7.0; python_version >= '3.8'""#));

        let updated = PyprojectTomlParser
            .update_version(&updated, "requests", "2.31.0")
            .unwrap();
        assert!(updated.contains(r#""requests>=2.31.0""#));
        assert!(updated.contains(r#"requires-python = ">=3.9""#));
    }

    #[test]
    fn test_update_poetry_forms() {
        let parser = PyprojectTomlParser;
        let updated = parser.update_version(POETRY, "fastapi", "0.104.1").unwrap();
        let updated = parser.update_version(&updated, "sqlalchemy", "2.0.23").unwrap();

        assert!(updated.contains(r#"fastapi = "^0.104.1""#));
        assert!(updated.contains(r#"sqlalchemy = { version = "^2.0.23", extras = ["asyncio"] }"#));
        assert!(updated.contains(r#"python = "^3.10""#));
    }

    #[test]
    fn test_update_missing_package_is_noop() {
        let updated = PyprojectTomlParser
            .update_version(PEP621, "django", "5.0.0")
            .unwrap();
        assert_eq!(updated, PEP621);
    }

    #[test]
    fn test_update_poetry_leaves_other_tables_alone() {
        let content = r#"[tool.poetry.dependencies]
python = "^3.10"
black = "^23.1"

[tool.poetry.scripts]
black = "mypkg.cli:main"

[tool.black]
target-version = "py310"

[tool.poetry.group.lint.dependencies]
black = { version = "^23.1", extras = ["d"] }
"#;
        let updated = PyprojectTomlParser
            .update_version(content, "black", "24.2.0")
            .unwrap();
        assert_eq!(
            updated,
            r#"[tool.poetry.dependencies]
python = "^3.10"
black = "^24.2.0"

[tool.poetry.scripts]
black = "mypkg.cli:main"

[tool.black]
target-version = "py310"

[tool.poetry.group.lint.dependencies]
black = { version = "^24.2.0", extras = ["d"] }
"#
        );
    }

    #[test]
    fn test_update_pep508_only_in_dependency_arrays() {
        let content = r#"[build-system]
requires = ["setuptools>=61.0"]

[project]
name = "app"
keywords = ["setuptools>=1.0"]
dependencies = [
    "setuptools>=65.0",  # [runtime]
    "rich[jupyter]>=13.0",
]

[project.optional-dependencies]
dev = ["setuptools>=66.0"]

[tool.ruff]
extend-select = ["setuptools>=1.0"]
"#;
        let updated = PyprojectTomlParser
            .update_version(content, "setuptools", "69.0.3")
            .unwrap();
        assert_eq!(
            updated,
            content
                .replace(r#""setuptools>=65.0""#, r#""setuptools>=69.0.3""#)
                .replace(r#""setuptools>=66.0""#, r#""setuptools>=69.0.3""#)
        );
    }

    #[test]
    fn test_table_sections_cover_content() {
        let sections = table_sections(POETRY);
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "",
                "tool.poetry",
                "tool.poetry.dependencies",
                "tool.poetry.dev-dependencies",
                "tool.poetry.group.test.dependencies",
            ]
        );
        let rebuilt: String = sections
            .iter()
            .map(|s| format!("{}{}", &POETRY[s.header.clone()], &POETRY[s.body.clone()]))
            .collect();
        assert_eq!(rebuilt, POETRY);
    }

    #[test]
    fn test_is_poetry_dependency_table() {
        assert!(is_poetry_dependency_table("tool.poetry.dependencies"));
        assert!(is_poetry_dependency_table("tool.poetry.dev-dependencies"));
        assert!(is_poetry_dependency_table("tool.poetry.group.docs.dependencies"));
        assert!(!is_poetry_dependency_table("tool.poetry.scripts"));
        assert!(!is_poetry_dependency_table("tool.poetry.group.docs"));
        assert!(!is_poetry_dependency_table("project"));
    }
}
