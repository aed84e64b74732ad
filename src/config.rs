use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::docx::document::{DocumentOptions, DEFAULT_PARTS};
use crate::engine::{DocumentTextEngine, DEFAULT_PARAGRAPH_SEPARATOR};
use crate::table::Delimiters;

pub const CONFIG_FILENAME: &str = "workdoc.toml";
pub const CONFIG_ENV: &str = "WORKDOC_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub placeholder: PlaceholderSection,
    #[serde(default)]
    pub document: DocumentSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PlaceholderSection {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DocumentSection {
    /// Package part patterns scanned for paragraphs (`*` wildcard).
    #[serde(default)]
    pub parts: Option<Vec<String>>,
    #[serde(default)]
    pub paragraph_separator: Option<String>,
}

impl AppConfig {
    pub fn delimiters(&self) -> anyhow::Result<Delimiters> {
        let d = Delimiters::default();
        let start = self.placeholder.start.clone().unwrap_or(d.start);
        let end = self.placeholder.end.clone().unwrap_or(d.end);
        Delimiters::new(start, end).context("[placeholder] delimiters")
    }

    pub fn document_options(&self) -> DocumentOptions {
        match self.document.parts.as_ref() {
            Some(parts) if !parts.is_empty() => DocumentOptions {
                parts: parts.clone(),
            },
            _ => DocumentOptions::default(),
        }
    }

    pub fn engine(&self) -> DocumentTextEngine {
        let sep = self
            .document
            .paragraph_separator
            .as_deref()
            .unwrap_or(DEFAULT_PARAGRAPH_SEPARATOR);
        DocumentTextEngine::new().with_paragraph_separator(sep)
    }
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn find_default_config(workdir: &Path) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILENAME, 8) {
            return Some(p);
        }
    }
    find_file_upwards(workdir, CONFIG_FILENAME, 8)
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text)
        .with_context(|| format!("parse config toml: {}", path.display()))?;
    Ok(cfg)
}

/// Resolve the config for a run: explicit path, then `WORKDOC_CONFIG`, then
/// an upward search from the cwd and from `workdir`. No file means defaults.
pub fn resolve_config(
    explicit: Option<&Path>,
    workdir: &Path,
) -> anyhow::Result<(AppConfig, Option<PathBuf>)> {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let path = match explicit.map(Path::to_path_buf).or(env_path) {
        Some(p) => {
            if !p.exists() {
                return Err(anyhow!("config not found: {}", p.display()));
            }
            Some(p)
        }
        None => find_default_config(workdir),
    };
    match path {
        Some(p) => Ok((load_config(&p)?, Some(p))),
        None => Ok((AppConfig::default(), None)),
    }
}

fn default_config_text() -> String {
    let parts = DEFAULT_PARTS
        .iter()
        .map(|p| format!("  \"{p}\","))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"# workdoc configuration

[placeholder]
# Placeholders look like {{key}} by default.
start = "{{"
end = "}}"

[document]
# Package parts scanned for paragraphs; `*` matches any characters.
parts = [
{parts}
]
# Separator between paragraphs when printing document text.
paragraph_separator = "\n"
"#
    )
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Err(anyhow!(
            "config already exists: {} (use --force to overwrite)",
            cfg_path.display()
        ));
    }
    std::fs::write(&cfg_path, default_config_text())
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

/// Load a key/value replacement map from a `.json` object or a `.toml` table
/// of strings.
pub fn load_replacement_map(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read replacement map: {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let map = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("parse replacement map json: {}", path.display()))?
    } else {
        toml::from_str(&text)
            .with_context(|| format!("parse replacement map toml: {}", path.display()))?
    };
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_config_parses_to_defaults() {
        let cfg: AppConfig = toml::from_str(&default_config_text()).unwrap();
        assert_eq!(cfg.delimiters().unwrap(), Delimiters::default());
        assert_eq!(cfg.document_options(), DocumentOptions::default());
        assert_eq!(cfg.document.paragraph_separator.as_deref(), Some("\n"));
    }

    #[test]
    fn custom_delimiters_and_parts() {
        let cfg: AppConfig = toml::from_str(
            r#"
[placeholder]
start = "${"
[document]
parts = ["word/document.xml"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.delimiters().unwrap(), Delimiters::new("${", "}").unwrap());
        assert_eq!(cfg.document_options().parts, vec!["word/document.xml".to_string()]);
    }

    #[test]
    fn empty_delimiter_in_config_is_an_error() {
        let cfg: AppConfig = toml::from_str("[placeholder]\nend = \"\"\n").unwrap();
        assert!(cfg.delimiters().is_err());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let p = init_default_config(dir.path(), false).unwrap();
        assert!(p.exists());
        assert!(init_default_config(dir.path(), false).is_err());
        assert!(init_default_config(dir.path(), true).is_ok());
        assert!(load_config(&p).is_ok());
    }

    #[test]
    fn replacement_map_from_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("m.json");
        std::fs::write(&json, r#"{"name": "Ada", "empty": ""}"#).unwrap();
        let toml_path = dir.path().join("m.toml");
        std::fs::write(&toml_path, "name = \"Ada\"\nempty = \"\"\n").unwrap();

        let a = load_replacement_map(&json).unwrap();
        let b = load_replacement_map(&toml_path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get("name").map(String::as_str), Some("Ada"));
    }
}
