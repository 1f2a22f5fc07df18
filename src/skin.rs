//! Overlay skin definition files
//!
//! A skin is a directory holding `skin.toml` plus the PNG assets it names.
//! Each top-level table in `skin.toml` describes one asset: the table name
//! is the asset's file stem and its `type` field carries the kind tag the
//! overlay dispatches on. Sections load in file order.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::skin;

/// One string-keyed asset section.
///
/// Integer lookups silently fall back to the caller's default on missing or
/// malformed values; skins are user-authored and a bad field must never take
/// the overlay down.
#[derive(Debug, Clone)]
pub struct SkinSection {
    values: toml::Table,
}

impl SkinSection {
    /// Parse a single section from TOML text (used by tests and tools).
    pub fn parse(text: &str) -> Result<Self> {
        let values: toml::Table =
            toml::from_str(text).context("Failed to parse skin section")?;
        Ok(Self { values })
    }

    /// Integer field lookup. Accepts integer values and integer-looking
    /// strings; anything else yields `default`.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.values.get(key) {
            Some(value) => value
                .as_integer()
                .map(|v| v as i32)
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(default),
            None => default,
        }
    }

    /// String field lookup; non-string values read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// The asset kind tag: the `type` field, or `fallback` (conventionally
    /// the section name) when absent.
    pub fn kind<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.get_str("type").unwrap_or(fallback)
    }
}

/// A parsed skin: its directory plus the asset sections in file order.
pub struct Skin {
    pub dir: PathBuf,
    sections: Vec<(String, SkinSection)>,
}

impl Skin {
    /// Read and parse `<dir>/skin.toml`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(skin::FILENAME);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read skin file {:?}", path))?;
        Self::parse(dir, &text)
    }

    /// Parse skin text against an asset directory.
    pub fn parse(dir: &Path, text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)
            .with_context(|| format!("Failed to parse skin file in {:?}", dir))?;

        let mut sections = Vec::new();
        for (name, value) in table {
            match value {
                toml::Value::Table(values) => {
                    sections.push((name, SkinSection { values }));
                }
                _ => warn!("Skipping non-table skin entry '{name}' in {:?}", dir),
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            sections,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &SkinSection)> {
        self.sections.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_keep_file_order() {
        let text = r#"
            [fps]
            type = "fps"

            [analog]
            type = "analog"

            [button-a]
            x = 82
        "#;
        let skin = Skin::parse(Path::new("skins/test"), text).unwrap();
        let names: Vec<&str> = skin.sections().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["fps", "analog", "button-a"]);
    }

    #[test]
    fn test_get_int_defaults() {
        let section = SkinSection::parse(
            r#"
            x = 93
            y = "7"
            rate = "not a number"
            "#,
        )
        .unwrap();
        assert_eq!(section.get_int("x", 0), 93);
        // Integer-looking strings parse
        assert_eq!(section.get_int("y", 0), 7);
        // Malformed and missing fields default silently
        assert_eq!(section.get_int("rate", 15), 15);
        assert_eq!(section.get_int("numx", 50), 50);
    }

    #[test]
    fn test_kind_falls_back_to_section_name() {
        let tagged = SkinSection::parse(r#"type = "fps-indicator""#).unwrap();
        assert_eq!(tagged.kind("frame"), "fps-indicator");

        let untagged = SkinSection::parse("x = 1").unwrap();
        assert_eq!(untagged.kind("button-a"), "button-a");
    }

    #[test]
    fn test_non_table_entries_are_skipped() {
        let skin = Skin::parse(
            Path::new("skins/test"),
            r#"
            version = 2

            [fps]
            rate = 20
            "#,
        )
        .unwrap();
        let names: Vec<&str> = skin.sections().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["fps"]);
    }
}
