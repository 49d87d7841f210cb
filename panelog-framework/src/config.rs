//! Panel layout configuration.
//!
//! A layout is an ordered list of panels. From JSON it is an object whose key
//! order is the top-to-bottom order of the panels:
//!
//! ```json
//! {
//!     "process": { "ratio": 3, "title": "Process log", "style": "magenta" },
//!     "update":  { "ratio": 1, "title": "Updates", "style": "blue" }
//! }
//! ```

use crate::error::ViewerError;
use anyhow::{Context, Result};
use panelog_parser::is_valid_panel_name;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};
use std::{collections::HashSet, fmt, fs, path::Path};

const DEFAULT_RATIO: u16 = 1;
const DEFAULT_STYLE: &str = "white";

/// immutable description of one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub name: String,
    /// relative height weight among sibling panels
    pub ratio: u16,
    pub title: String,
    /// colour token, e.g. "cyan", "lightblue" or "#ff8800"
    pub style: String,
}

impl PanelConfig {
    pub fn new(name: impl Into<String>, ratio: u16) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            ratio,
            style: DEFAULT_STYLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// json shape of a single panel entry
#[derive(Debug, Clone, Deserialize, Serialize)]
struct PanelEntry {
    #[serde(default = "default_ratio")]
    ratio: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<String>,
}

fn default_ratio() -> u16 {
    DEFAULT_RATIO
}

/// panel entries in document order, repeated keys included
struct PanelEntries(Vec<(String, PanelEntry)>);

impl<'de> Deserialize<'de> for PanelEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = PanelEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping panel names to panel settings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, PanelEntry>()? {
                    entries.push((name, entry));
                }
                Ok(PanelEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// ordered panel list supplied by the caller at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutConfig {
    panels: Vec<PanelConfig>,
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_panel(mut self, panel: PanelConfig) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn push(&mut self, panel: PanelConfig) {
        self.panels.push(panel);
    }

    pub fn panels(&self) -> &[PanelConfig] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// parses the json object form, keeping key order
    ///
    /// A key given twice is a [`ViewerError::DuplicateName`], not an override.
    pub fn from_json_str(json: &str) -> Result<Self, ViewerError> {
        let PanelEntries(entries) =
            serde_json::from_str(json).map_err(|e| ViewerError::InvalidLayout(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut layout = Self::new();
        for (name, entry) in entries {
            if !is_valid_panel_name(&name) {
                return Err(ViewerError::InvalidLayout(format!(
                    "panel name '{}' must be letters, digits or '_'",
                    name
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(ViewerError::DuplicateName(name));
            }

            let mut panel = PanelConfig::new(name, entry.ratio);
            if let Some(title) = entry.title {
                panel = panel.with_title(title);
            }
            if let Some(style) = entry.style {
                panel = panel.with_style(style);
            }
            layout.push(panel);
        }

        Ok(layout)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
        let layout = Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse layout file: {}", path.display()))?;
        Ok(layout)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut object = serde_json::Map::new();
        for panel in &self.panels {
            let entry = PanelEntry {
                ratio: panel.ratio,
                title: Some(panel.title.clone()),
                style: Some(panel.style.clone()),
            };
            object.insert(panel.name.clone(), serde_json::to_value(entry)?);
        }
        Ok(serde_json::to_string_pretty(&object)?)
    }

    /// layout used when the caller supplies none
    pub fn default_layout() -> Self {
        Self::new()
            .with_panel(
                PanelConfig::new("current_stats", 2)
                    .with_title("📊 Overall stats")
                    .with_style("yellow"),
            )
            .with_panel(
                PanelConfig::new("current_progress", 2)
                    .with_title("🔄 Current progress")
                    .with_style("cyan"),
            )
            .with_panel(
                PanelConfig::new("process", 4)
                    .with_title("📝 Process log")
                    .with_style("magenta"),
            )
            .with_panel(
                PanelConfig::new("update", 2)
                    .with_title("ℹ️ Updates")
                    .with_style("blue"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_insertion_order() {
        let layout = LayoutConfig::from_json_str(
            r#"{
                "zeta": {"ratio": 1, "title": "Z", "style": "red"},
                "alpha": {"ratio": 2},
                "mid": {"ratio": 3, "style": "cyan"}
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = layout.panels().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(layout.panels()[0].title, "Z");
        assert_eq!(layout.panels()[0].style, "red");
    }

    #[test]
    fn test_json_defaults() {
        let layout = LayoutConfig::from_json_str(r#"{"solo": {}}"#).unwrap();
        let panel = &layout.panels()[0];
        assert_eq!(panel.ratio, 1);
        assert_eq!(panel.title, "solo");
        assert_eq!(panel.style, "white");
    }

    #[test]
    fn test_negative_ratio_is_invalid() {
        let result = LayoutConfig::from_json_str(r#"{"a": {"ratio": -1}}"#);
        assert!(matches!(result, Err(ViewerError::InvalidLayout(_))));
    }

    #[test]
    fn test_non_object_is_invalid() {
        let result = LayoutConfig::from_json_str(r#"["a", "b"]"#);
        assert!(matches!(result, Err(ViewerError::InvalidLayout(_))));
    }

    #[test]
    fn test_repeated_key_is_duplicate() {
        let result = LayoutConfig::from_json_str(r#"{"x": {"ratio": 1}, "x": {"ratio": 3}}"#);
        assert_eq!(result, Err(ViewerError::DuplicateName("x".to_string())));
    }

    #[test]
    fn test_untaggable_key_is_invalid() {
        for json in [r#"{"my-panel": {}}"#, r#"{"": {}}"#] {
            let result = LayoutConfig::from_json_str(json);
            assert!(matches!(result, Err(ViewerError::InvalidLayout(_))), "{}", json);
        }
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let layout = LayoutConfig::default_layout();
        let json = layout.to_json_string().unwrap();
        assert_eq!(LayoutConfig::from_json_str(&json).unwrap(), layout);
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"b": {{"ratio": 2}}, "a": {{"title": "First"}}}}"#).unwrap();

        let layout = LayoutConfig::from_file(file.path()).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.panels()[0].name, "b");
        assert_eq!(layout.panels()[1].title, "First");
    }

    #[test]
    fn test_from_missing_file() {
        let result = LayoutConfig::from_file(Path::new("/definitely/not/here.json"));
        assert!(result.is_err());
    }
}
