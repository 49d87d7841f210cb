use crate::{
    config::{LayoutConfig, PanelConfig},
    error::ViewerError,
    panel::Panel,
};
use panelog_parser::is_valid_panel_name;
use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_PANEL_NAME: &str = "default";
const DEFAULT_PANEL_STYLE: &str = "gray";

/// the fixed set of panels, in layout order
///
/// Built with `&mut self` during startup and shared behind an `Arc` afterwards,
/// which freezes the topology. Untagged lines and unknown tags go to the
/// default panel, which exists from construction on: it sits last until the
/// caller registers a panel under the default name, which then takes its place.
pub struct PanelRegistry {
    panels: Vec<Arc<Panel>>,
    index: HashMap<String, usize>,
    default_name: String,
    default_placed: bool,
    capacity: usize,
}

impl PanelRegistry {
    pub fn new(default_name: impl Into<String>, capacity: usize) -> Result<Self, ViewerError> {
        if capacity == 0 {
            return Err(ViewerError::InvalidCapacity);
        }

        let default_name = default_name.into();
        check_name(&default_name)?;
        let fallback = PanelConfig::new(default_name.clone(), 1).with_style(DEFAULT_PANEL_STYLE);

        let mut registry = Self {
            panels: vec![Arc::new(Panel::new(fallback, capacity))],
            index: HashMap::new(),
            default_name,
            default_placed: false,
            capacity,
        };
        registry.reindex();
        Ok(registry)
    }

    /// registers every panel of `layout` in order
    pub fn from_layout(
        layout: &LayoutConfig,
        default_name: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, ViewerError> {
        let mut registry = Self::new(default_name, capacity)?;
        for panel in layout.panels() {
            registry.register(panel.clone())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, config: PanelConfig) -> Result<(), ViewerError> {
        check_name(&config.name)?;
        if config.ratio == 0 {
            return Err(ViewerError::InvalidRatio(config.name));
        }

        let claims_default = config.name == self.default_name && !self.default_placed;
        if self.index.contains_key(&config.name) && !claims_default {
            return Err(ViewerError::DuplicateName(config.name));
        }

        log::debug!(
            "PanelRegistry: registered panel '{}' (ratio {})",
            config.name,
            config.ratio
        );

        let panel = Arc::new(Panel::new(config, self.capacity));
        if self.default_placed {
            self.panels.push(panel);
        } else if claims_default {
            // replace the implicit default, which always sits last
            self.panels.pop();
            self.panels.push(panel);
            self.default_placed = true;
        } else {
            let last = self.panels.len() - 1;
            self.panels.insert(last, panel);
        }

        self.reindex();
        Ok(())
    }

    /// panel for `name`, or the default panel when `name` is empty or unknown
    pub fn resolve(&self, name: Option<&str>) -> &Arc<Panel> {
        name.filter(|name| !name.is_empty())
            .and_then(|name| self.get(name))
            .unwrap_or_else(|| self.default_panel())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Panel>> {
        self.index.get(name).map(|&idx| &self.panels[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn default_panel(&self) -> &Arc<Panel> {
        // the default name is indexed from construction on
        &self.panels[self.index[&self.default_name]]
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// panels in top-to-bottom layout order
    pub fn panels(&self) -> &[Arc<Panel>] {
        &self.panels
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ratios(&self) -> Vec<u16> {
        self.panels.iter().map(|p| p.config().ratio).collect()
    }

    fn reindex(&mut self) {
        self.index = self
            .panels
            .iter()
            .enumerate()
            .map(|(idx, panel)| (panel.name().to_string(), idx))
            .collect();
    }
}

/// a panel no marker can name would never receive a tagged line
fn check_name(name: &str) -> Result<(), ViewerError> {
    if is_valid_panel_name(name) {
        Ok(())
    } else {
        Err(ViewerError::InvalidLayout(format!(
            "panel name '{}' must be letters, digits or '_'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_ab() -> LayoutConfig {
        LayoutConfig::new()
            .with_panel(PanelConfig::new("a", 1))
            .with_panel(PanelConfig::new("b", 2))
    }

    #[test]
    fn test_layout_order_with_default_last() {
        let registry = PanelRegistry::from_layout(&layout_ab(), DEFAULT_PANEL_NAME, 10).unwrap();
        let names: Vec<&str> = registry.panels().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "b", "default"]);
        assert_eq!(registry.ratios(), vec![1, 2, 1]);
    }

    #[test]
    fn test_duplicate_name() {
        let layout = LayoutConfig::new()
            .with_panel(PanelConfig::new("x", 1))
            .with_panel(PanelConfig::new("x", 3));
        let result = PanelRegistry::from_layout(&layout, DEFAULT_PANEL_NAME, 10);
        assert_eq!(
            result.err(),
            Some(ViewerError::DuplicateName("x".to_string()))
        );
    }

    #[test]
    fn test_zero_ratio() {
        let mut registry = PanelRegistry::new(DEFAULT_PANEL_NAME, 10).unwrap();
        let result = registry.register(PanelConfig::new("flat", 0));
        assert_eq!(result, Err(ViewerError::InvalidRatio("flat".to_string())));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_untaggable_names_are_rejected() {
        let mut registry = PanelRegistry::new(DEFAULT_PANEL_NAME, 10).unwrap();
        for name in ["my-panel", "", "two words"] {
            let result = registry.register(PanelConfig::new(name, 1));
            assert!(matches!(result, Err(ViewerError::InvalidLayout(_))), "{:?}", name);
        }
        assert_eq!(registry.len(), 1);

        assert!(matches!(
            PanelRegistry::new("my-default", 10).err(),
            Some(ViewerError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(
            PanelRegistry::new(DEFAULT_PANEL_NAME, 0).err(),
            Some(ViewerError::InvalidCapacity)
        );
    }

    #[test]
    fn test_explicit_default_keeps_its_position() {
        let layout = LayoutConfig::new()
            .with_panel(PanelConfig::new("default", 3).with_title("Misc"))
            .with_panel(PanelConfig::new("a", 1));
        let registry = PanelRegistry::from_layout(&layout, DEFAULT_PANEL_NAME, 10).unwrap();

        let names: Vec<&str> = registry.panels().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["default", "a"]);
        assert_eq!(registry.default_panel().config().title, "Misc");
    }

    #[test]
    fn test_default_registered_twice_is_duplicate() {
        let mut registry = PanelRegistry::new("main", 10).unwrap();
        registry.register(PanelConfig::new("main", 1)).unwrap();
        assert_eq!(
            registry.register(PanelConfig::new("main", 1)),
            Err(ViewerError::DuplicateName("main".to_string()))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let registry = PanelRegistry::from_layout(&layout_ab(), DEFAULT_PANEL_NAME, 10).unwrap();
        assert_eq!(registry.resolve(Some("a")).name(), "a");
        assert_eq!(registry.resolve(Some("b")).name(), "b");
        assert_eq!(registry.resolve(Some("nope")).name(), "default");
        assert_eq!(registry.resolve(Some("")).name(), "default");
        assert_eq!(registry.resolve(None).name(), "default");
    }

    #[test]
    fn test_resolve_on_empty_layout() {
        let registry =
            PanelRegistry::from_layout(&LayoutConfig::new(), DEFAULT_PANEL_NAME, 10).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(Some("anything")).name(), "default");
    }

    #[test]
    fn test_fresh_registry_resolves() {
        let registry = PanelRegistry::new(DEFAULT_PANEL_NAME, 10).unwrap();
        assert_eq!(registry.resolve(Some("x")).name(), "default");
        assert_eq!(registry.position("default"), Some(0));
    }

    #[test]
    fn test_default_between_other_panels() {
        let layout = LayoutConfig::new()
            .with_panel(PanelConfig::new("a", 1))
            .with_panel(PanelConfig::new("default", 2))
            .with_panel(PanelConfig::new("b", 1));
        let registry = PanelRegistry::from_layout(&layout, DEFAULT_PANEL_NAME, 10).unwrap();
        let names: Vec<&str> = registry.panels().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["a", "default", "b"]);
        assert_eq!(registry.default_panel().config().ratio, 2);
    }

    #[test]
    fn test_custom_default_name() {
        let registry = PanelRegistry::from_layout(&layout_ab(), "other", 10).unwrap();
        assert_eq!(registry.resolve(None).name(), "other");
        assert_eq!(registry.default_name(), "other");
    }
}
