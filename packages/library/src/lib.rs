include!(concat!(env!("OUT_DIR"), "/tabs.rs"));

/// A demo tab with its name and persisted JSON source
#[derive(Debug, Clone)]
pub struct DemoTab {
    pub name: String,
    pub content: String,
}

impl DemoTab {
    fn from_entry((name, content): &(&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

/// Get all embedded tabs
pub fn get_all_tabs() -> Vec<DemoTab> {
    TABS.iter().map(DemoTab::from_entry).collect()
}

/// Get a tab by name
pub fn get_tab(name: &str) -> Option<DemoTab> {
    TABS.iter()
        .find(|(n, _)| *n == name)
        .map(DemoTab::from_entry)
}

/// List all tab names
pub fn list_tabs() -> Vec<&'static str> {
    TABS.iter().map(|(name, _)| *name).collect()
}
