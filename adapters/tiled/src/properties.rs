use serde::Deserialize;

/// `<properties>` block shared by tilesets, tiles and layers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct XmlProperties {
    #[serde(rename = "property", default)]
    pub(crate) entries: Vec<XmlProperty>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlProperty {
    #[serde(rename = "@name")]
    pub(crate) name: String,
    #[serde(rename = "@value", default)]
    pub(crate) value: String,
}

impl XmlProperties {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }
}
