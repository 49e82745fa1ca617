//! Zone palette: the fixed priority order of zones, their colors, and the
//! rules that map free-text zone names onto palette entries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Canonical zone name, e.g. "Social".
    pub name: String,
    /// Fill color as a CSS hex string.
    pub color: String,
    /// Lower-case fragments that identify this zone in free text.
    #[serde(default)]
    pub matches: Vec<String>,
    /// Lower-case fragments that veto a match (e.g. "semi" for Social).
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Short label drawn outside the diagram. Defaults to the first four
    /// letters of the name, upper-cased.
    #[serde(default)]
    pub abbrev: Option<String>,
}

impl ZoneSpec {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            matches: vec![name.to_lowercase()],
            excludes: vec![],
            abbrev: None,
        }
    }

    fn with_matches(mut self, matches: &[&str]) -> Self {
        self.matches = matches.iter().map(|m| m.to_string()).collect();
        self
    }

    fn with_excludes(mut self, excludes: &[&str]) -> Self {
        self.excludes = excludes.iter().map(|m| m.to_string()).collect();
        self
    }

    fn with_abbrev(mut self, abbrev: &str) -> Self {
        self.abbrev = Some(abbrev.to_string());
        self
    }

    fn accepts(&self, lowered: &str) -> bool {
        self.matches.iter().any(|m| lowered.contains(m.as_str()))
            && !self.excludes.iter().any(|x| lowered.contains(x.as_str()))
    }

    pub fn label(&self) -> String {
        match &self.abbrev {
            Some(a) => a.clone(),
            None => self.name.chars().take(4).collect::<String>().to_uppercase(),
        }
    }
}

/// Ordered list of zones. Position in the list is the zone's priority: the
/// first zone's sector starts at the top of the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZonePalette {
    zones: Vec<ZoneSpec>,
}

impl Default for ZonePalette {
    fn default() -> Self {
        Self::new(vec![
            ZoneSpec::new("Social", "#16a34a")
                .with_matches(&["social"])
                .with_excludes(&["semi"]),
            ZoneSpec::new("Semisocial", "#f97316")
                .with_matches(&["semisocial", "semi"])
                .with_abbrev("SeS"),
            ZoneSpec::new("Servicio", "#facc15").with_matches(&["servicio", "serv"]),
            ZoneSpec::new("Privada", "#ef4444").with_matches(&["privada", "priv"]),
        ])
    }
}

impl ZonePalette {
    pub fn new(zones: Vec<ZoneSpec>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[ZoneSpec] {
        &self.zones
    }

    pub fn get(&self, name: &str) -> Option<&ZoneSpec> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Priority index of a canonical zone name, or None if not in the palette.
    pub fn priority(&self, name: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.name == name)
    }

    /// Map free text onto a canonical zone name. Exact (case-insensitive)
    /// names win, then the first zone whose fragments match. Text that
    /// matches nothing is returned trimmed.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        let lowered = trimmed.to_lowercase();

        if let Some(z) = self.zones.iter().find(|z| z.name.to_lowercase() == lowered) {
            return z.name.clone();
        }
        match self.zones.iter().find(|z| z.accepts(&lowered)) {
            Some(z) => z.name.clone(),
            None => trimmed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_free_text() {
        let palette = ZonePalette::default();
        assert_eq!(palette.normalize("Área Social"), "Social");
        assert_eq!(palette.normalize("Área Semisocial"), "Semisocial");
        assert_eq!(palette.normalize("zona de serv."), "Servicio");
        assert_eq!(palette.normalize("PRIVADA"), "Privada");
        assert_eq!(palette.normalize("  Jardín "), "Jardín");
        assert_eq!(palette.normalize(""), "");
    }

    #[test]
    fn test_priority_follows_palette_order() {
        let palette = ZonePalette::default();
        assert_eq!(palette.priority("Social"), Some(0));
        assert_eq!(palette.priority("Privada"), Some(3));
        assert_eq!(palette.priority("Jardín"), None);
    }

    #[test]
    fn test_labels() {
        let palette = ZonePalette::default();
        assert_eq!(palette.get("Semisocial").unwrap().label(), "SeS");
        assert_eq!(palette.get("Servicio").unwrap().label(), "SERV");
    }

    #[test]
    fn test_palette_deserializes_from_list() {
        let palette: ZonePalette = serde_json::from_str(
            r##"[{"name": "Day", "color": "#fff", "matches": ["day"]}, {"name": "Night", "color": "#000"}]"##,
        )
        .unwrap();
        assert_eq!(palette.zones().len(), 2);
        assert_eq!(palette.normalize("daytime"), "Day");
    }
}
