//! AOV catalogues per render engine.
//!
//! Each engine has a fixed table `key -> (display name, default suffix)` and
//! two curated subsets ("standard" and "advanced"). Tables are built once and
//! handed around by reference; nothing here is global or mutable.
//!
//! An engine without a table (Redshift for now) yields empty results from
//! every lookup so front-ends can simply show nothing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One render pass: stable key, UI label, filename/channel suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AovDescriptor {
    pub key: String,
    pub display_name: String,
    pub suffix: String,
}

/// Supported render engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngine {
    #[default]
    Arnold,
    #[serde(rename = "vray")]
    VRay,
    Redshift,
}

impl RenderEngine {
    pub const ALL: [RenderEngine; 3] = [RenderEngine::Arnold, RenderEngine::VRay, RenderEngine::Redshift];

    /// Identifier used in settings files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderEngine::Arnold => "arnold",
            RenderEngine::VRay => "vray",
            RenderEngine::Redshift => "redshift",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RenderEngine::Arnold => "Arnold",
            RenderEngine::VRay => "V-Ray",
            RenderEngine::Redshift => "Redshift",
        }
    }
}

impl fmt::Display for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RenderEngine {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arnold" => Ok(RenderEngine::Arnold),
            "vray" | "v-ray" | "v_ray" => Ok(RenderEngine::VRay),
            "redshift" => Ok(RenderEngine::Redshift),
            _ => Err(ParseError::UnknownEngine(s.to_string())),
        }
    }
}

/// Compositing operation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Standard,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Standard => "standard",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Level::Standard),
            "advanced" => Ok(Level::Advanced),
            _ => Err(ParseError::UnknownLevel(s.to_string())),
        }
    }
}

/// Errors from parsing engine / level identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownEngine(String),
    UnknownLevel(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownEngine(s) => write!(f, "Unknown render engine: {} (expected arnold, vray, redshift)", s),
            ParseError::UnknownLevel(s) => write!(f, "Unknown level: {} (expected standard, advanced)", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Catalogue of one render engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AovTable {
    entries: IndexMap<String, (String, String)>,
    standard_keys: Vec<String>,
    advanced_keys: Vec<String>,
}

impl AovTable {
    /// Build a table from `(key, display name, suffix)` rows and the two subsets.
    pub fn new(rows: &[(&str, &str, &str)], standard: &[&str], advanced: &[&str]) -> Self {
        let entries = rows
            .iter()
            .map(|(key, name, suffix)| (key.to_string(), (name.to_string(), suffix.to_string())))
            .collect();

        Self {
            entries,
            standard_keys: standard.iter().map(|k| k.to_string()).collect(),
            advanced_keys: advanced.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Built-in catalogue for an engine
    pub fn builtin(engine: RenderEngine) -> Self {
        match engine {
            RenderEngine::Arnold => Self::arnold(),
            RenderEngine::VRay => Self::vray(),
            RenderEngine::Redshift => Self::default(),
        }
    }

    fn arnold() -> Self {
        Self::new(
            &[
                ("background", "Background", "background"),
                ("coat", "Coat", "coat"),
                ("diffuse", "Diffuse", "diffuse"),
                ("direct", "Direct", "direct"),
                ("emission", "Emission", "emission"),
                ("indirect", "Indirect", "indirect"),
                ("specular", "Specular", "specular"),
                ("sss", "SSS", "sss"),
                ("transmission", "Transmission", "transmission"),
                ("volume", "Volume", "volume"),
            ],
            &["direct", "indirect", "emission", "background"],
            &[
                "diffuse",
                "specular",
                "coat",
                "transmission",
                "sss",
                "volume",
                "emission",
                "background",
            ],
        )
    }

    fn vray() -> Self {
        Self::new(
            &[
                ("atmospheric_effects", "Atmosphere", "atmosphere"),
                ("background", "Background", "background"),
                ("caustics", "Caustics", "caustics"),
                ("diffuse", "Diffuse", "diffuse"),
                ("gi", "GI", "GI"),
                ("lighting", "Lighting", "lighting"),
                ("raw_gi", "Raw GI", "rawGI"),
                ("raw_lighting", "Raw Lighting", "rawLight"),
                ("raw_reflection", "Raw Reflection", "rawReflection"),
                ("raw_refraction", "Raw Refraction", "rawRefraction"),
                ("reflection", "Reflection", "reflect"),
                ("reflection_filter", "Reflection Filter", "reflectionFilter"),
                ("refraction", "Refraction", "refract"),
                ("refraction_filter", "Refraction Filter", "refractionFilter"),
                ("sss", "SSS", "SSS"),
                ("self_illumination", "Self-Illumination", "selfIllum"),
                ("specular", "Specular", "specular"),
            ],
            &[
                "atmospheric_effects",
                "background",
                "caustics",
                "gi",
                "lighting",
                "reflection",
                "refraction",
                "sss",
                "self_illumination",
                "specular",
            ],
            &[
                "atmospheric_effects",
                "background",
                "caustics",
                "diffuse",
                "raw_gi",
                "raw_lighting",
                "raw_reflection",
                "raw_refraction",
                "reflection_filter",
                "refraction_filter",
                "sss",
                "self_illumination",
                "specular",
            ],
        )
    }

    /// Full catalogue in declaration order
    pub fn get_all(&self) -> &IndexMap<String, (String, String)> {
        &self.entries
    }

    /// Catalogue restricted to a level's keys, in the level's declared order.
    ///
    /// Keys not present in the catalogue are skipped.
    pub fn get_subset(&self, level: Level) -> IndexMap<String, (String, String)> {
        let keys = match level {
            Level::Standard => &self.standard_keys,
            Level::Advanced => &self.advanced_keys,
        };

        keys.iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Descriptors for a level, in the level's declared order
    pub fn descriptors(&self, level: Level) -> Vec<AovDescriptor> {
        self.get_subset(level)
            .into_iter()
            .map(|(key, (display_name, suffix))| AovDescriptor { key, display_name, suffix })
            .collect()
    }

    pub fn descriptor(&self, key: &str) -> Option<AovDescriptor> {
        self.entries.get(key).map(|(display_name, suffix)| AovDescriptor {
            key: key.to_string(),
            display_name: display_name.clone(),
            suffix: suffix.clone(),
        })
    }

    /// Reverse lookup for front-ends that only hold a label
    pub fn key_for_display_name(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, (name, _))| name == label)
            .map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsets_are_within_catalogue() {
        for engine in RenderEngine::ALL {
            let table = AovTable::builtin(engine);
            for level in [Level::Standard, Level::Advanced] {
                for key in table.get_subset(level).keys() {
                    assert!(table.get_all().contains_key(key), "{} {} {}", engine, level, key);
                }
            }
        }
    }

    #[test]
    fn test_subset_preserves_declared_order() {
        let table = AovTable::builtin(RenderEngine::Arnold);
        let keys: Vec<_> = table.get_subset(Level::Standard).keys().cloned().collect();
        assert_eq!(keys, vec!["direct", "indirect", "emission", "background"]);

        let keys: Vec<_> = table.get_subset(Level::Advanced).keys().cloned().collect();
        assert_eq!(keys[0], "diffuse");
        assert_eq!(keys[7], "background");
    }

    #[test]
    fn test_unconfigured_engine_is_empty() {
        let table = AovTable::builtin(RenderEngine::Redshift);
        assert!(table.is_empty());
        assert!(table.get_subset(Level::Standard).is_empty());
        assert!(table.get_subset(Level::Advanced).is_empty());
        assert!(table.descriptor("diffuse").is_none());
    }

    #[test]
    fn test_unknown_subset_key_is_skipped() {
        let table = AovTable::new(&[("diffuse", "Diffuse", "diffuse")], &["diffuse", "ghost"], &[]);
        let subset = table.get_subset(Level::Standard);
        assert_eq!(subset.len(), 1);
        assert!(table.get_subset(Level::Advanced).is_empty());
    }

    #[test]
    fn test_vray_suffixes() {
        let table = AovTable::builtin(RenderEngine::VRay);
        assert_eq!(table.descriptor("raw_lighting").unwrap().suffix, "rawLight");
        assert_eq!(table.descriptor("self_illumination").unwrap().display_name, "Self-Illumination");
        assert_eq!(table.key_for_display_name("Raw GI"), Some("raw_gi"));
        assert_eq!(table.get_subset(Level::Standard).len(), 10);
        assert_eq!(table.get_subset(Level::Advanced).len(), 13);
    }

    #[test]
    fn test_parse_engine_and_level() {
        assert_eq!("V-Ray".parse::<RenderEngine>().unwrap(), RenderEngine::VRay);
        assert_eq!("ARNOLD".parse::<RenderEngine>().unwrap(), RenderEngine::Arnold);
        assert!("cycles".parse::<RenderEngine>().is_err());
        assert_eq!("advanced".parse::<Level>().unwrap(), Level::Advanced);
        assert!("expert".parse::<Level>().is_err());
    }
}
