//! Profiling configuration: which properties, measures and correlations
//! are active, plus the named presets.

use crate::registry::{MeasureKey, ALL_MEASURES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Graph-level properties that are individually gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    Diameter,
    EffectiveDiameter,
}

pub const ALL_PROPERTIES: [PropertyKey; 2] =
    [PropertyKey::Diameter, PropertyKey::EffectiveDiameter];

impl PropertyKey {
    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::Diameter => "Diameter",
            PropertyKey::EffectiveDiameter => "EffectiveDiameter",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        ALL_PROPERTIES.iter().copied().find(|k| k.name() == name)
    }
}

/// Correlation coefficient kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CorrelationKind {
    Pearson,
    Spearman,
    Fechner,
}

pub const ALL_CORRELATIONS: [CorrelationKind; 3] = [
    CorrelationKind::Pearson,
    CorrelationKind::Spearman,
    CorrelationKind::Fechner,
];

impl CorrelationKind {
    pub fn name(self) -> &'static str {
        match self {
            CorrelationKind::Pearson => "Pearson",
            CorrelationKind::Spearman => "Spearman",
            CorrelationKind::Fechner => "Fechner",
        }
    }

    /// Full display name used in report headings.
    pub fn display_name(self) -> &'static str {
        match self {
            CorrelationKind::Pearson => "Pearson's Correlation Coefficient",
            CorrelationKind::Spearman => "Spearman's Rank Correlation Coefficient",
            CorrelationKind::Fechner => "Fechner's Correlation Coefficient",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        ALL_CORRELATIONS.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for CorrelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named preset flag combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Minimal,
    Default,
    Complete,
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minimal" => Ok(Preset::Minimal),
            "default" => Ok(Preset::Default),
            "complete" => Ok(Preset::Complete),
            other => Err(Error::UnknownPreset(other.to_string())),
        }
    }
}

/// Controls which properties, measures and correlations a profile computes.
///
/// All options start disabled. Typed accessors take the closed key enums;
/// the string-keyed mirror surface follows the original profiler contract:
/// writing an unknown key is silently ignored, reading one is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    properties: BTreeMap<PropertyKey, bool>,
    measures: BTreeMap<MeasureKey, bool>,
    correlations: BTreeMap<CorrelationKind, bool>,
}

impl Config {
    /// All options off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the fixed flag combination for a named preset.
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Config::new();
        match preset {
            Preset::Minimal => {
                config.set_measure(MeasureKey::Degree, true);
                config.set_measure(MeasureKey::ConnectedComponents, true);
            }
            Preset::Default => {
                config.set_property(PropertyKey::Diameter, true);
                config.set_measure(MeasureKey::Degree, true);
                config.set_measure(MeasureKey::ClusteringCoefficient, true);
                config.set_measure(MeasureKey::PageRank, true);
                config.set_measure(MeasureKey::Betweenness, true);
                config.set_measure(MeasureKey::Katz, true);
                config.set_measure(MeasureKey::CoreDecomposition, true);
                config.set_measure(MeasureKey::ConnectedComponents, true);
                config.set_measure(MeasureKey::Communities, true);
                config.set_measure(MeasureKey::CoreShells, true);
                config.set_correlation(CorrelationKind::Spearman, true);
            }
            Preset::Complete => {
                config.set_property(PropertyKey::Diameter, true);
                config.set_property(PropertyKey::EffectiveDiameter, true);
                for key in ALL_MEASURES {
                    config.set_measure(key, true);
                }
                config.set_correlation(CorrelationKind::Spearman, true);
            }
        }
        config
    }

    pub fn set_property(&mut self, key: PropertyKey, enabled: bool) {
        self.properties.insert(key, enabled);
    }

    pub fn property(&self, key: PropertyKey) -> bool {
        self.properties.get(&key).copied().unwrap_or(false)
    }

    pub fn set_measure(&mut self, key: MeasureKey, enabled: bool) {
        self.measures.insert(key, enabled);
    }

    pub fn measure(&self, key: MeasureKey) -> bool {
        self.measures.get(&key).copied().unwrap_or(false)
    }

    pub fn set_correlation(&mut self, key: CorrelationKind, enabled: bool) {
        self.correlations.insert(key, enabled);
    }

    pub fn correlation(&self, key: CorrelationKind) -> bool {
        self.correlations.get(&key).copied().unwrap_or(false)
    }

    /// Enabled correlation kinds in a fixed order.
    pub fn enabled_correlations(&self) -> Vec<CorrelationKind> {
        ALL_CORRELATIONS
            .iter()
            .copied()
            .filter(|k| self.correlation(*k))
            .collect()
    }

    // String-keyed surface. Unknown keys: ignored on write, error on read.

    pub fn set_property_named(&mut self, name: &str, enabled: bool) {
        if let Some(key) = PropertyKey::parse(name) {
            self.set_property(key, enabled);
        }
    }

    pub fn property_named(&self, name: &str) -> Result<bool> {
        PropertyKey::parse(name)
            .map(|key| self.property(key))
            .ok_or_else(|| Error::UnknownConfigKey(name.to_string()))
    }

    pub fn set_measure_named(&mut self, name: &str, enabled: bool) {
        if let Some(key) = MeasureKey::parse(name) {
            self.set_measure(key, enabled);
        }
    }

    pub fn measure_named(&self, name: &str) -> Result<bool> {
        MeasureKey::parse(name)
            .map(|key| self.measure(key))
            .ok_or_else(|| Error::UnknownConfigKey(name.to_string()))
    }

    pub fn set_correlation_named(&mut self, name: &str, enabled: bool) {
        if let Some(key) = CorrelationKind::parse(name) {
            self.set_correlation(key, enabled);
        }
    }

    pub fn correlation_named(&self, name: &str) -> Result<bool> {
        CorrelationKind::parse(name)
            .map(|key| self.correlation(key))
            .ok_or_else(|| Error::UnknownConfigKey(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_options_start_disabled() {
        let config = Config::new();
        for key in ALL_MEASURES {
            assert!(!config.measure(key));
        }
        for key in ALL_PROPERTIES {
            assert!(!config.property(key));
        }
        for key in ALL_CORRELATIONS {
            assert!(!config.correlation(key));
        }
    }

    #[test]
    fn minimal_preset_contents() {
        let config = Config::from_preset(Preset::Minimal);
        assert!(config.measure(MeasureKey::Degree));
        assert!(config.measure(MeasureKey::ConnectedComponents));
        assert!(!config.measure(MeasureKey::PageRank));
        assert!(!config.property(PropertyKey::Diameter));
        assert!(config.enabled_correlations().is_empty());
    }

    #[test]
    fn default_preset_contents() {
        let config = Config::from_preset(Preset::Default);
        assert!(config.property(PropertyKey::Diameter));
        assert!(!config.property(PropertyKey::EffectiveDiameter));
        assert!(config.measure(MeasureKey::Betweenness));
        assert!(!config.measure(MeasureKey::KPath));
        assert!(!config.measure(MeasureKey::Closeness));
        assert_eq!(config.enabled_correlations(), vec![CorrelationKind::Spearman]);
    }

    #[test]
    fn complete_preset_enables_everything() {
        let config = Config::from_preset(Preset::Complete);
        for key in ALL_MEASURES {
            assert!(config.measure(key), "{key} should be enabled");
        }
        assert!(config.property(PropertyKey::EffectiveDiameter));
    }

    #[test]
    fn unknown_string_key_ignored_on_write_error_on_read() {
        let mut config = Config::new();
        config.set_measure_named("Centrality.Bogus", true);
        config.set_property_named("Girth", true);
        config.set_correlation_named("Kendall", true);

        assert!(matches!(
            config.measure_named("Centrality.Bogus"),
            Err(Error::UnknownConfigKey(_))
        ));
        assert!(config.measure_named("Centrality.Degree").unwrap() == false);
        assert!(matches!(
            config.property_named("Girth"),
            Err(Error::UnknownConfigKey(_))
        ));
        assert!(matches!(
            config.correlation_named("Kendall"),
            Err(Error::UnknownConfigKey(_))
        ));
    }

    #[test]
    fn unknown_preset_name_is_error() {
        let err = "full".parse::<Preset>().unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(_)));
    }
}
