//! Configuration management and validation.
//!
//! Holds the recognised options (non-Latin language suffixes, resource
//! exceptions) and the per-country override table consulted by the header
//! classifier and the level resolver.

use crate::constants::{APP_DIR_NAME, DEFAULT_NON_LATIN_ALPHABETS};
use crate::error::{PcodeError, Result};
use crate::models::AdminLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder replaced by the sheet's admin level in name column overrides
pub const LEVEL_PLACEHOLDER: &str = "{level}";

/// Top-level configuration for a gazetteer run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Two-letter column suffixes for languages written in non-Latin scripts
    pub non_latin_alphabets: BTreeSet<String>,

    /// Country code to the exact resource name holding its gazetteer
    pub resource_exceptions: BTreeMap<String, String>,

    /// Country code to hardcoded deviations from the default heuristics
    pub country_overrides: BTreeMap<String, CountryOverrides>,
}

/// Per-country exceptions to the default heuristics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryOverrides {
    /// Column always used for names, e.g. `ADM{level}_FR`
    pub name_column: Option<String>,

    /// Levels whose parents are not the level directly above
    pub parent_levels: Vec<ParentLevelOverride>,
}

/// `level` sheets reference codes of `parent` instead of `level - 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLevelOverride {
    pub level: AdminLevel,
    pub parent: AdminLevel,
}

impl CountryOverrides {
    /// Name column for `level`, if this country forces one
    pub fn name_column_for(&self, level: AdminLevel) -> Option<String> {
        self.name_column
            .as_ref()
            .map(|template| template.replace(LEVEL_PLACEHOLDER, &level.to_string()))
    }

    /// Parent level override for `level`
    pub fn parent_level_for(&self, level: AdminLevel) -> Option<AdminLevel> {
        self.parent_levels
            .iter()
            .find(|o| o.level == level)
            .map(|o| o.parent)
    }
}

/// Overrides known to be required by published gazetteers
pub fn builtin_country_overrides() -> BTreeMap<String, CountryOverrides> {
    let mut overrides = BTreeMap::new();

    // Cameroon publishes several name columns; the French one is canonical
    overrides.insert(
        "CMR".to_string(),
        CountryOverrides {
            name_column: Some(format!("ADM{LEVEL_PLACEHOLDER}_FR")),
            parent_levels: Vec::new(),
        },
    );

    // Armenian communities reference provinces directly
    if let (Some(level), Some(parent)) = (AdminLevel::new(3), AdminLevel::new(1)) {
        overrides.insert(
            "ARM".to_string(),
            CountryOverrides {
                name_column: None,
                parent_levels: vec![ParentLevelOverride { level, parent }],
            },
        );
    }

    overrides
}

impl Default for Config {
    fn default() -> Self {
        Self {
            non_latin_alphabets: DEFAULT_NON_LATIN_ALPHABETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            resource_exceptions: BTreeMap::new(),
            country_overrides: builtin_country_overrides(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, layering it over the defaults
    ///
    /// Built-in country overrides are kept unless the file replaces the entry
    /// for that country.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|source| {
            PcodeError::ConfigFile {
                path: path.to_path_buf(),
                source,
            }
        })?;

        for (country, overrides) in builtin_country_overrides() {
            config.country_overrides.entry(country).or_insert(overrides);
        }

        let config = config.normalized();
        config.validate()?;

        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Default configuration file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Upper-case country keys and lower-case language suffixes
    fn normalized(self) -> Self {
        Self {
            non_latin_alphabets: self
                .non_latin_alphabets
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
            resource_exceptions: self
                .resource_exceptions
                .into_iter()
                .map(|(k, v)| (k.trim().to_uppercase(), v))
                .collect(),
            country_overrides: self
                .country_overrides
                .into_iter()
                .map(|(k, v)| (k.trim().to_uppercase(), v))
                .collect(),
        }
    }

    /// Reject settings the classifier cannot use
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .non_latin_alphabets
            .iter()
            .find(|s| s.len() != 2 || !s.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return Err(PcodeError::configuration(format!(
                "non_latin_alphabets entries must be two-letter suffixes, found '{}'",
                bad
            )));
        }

        for (country, overrides) in &self.country_overrides {
            if let Some(column) = &overrides.name_column {
                if column.trim().is_empty() {
                    return Err(PcodeError::configuration(format!(
                        "{}: name_column override is empty",
                        country
                    )));
                }
            }
            for o in &overrides.parent_levels {
                if o.parent >= o.level {
                    return Err(PcodeError::configuration(format!(
                        "{}: parent level {} must be above level {}",
                        country, o.parent, o.level
                    )));
                }
            }
        }

        Ok(())
    }

    /// Overrides for `country`, if any
    pub fn overrides_for(&self, country: &str) -> Option<&CountryOverrides> {
        self.country_overrides.get(&country.to_uppercase())
    }

    /// Whether a two-letter suffix names a non-Latin script
    pub fn is_non_latin(&self, suffix: &str) -> bool {
        self.non_latin_alphabets.contains(&suffix.to_lowercase())
    }

    /// Explicit gazetteer resource name for `country`
    pub fn resource_exception(&self, country: &str) -> Option<&str> {
        self.resource_exceptions
            .get(&country.to_uppercase())
            .map(String::as_str)
    }

    /// Replace the set of non-Latin language suffixes
    pub fn with_non_latin_alphabets<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_latin_alphabets = suffixes
            .into_iter()
            .map(|s| s.into().to_lowercase())
            .collect();
        self
    }

    /// Pin the gazetteer resource for a country
    pub fn with_resource_exception(
        mut self,
        country: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        self.resource_exceptions
            .insert(country.into().to_uppercase(), resource.into());
        self
    }

    /// Add or replace the overrides for a country
    pub fn with_country_override(
        mut self,
        country: impl Into<String>,
        overrides: CountryOverrides,
    ) -> Self {
        self.country_overrides
            .insert(country.into().to_uppercase(), overrides);
        self
    }
}
