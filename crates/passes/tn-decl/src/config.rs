//! Resolver configuration

use serde::{Deserialize, Serialize};
use tn_ty::Layout;

/// Errors loading a [`ResolverConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML text did not parse
    #[error("invalid resolver configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unsupported word size
    #[error("{field} must be 4 or 8, got {value}")]
    Width {
        /// Offending key
        field: &'static str,
        /// Offending value
        value: u64,
    },
}

/// Settings for one compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Name of the package being compiled
    pub package: String,
    /// Pointer size in bytes
    pub ptr_width: u64,
    /// `int` size in bytes
    pub int_width: u64,
    /// Record top-level names for the export writer
    pub export_symbols: bool,
    /// Log every declaration stack push and pop
    pub trace_declarations: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            package: "main".to_string(),
            ptr_width: 8,
            int_width: 8,
            export_symbols: false,
            trace_declarations: false,
        }
    }
}

impl ResolverConfig {
    /// Load a configuration from TOML text; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not valid TOML for this structure
    /// or names an unsupported word size.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("ptr-width", self.ptr_width), ("int-width", self.int_width)] {
            if value != 4 && value != 8 {
                return Err(ConfigError::Width { field, value });
            }
        }
        Ok(())
    }

    /// Word sizes used for width computation
    pub fn layout(&self) -> Layout {
        Layout {
            ptr_width: self.ptr_width,
            int_width: self.int_width,
        }
    }
}
