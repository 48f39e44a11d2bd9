//! Generator configuration.
//!
//! Loaded from `vin-qr.toml` in the config directory (the working directory
//! by default). Every key is optional and falls back to its stock default,
//! unknown keys are rejected to catch typos, and the result is validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! [qr]
//! host = "vins.example.com"   # URLs are https://<host>/<slug>.html
//! min_dimension = 300         # Minimum PNG edge in pixels, before annotation
//!
//! [annotation]
//! tools = ["magick", "convert"]   # Probed in order, first working one wins
//! header_band = 70
//! footer_band = 60
//! header_title = "INGREDIENT &"
//! header_subtitle = "NUTRITION"
//! header_point_size = 22
//! title_offset = 8
//! subtitle_offset = 36
//! footer_point_size = 20
//! footer_offset = 18
//!
//! [page]
//! output_dir = "pages"        # Where <slug>.html is written
//! organic_logo = true         # Copy and show the organic-certification logo
//!
//! [defaults]
//! energy = "350 kJ / 84 kcal" # Used when --energy is not given
//! ```

use crate::vocabulary::Energy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "vin-qr.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// QR encoding and URL settings.
    pub qr: QrConfig,
    /// Header/footer overlay drawn by the external raster tool.
    pub annotation: AnnotationConfig,
    /// Product page output.
    pub page: PageConfig,
    /// Fallbacks for optional request fields.
    pub defaults: DefaultsConfig,
}

impl GeneratorConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.qr.host.trim();
        if host.is_empty() || host.contains("://") || host.contains('/') {
            return Err(ConfigError::Validation(
                "qr.host must be a bare host name like \"vins.example.com\"".into(),
            ));
        }
        if self.qr.min_dimension == 0 {
            return Err(ConfigError::Validation(
                "qr.min_dimension must be non-zero".into(),
            ));
        }
        if self.annotation.tools.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "annotation.tools must name at least one command".into(),
            ));
        }
        if self.annotation.header_band == 0 || self.annotation.footer_band == 0 {
            return Err(ConfigError::Validation(
                "annotation.header_band and annotation.footer_band must be non-zero".into(),
            ));
        }
        if self.page.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page.output_dir must not be empty".into(),
            ));
        }
        if Energy::parse(&self.defaults.energy).is_none() {
            return Err(ConfigError::Validation(format!(
                "defaults.energy '{}' is not '<kJ> kJ / <kcal> kcal'",
                self.defaults.energy
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Host the product pages are published under.
    pub host: String,
    /// Minimum width/height of the rendered code, quiet zone included.
    pub min_dimension: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            host: "vins.example.com".to_string(),
            min_dimension: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    /// Raster tool commands, probed in order.
    pub tools: Vec<String>,
    /// White band added above the code, in pixels.
    pub header_band: u32,
    /// White band added below the code, in pixels.
    pub footer_band: u32,
    pub header_title: String,
    pub header_subtitle: String,
    pub header_point_size: u32,
    /// Distance from the top edge to the title.
    pub title_offset: u32,
    /// Distance from the top edge to the subtitle.
    pub subtitle_offset: u32,
    pub footer_point_size: u32,
    /// Distance from the bottom edge to the energy label.
    pub footer_offset: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            tools: vec!["magick".to_string(), "convert".to_string()],
            header_band: 70,
            footer_band: 60,
            header_title: "INGREDIENT &".to_string(),
            header_subtitle: "NUTRITION".to_string(),
            header_point_size: 22,
            title_offset: 8,
            subtitle_offset: 36,
            footer_point_size: 20,
            footer_offset: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Directory receiving `<slug>.html`. Not created automatically.
    pub output_dir: String,
    /// Whether pages carry the organic-certification logo.
    pub organic_logo: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            output_dir: "pages".to_string(),
            organic_logo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Energy per 100 ml when the request does not give one.
    pub energy: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            energy: "350 kJ / 84 kcal".to_string(),
        }
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Load config from `vin-qr.toml` in `dir`, falling back to stock defaults.
///
/// Every section and key is `#[serde(default)]`, so a partial file takes
/// the stock value for anything it leaves out.
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    let config = match fs::read_to_string(&config_path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => GeneratorConfig::default(),
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

/// A fully-commented stock `vin-qr.toml`. Printed by `vin-qr gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# vin-qr configuration
# ====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys are rejected.

# ---------------------------------------------------------------------------
# QR code
# ---------------------------------------------------------------------------
[qr]
# Product pages are published at https://<host>/<slug>.html
host = "vins.example.com"

# Minimum edge of the rendered code in pixels (quiet zone included).
min_dimension = 300

# ---------------------------------------------------------------------------
# Nutrition overlay
# ---------------------------------------------------------------------------
[annotation]
# ImageMagick commands probed in order; the first one that runs is used.
# When none is available the QR image is left unlabeled.
tools = ["magick", "convert"]

# White bands added above and below the code, in pixels.
header_band = 70
footer_band = 60

# Header text, two lines.
header_title = "INGREDIENT &"
header_subtitle = "NUTRITION"
header_point_size = 22
title_offset = 8
subtitle_offset = 36

# Footer energy label: E(100ml)=<kJ>kJ/<kcal>kcal
footer_point_size = 20
footer_offset = 18

# ---------------------------------------------------------------------------
# Product page
# ---------------------------------------------------------------------------
[page]
# Directory receiving <slug>.html. It must already exist; when it does not,
# the page is skipped with a warning and the QR code is still produced.
output_dir = "pages"

# Copy organic-logo.png next to the pages and show it.
organic_logo = true

# ---------------------------------------------------------------------------
# Defaults for optional inputs
# ---------------------------------------------------------------------------
[defaults]
# Energy per 100 ml, "<kJ> kJ / <kcal> kcal" or a bare kJ value.
energy = "350 kJ / 84 kcal"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.qr.host, "vins.example.com");
        assert_eq!(config.annotation.tools, vec!["magick", "convert"]);
        assert_eq!(config.annotation.header_band, 70);
        assert_eq!(config.annotation.footer_band, 60);
        assert_eq!(config.page.output_dir, "pages");
        assert!(config.page.organic_logo);
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config: GeneratorConfig = toml::from_str(
            r#"
[qr]
host = "qr.domaine.fr"
"#,
        )
        .unwrap();
        assert_eq!(config.qr.host, "qr.domaine.fr");
        assert_eq!(config.qr.min_dimension, 300);
        assert_eq!(config.page.output_dir, "pages");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[annotation]
tools = ["convert"]

[page]
output_dir = "/srv/www/vins"
organic_logo = false
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.annotation.tools, vec!["convert"]);
        assert_eq!(config.annotation.header_band, 70);
        assert_eq!(config.page.output_dir, "/srv/www/vins");
        assert!(!config.page.organic_logo);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "not toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[qr]\nhots = \"x\"\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<GeneratorConfig, _> = toml::from_str("[printer]\nmodel = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_url_as_host() {
        let mut config = GeneratorConfig::default();
        config.qr.host = "https://vins.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_tools() {
        let mut config = GeneratorConfig::default();
        config.annotation.tools = vec![];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_band() {
        let mut config = GeneratorConfig::default();
        config.annotation.footer_band = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_default_energy() {
        let mut config = GeneratorConfig::default();
        config.defaults.energy = "lots".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[qr]\nmin_dimension = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "").unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn partial_section_keeps_sibling_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[annotation]\nheader_title = \"INGRÉDIENTS\"\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.annotation.header_title, "INGRÉDIENTS");
        assert_eq!(config.annotation.header_subtitle, "NUTRITION");
        assert_eq!(config.annotation.tools, vec!["magick", "convert"]);
        assert_eq!(config.qr, QrConfig::default());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: GeneratorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, GeneratorConfig::default());
    }
}
