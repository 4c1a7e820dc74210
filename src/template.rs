//! Fixed strings and knobs of the printed forms.
//!
//! Loaded in this order (later sources override earlier):
//! 1. `Template::default()`
//! 2. an optional TOML file
//! 3. environment variables prefixed with `NOTULEN_` (nested keys split on `__`)

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Document code printed in the minutes header.
    pub report_code: String,
    /// Revision date of the minutes form. Not the meeting date.
    pub report_date: String,
    /// Document code printed in every roster page header.
    pub roster_code: String,
    /// Revision date of the roster form.
    pub roster_date: String,
    /// Prefix of the suggested file name.
    pub file_prefix: String,
    /// Suffix appended to the meeting time, e.g. `09:00 WIB`.
    pub time_zone_label: String,
    pub roster_title_max_chars: usize,
    pub fonts: FontFiles,
}

/// Optional TrueType files; each missing face falls back to base-14 Times.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            report_code: "No.BO.29.3.1-V3 Borang Notulen".into(),
            report_date: "30 Agustus 2017".into(),
            roster_code: "No.BO.29.3.2-V1 Borang Daftar Hadir".into(),
            roster_date: "27 November 2017".into(),
            file_prefix: "Daftar-Hadir".into(),
            time_zone_label: "WIB".into(),
            roster_title_max_chars: 55,
            fonts: FontFiles::default(),
        }
    }
}

impl Template {
    /// Load the template, merging an optional TOML file and the environment
    /// over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Template::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        let template: Template = figment
            .merge(Env::prefixed("NOTULEN_").split("__"))
            .extract()?;
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("report_code", &self.report_code),
            ("report_date", &self.report_date),
            ("roster_code", &self.roster_code),
            ("roster_date", &self.roster_date),
            ("file_prefix", &self.file_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidTemplate {
                    message: format!("{field} must not be empty"),
                });
            }
        }
        if self.roster_title_max_chars == 0 {
            return Err(Error::InvalidTemplate {
                message: "roster_title_max_chars must be greater than 0".into(),
            });
        }
        Ok(())
    }
}
