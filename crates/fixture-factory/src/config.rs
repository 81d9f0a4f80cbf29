//! Configuration types for fixture factories.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generators::Locale;

/// Environment variable selecting the provider locale.
pub const LOCALE_ENV: &str = "FACTORY_LOCALE";
/// Environment variable holding a seed for reproducible generation.
pub const SEED_ENV: &str = "FACTORY_SEED";

/// Factory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Model method invoked by the default saver.
    pub save_method: String,

    /// Model method invoked by the default deleter.
    pub delete_method: String,

    /// Locale of the random-data provider.
    pub locale: Locale,

    /// Seed for reproducible data. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            save_method: "save".to_string(),
            delete_method: "delete".to_string(),
            locale: Locale::default(),
            seed: None,
        }
    }
}

impl FactoryConfig {
    /// Default configuration overridden by `FACTORY_LOCALE` and `FACTORY_SEED`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(locale) = std::env::var(LOCALE_ENV) {
            match locale.parse() {
                Ok(locale) => config.locale = locale,
                Err(e) => warn!("Ignoring {LOCALE_ENV}: {e}"),
            }
        }

        if let Ok(seed) = std::env::var(SEED_ENV) {
            match seed.parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => warn!("Ignoring {SEED_ENV}={seed}: {e}"),
            }
        }

        config
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_save_method(mut self, method: impl Into<String>) -> Self {
        self.save_method = method.into();
        self
    }

    pub fn with_delete_method(mut self, method: impl Into<String>) -> Self {
        self.delete_method = method.into();
        self
    }
}
