use std::path::Path;

use serde::Deserialize;

/// Name of the optional configuration file at the analysed root.
pub const CONFIG_FILE: &str = "dep-graph.toml";

/// Files loaded per parallel batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Configuration loaded from `dep-graph.toml` at the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DepGraphConfig {
    /// Additional path patterns to exclude from discovery (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    /// Number of files read per parallel batch.
    pub batch_size: usize,
    /// Link strength constants.
    pub tuning: Tuning,
}

impl Default for DepGraphConfig {
    fn default() -> Self {
        Self {
            exclude: None,
            batch_size: DEFAULT_BATCH_SIZE,
            tuning: Tuning::default(),
        }
    }
}

/// Strength constants for every link type. All values are in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base strength of an import or re-export.
    pub import_base: f64,
    /// Added per distinct imported symbol beyond the first.
    pub import_symbol_step: f64,
    /// Upper bound of the per-symbol bonus.
    pub import_symbol_cap: f64,
    /// Added when a default binding is imported.
    pub import_default_bonus: f64,
    /// Strength of the first call site between two files.
    pub call_base: f64,
    /// Added per additional call site.
    pub call_step: f64,
    pub inherit_base: f64,
    /// Added once to every edge found on a cycle.
    pub circular_boost: f64,
    /// Weight of the reverse edge when two opposite edges are merged.
    pub reverse_weight: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            import_base: 0.7,
            import_symbol_step: 0.05,
            import_symbol_cap: 0.2,
            import_default_bonus: 0.1,
            call_base: 0.6,
            call_step: 0.1,
            inherit_base: 0.8,
            circular_boost: 0.3,
            reverse_weight: 0.5,
        }
    }
}

impl Tuning {
    /// Strength of an import/export observation carrying `symbol_count`
    /// distinct symbols.
    pub fn import_strength(&self, symbol_count: usize, is_default: bool) -> f64 {
        let extra = symbol_count.saturating_sub(1) as f64 * self.import_symbol_step;
        let mut strength = self.import_base + extra.min(self.import_symbol_cap);
        if is_default {
            strength += self.import_default_bonus;
        }
        strength.min(1.0)
    }
}

impl DepGraphConfig {
    /// Load configuration from `dep-graph.toml` in the given root directory.
    ///
    /// Returns the default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        let config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        };

        if config.batch_size == 0 {
            tracing::warn!("batch_size must be positive, using {DEFAULT_BATCH_SIZE}");
            return Self {
                batch_size: DEFAULT_BATCH_SIZE,
                ..config
            };
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DepGraphConfig::load(dir.path());
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.exclude.is_none());
        assert_eq!(config.tuning, Tuning::default());
    }

    #[test]
    fn test_partial_tuning_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CONFIG_FILE),
            "exclude = [\"vendor\"]\nbatch_size = 8\n\n[tuning]\ncall_base = 0.5\n",
        )
        .unwrap();

        let config = DepGraphConfig::load(dir.path());
        assert_eq!(config.exclude.as_deref(), Some(&["vendor".to_string()][..]));
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.tuning.call_base, 0.5);
        assert_eq!(config.tuning.import_base, 0.7, "unset keys keep defaults");
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), "batch_size = \"many\"").unwrap();
        let config = DepGraphConfig::load(dir.path());
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), "batch_size = 0").unwrap();
        assert_eq!(DepGraphConfig::load(dir.path()).batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_import_strength() {
        let t = Tuning::default();
        assert!((t.import_strength(1, false) - 0.7).abs() < 1e-9);
        assert!((t.import_strength(3, false) - 0.8).abs() < 1e-9);
        assert!((t.import_strength(20, false) - 0.9).abs() < 1e-9, "symbol bonus is capped");
        assert!((t.import_strength(20, true) - 1.0).abs() < 1e-9);
        assert!((t.import_strength(0, true) - 0.8).abs() < 1e-9);
    }
}
