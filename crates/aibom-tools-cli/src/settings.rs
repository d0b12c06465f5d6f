use std::path::{Path, PathBuf};

use aibom_tools_core::ConfigurationError;
use serde::Deserialize;

/// Values that may come from a config file or `AIBOM_TOOLS_*` environment variables.
///
/// Environment variables override the file; explicit command-line flags override both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub inventory: Option<PathBuf>,
    pub org_id: Option<String>,
    pub group_id: Option<String>,
    pub include: Option<String>,
    pub policy: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
}

impl Settings {
    pub const ENV_PREFIX: &'static str = "AIBOM_TOOLS";
    pub const INVENTORY_ENV: &'static str = "AIBOM_TOOLS_INVENTORY";

    /// Load the optional config file (format chosen by extension), then the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Settings>())
            .map_err(|err| ConfigurationError::Invalid(err.to_string()))
    }

    /// Inventory directory, preferring the command-line value.
    pub fn resolve_inventory(&self, flag: Option<PathBuf>) -> Result<PathBuf, ConfigurationError> {
        flag.or_else(|| self.inventory.clone())
            .ok_or(ConfigurationError::MissingSetting {
                setting: "inventory directory",
                flag: "--inventory",
                env: Self::INVENTORY_ENV,
            })
    }

    /// "group X" or "organization X" for the scan banner; group wins when both are set.
    pub fn scope_label(&self, org_flag: Option<&str>, group_flag: Option<&str>) -> Option<String> {
        let group = group_flag.or(self.group_id.as_deref());
        let org = org_flag.or(self.org_id.as_deref());
        match (group, org) {
            (Some(group), _) => Some(format!("group {group}")),
            (None, Some(org)) => Some(format!("organization {org}")),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::env;
    use std::fs;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn with_env_lock<F: FnOnce()>(func: F) {
        let _guard = ENV_LOCK.lock().unwrap();
        for key in ["INVENTORY", "ORG_ID", "GROUP_ID", "INCLUDE", "POLICY", "DEBUG"] {
            env::remove_var(format!("{}_{key}", Settings::ENV_PREFIX));
        }
        func();
    }

    #[test]
    fn defaults_without_sources() {
        with_env_lock(|| {
            let settings = Settings::load(None).expect("empty settings should load");
            assert_eq!(settings, Settings::default());
        });
    }

    #[test]
    fn reads_toml_config_file() {
        with_env_lock(|| {
            let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            fs::write(
                file.path(),
                "inventory = \"/srv/inventory\"\norg_id = \"acme\"\ninclude = \"ML Models\"\ndebug = true\n",
            )
            .unwrap();
            let settings = Settings::load(Some(file.path())).unwrap();
            assert_eq!(settings.inventory, Some(PathBuf::from("/srv/inventory")));
            assert_eq!(settings.org_id.as_deref(), Some("acme"));
            assert_eq!(settings.include.as_deref(), Some("ML Models"));
            assert!(settings.debug);
        });
    }

    #[test]
    fn reads_yaml_config_file() {
        with_env_lock(|| {
            let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
            fs::write(file.path(), "group_id: platform\npolicy: ./policy.yaml\n").unwrap();
            let settings = Settings::load(Some(file.path())).unwrap();
            assert_eq!(settings.group_id.as_deref(), Some("platform"));
            assert_eq!(settings.policy, Some(PathBuf::from("./policy.yaml")));
        });
    }

    #[test]
    fn environment_overrides_file() {
        with_env_lock(|| {
            let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            fs::write(file.path(), "org_id = \"from-file\"\n").unwrap();
            env::set_var("AIBOM_TOOLS_ORG_ID", "from-env");
            let settings = Settings::load(Some(file.path())).unwrap();
            env::remove_var("AIBOM_TOOLS_ORG_ID");
            assert_eq!(settings.org_id.as_deref(), Some("from-env"));
        });
    }

    #[test]
    fn missing_config_file_is_a_configuration_error() {
        with_env_lock(|| {
            let err = Settings::load(Some(Path::new("/nonexistent/aibom.toml"))).unwrap_err();
            assert!(matches!(err, ConfigurationError::Invalid(_)));
        });
    }

    #[test]
    fn flag_wins_over_settings_for_inventory() {
        let settings = Settings {
            inventory: Some(PathBuf::from("from-settings")),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolve_inventory(Some(PathBuf::from("from-flag"))).unwrap(),
            PathBuf::from("from-flag")
        );
        assert_eq!(
            settings.resolve_inventory(None).unwrap(),
            PathBuf::from("from-settings")
        );
        let err = Settings::default().resolve_inventory(None).unwrap_err();
        assert!(err.to_string().contains(Settings::INVENTORY_ENV));
    }

    #[test]
    fn scope_label_prefers_group() {
        let settings = Settings {
            org_id: Some("acme".into()),
            ..Settings::default()
        };
        assert_eq!(
            settings.scope_label(None, None).as_deref(),
            Some("organization acme")
        );
        assert_eq!(
            settings.scope_label(None, Some("platform")).as_deref(),
            Some("group platform")
        );
        assert_eq!(Settings::default().scope_label(None, None), None);
    }
}
