//! Initial view state loaded from TOML.
//!
//! ```toml
//! [profile]
//! first_name = "Ada"
//! last_name = "Lovelace"
//! age = 3
//!
//! [counter]
//! count = 0
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::StateError;
use crate::view::{validate_age, CounterState, ProfileState};

/// Errors that can occur when loading a seed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read seed file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse seed from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Seed validation failed: {0}")]
    Invalid(#[from] StateError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSeed {
    pub first_name: String,
    pub last_name: String,
    /// Signed so a negative value can be reported instead of failing to parse.
    pub age: i64,
}

/// Initial state for the views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Seed {
    pub profile: ProfileSeed,
    pub counter: CounterState,
}

impl Seed {
    /// Parse and validate a seed from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "inline TOML".to_string())
    }

    /// Read, parse and validate a seed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, format!("'{}'", path.display()))
    }

    fn parse(content: &str, origin: String) -> Result<Self, ConfigError> {
        let seed: Seed =
            toml::from_str(content).map_err(|e| ConfigError::Parse { origin, source: e })?;
        seed.validate()?;
        log::debug!("loaded seed: {seed:?}");
        Ok(seed)
    }

    /// Checks that the profile age is representable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_age(self.profile.age)?;
        Ok(())
    }

    pub fn profile_state(&self) -> Result<ProfileState, StateError> {
        ProfileState::new(
            self.profile.first_name.clone(),
            self.profile.last_name.clone(),
            self.profile.age,
        )
    }

    pub fn counter_state(&self) -> CounterState {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn full_seed() {
        let seed = Seed::from_toml_str(
            r#"
            [profile]
            first_name = "Ada"
            last_name = "Lovelace"
            age = 3

            [counter]
            count = 41
            "#,
        )
        .unwrap();

        let profile = seed.profile_state().unwrap();
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.age, 3);
        assert_eq!(seed.counter_state().count, 41);
    }

    #[test]
    fn missing_keys_default() {
        let seed = Seed::from_toml_str("[profile]\nfirst_name = \"Ada\"\n").unwrap();
        assert_eq!(seed.profile.last_name, "");
        assert_eq!(seed.profile.age, 0);
        assert_eq!(seed.counter, CounterState::default());

        assert_eq!(Seed::from_toml_str("").unwrap(), Seed::default());
    }

    #[test]
    fn negative_age_is_invalid() {
        let err = Seed::from_toml_str("[profile]\nage = -1\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(StateError::InvalidInput { field: "age", .. })
        ));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        for content in [
            "[profile]\nfirstname = \"Ada\"\n",
            "[counter]\ncont = 3\n",
            "[profiles]\nage = 3\n",
        ] {
            let err = Seed::from_toml_str(content).unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }), "{content}: {err}");
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Seed::from_toml_str("[profile\nage = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("inline TOML"));
    }

    #[test]
    fn load_from_file() {
        let path =
            std::env::temp_dir().join(format!("stateview-seed-{}.toml", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "[counter]\ncount = 7").unwrap();
        }

        let seed = Seed::load(&path).unwrap();
        assert_eq!(seed.counter_state().count, 7);
        fs::remove_file(&path).unwrap();

        let err = Seed::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
