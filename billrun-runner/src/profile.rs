//! Billing profile
//!
//! Loads the billing properties file shared with the launcher scripts. Only
//! the status database credentials are read from it.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::mysql::MySqlConnectOptions;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

static RE_PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(billingDb[A-Za-z]+)[ \t]*=(.*)$").unwrap());

const HOST_KEY: &str = "billingDbHost";
const NAME_KEY: &str = "billingDbName";
const USER_KEY: &str = "billingDbUser";
const PASSWORD_KEY: &str = "billingDbPassword";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("File does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid props file: {}", .0.display())]
    Invalid(PathBuf),
}

/// Status database credentials from a billing properties file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Where the profile was read from; launchers source it too
    pub path: PathBuf,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        if !path.exists() {
            return Err(ProfileError::Missing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path.to_path_buf(), &contents)
    }

    /// Parses `key=value` lines; the first occurrence of a key wins
    pub fn parse(path: PathBuf, contents: &str) -> Result<Self, ProfileError> {
        let mut properties: HashMap<&str, &str> = HashMap::new();
        for capture in RE_PROPERTY.captures_iter(contents) {
            if let (Some(key), Some(value)) = (capture.get(1), capture.get(2)) {
                properties
                    .entry(key.as_str())
                    .or_insert_with(|| value.as_str().trim());
            }
        }

        let (Some(host), Some(database), Some(user), Some(password)) = (
            properties.get(HOST_KEY),
            properties.get(NAME_KEY),
            properties.get(USER_KEY),
            properties.get(PASSWORD_KEY),
        ) else {
            return Err(ProfileError::Invalid(path));
        };

        let (host, port) = match host.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ProfileError::Invalid(path.clone()))?;
                (host.to_string(), Some(port))
            }
            None => (host.to_string(), None),
        };

        if host.is_empty() || database.is_empty() {
            return Err(ProfileError::Invalid(path));
        }

        Ok(Self {
            host,
            port,
            database: database.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            path,
        })
    }

    /// Connection options for the status database
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password);

        match self.port {
            Some(port) => options.port(port),
            None => options,
        }
    }
}
