//! Profile management
//!
//! A profile names a storage session: the region buckets are created in,
//! plus an optional custom endpoint and static credentials. Profiles without
//! credentials fall back to the standard AWS credential chain.

use serde::{Deserialize, Serialize};

use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::manager::DEFAULT_REGION;

/// A named storage session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Region new buckets are created in
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom S3-compatible endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// Secret access key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Address buckets by path instead of virtual host
    #[serde(default)]
    pub path_style: bool,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Profile {
    /// Create a profile using the default credential chain
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: false,
        }
    }

    /// Point the profile at a custom endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        let url = url::Url::parse(endpoint)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "Endpoint must use http or https: {endpoint}"
            )));
        }
        self.endpoint = Some(endpoint.to_string());
        Ok(self)
    }

    /// Attach static credentials
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Static credentials, if both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        }
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    /// Create a new ProfileManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all configured profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        self.find(name)?
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Get a profile by name, if configured
    pub fn find(&self, name: &str) -> Result<Option<Profile>> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.into_iter().find(|p| p.name == name))
    }

    /// Add or update a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut config = self.config_manager.load()?;

        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);

        self.config_manager.save(&config)
    }

    /// Add a profile, failing if the name is taken
    pub fn add(&self, profile: Profile) -> Result<()> {
        if self.exists(&profile.name)? {
            return Err(Error::ProfileExists(profile.name));
        }
        self.set(profile)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.profiles.len();

        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == original_len {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a profile exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.profiles.iter().any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_manager = ConfigManager::with_path(config_path);
        let profile_manager = ProfileManager::with_config_manager(config_manager);
        (profile_manager, temp_dir)
    }

    #[test]
    fn test_profile_new() {
        let profile = Profile::new("site", "eu-west-1");
        assert_eq!(profile.name, "site");
        assert_eq!(profile.region, "eu-west-1");
        assert!(profile.endpoint.is_none());
        assert!(profile.static_credentials().is_none());
        assert!(!profile.path_style);
    }

    #[test]
    fn test_profile_with_endpoint() {
        let profile = Profile::new("local", "us-east-1")
            .with_endpoint("http://localhost:9000")
            .unwrap();
        assert_eq!(profile.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_profile_rejects_bad_endpoint() {
        let result = Profile::new("local", "us-east-1").with_endpoint("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));

        let result = Profile::new("local", "us-east-1").with_endpoint("ftp://host");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_static_credentials_need_both_halves() {
        let mut profile = Profile::new("p", "us-east-1");
        profile.access_key = Some("AKIA".into());
        assert!(profile.static_credentials().is_none());

        let profile = profile.with_credentials("AKIA", "secret");
        assert_eq!(profile.static_credentials(), Some(("AKIA", "secret")));
    }

    #[test]
    fn test_profile_manager_set_and_get() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("prod", "eu-central-1")).unwrap();

        let retrieved = manager.get("prod").unwrap();
        assert_eq!(retrieved.region, "eu-central-1");
    }

    #[test]
    fn test_profile_manager_find_missing() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert!(manager.find("nope").unwrap().is_none());
        assert!(matches!(
            manager.get("nope").unwrap_err(),
            Error::ProfileNotFound(_)
        ));
    }

    #[test]
    fn test_profile_manager_add_rejects_duplicates() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.add(Profile::new("prod", "us-east-1")).unwrap();
        let result = manager.add(Profile::new("prod", "us-west-2"));
        assert!(matches!(result, Err(Error::ProfileExists(_))));
    }

    #[test]
    fn test_profile_update_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("prod", "us-east-1")).unwrap();
        manager.set(Profile::new("prod", "us-west-2")).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].region, "us-west-2");
    }

    #[test]
    fn test_profile_manager_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(Profile::new("prod", "us-east-1")).unwrap();
        manager.remove("prod").unwrap();
        assert!(!manager.exists("prod").unwrap());

        let result = manager.remove("prod");
        assert!(matches!(result, Err(Error::ProfileNotFound(_))));
    }
}
