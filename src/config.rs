use crate::identity::{UserDirectory, UserIdentity};
use crate::spam::SpamDetectorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Users known to the directory-backed lookup.
    #[serde(default)]
    pub users: Vec<UserIdentity>,
    #[serde(default)]
    pub spam: SpamDetectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            users: vec![
                UserIdentity::new(1, "alice"),
                UserIdentity::new(2, "bob"),
                UserIdentity::new(3, "carol"),
            ],
            spam: SpamDetectorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn directory(&self) -> crate::Result<UserDirectory> {
        UserDirectory::from_users(self.users.iter().cloned())
    }
}
