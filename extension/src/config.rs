use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration compiled into every bundle
const EMBEDDED_CONFIG: &str = include_str!("../extension.toml");

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtensionConfig {
    pub extension: ExtensionInfo,
    pub pages: PagesConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtensionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PagesConfig {
    pub popup: String,
    pub options: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub area: StorageArea,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Synced across the user's signed-in browsers
    #[default]
    Sync,
    Local,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

impl Default for ExtensionInfo {
    fn default() -> Self {
        Self {
            name: String::from("MV3 Starter"),
            version: String::from("0.1.0"),
            description: String::new(),
        }
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            popup: String::from("popup.html"),
            options: String::from("options.html"),
        }
    }
}

impl ExtensionConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: ExtensionConfig =
            toml::from_str(content).context("Failed to parse extension config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;
        Self::parse(&content)
    }

    /// Configuration baked into the bundle at compile time
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_CONFIG)
    }

    /// Embedded configuration, or defaults if it does not parse.
    /// Runtime surfaces use this so a bad config never blocks them.
    pub fn embedded_or_default() -> Self {
        match Self::embedded() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default extension config: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.extension.name.trim().is_empty() {
            anyhow::bail!("extension.name must not be empty");
        }

        if !is_chrome_version(&self.extension.version) {
            anyhow::bail!(
                "extension.version must be 1-4 dot-separated integers in 0-65535, got {:?}",
                self.extension.version
            );
        }

        for (field, page) in [
            ("pages.popup", &self.pages.popup),
            ("pages.options", &self.pages.options),
        ] {
            if !page.ends_with(".html") {
                anyhow::bail!("{} must be an .html file, got {:?}", field, page);
            }
        }

        Ok(())
    }
}

fn is_chrome_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (1..=4).contains(&parts.len())
        && parts.iter().all(|p| is_version_part(p))
}

/// 0-65535, digits only, no leading zeros
fn is_version_part(part: &str) -> bool {
    !part.is_empty()
        && part.chars().all(|c| c.is_ascii_digit())
        && !(part.len() > 1 && part.starts_with('0'))
        && part.parse::<u16>().is_ok()
}
