use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hashing-layer configuration. Fixed at genesis; every participant of a
/// chain must load an identical `[hashing]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalConfig {
    pub hashing: HashingSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Which concrete block-digest primitive backs the scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    /// SHA-256 truncated to 128 bits (wide) and masked to 251 bits (felt).
    #[default]
    Sha256Truncated,
}

/// How the vote/proposal timestamp enters the digest.
///
/// There is deliberately no default: the choice must match the deployed
/// verifier, and the two constructions produce different digests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampCommitment {
    /// Timestamp is left out of the digest and only appears in the sign bytes.
    Excluded,
    /// A wide digest of the canonical time string sits between the block id
    /// slot and the chain id slot.
    CanonicalString,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingSection {
    #[serde(default)]
    pub primitive: PrimitiveKind,
    pub timestamp: TimestampCommitment,
}

impl HashingSection {
    pub fn new(timestamp: TimestampCommitment) -> Self {
        Self { primitive: PrimitiveKind::default(), timestamp }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub module_levels: Option<String>,
}

fn default_log_format() -> String { "json".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingSection {
    fn default() -> Self {
        Self { format: default_log_format(), level: default_log_level(), module_levels: None }
    }
}

impl CanonicalConfig {
    pub fn new(hashing: HashingSection) -> Self {
        Self { hashing, logging: LoggingSection::default() }
    }

    /// Load configuration from a TOML file. Only `[hashing].timestamp` is required.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: CanonicalConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Serialize to TOML string (useful for generating template configs).
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
