//! Service configuration

use riskdesk_core::CustomerId;
use riskdesk_orchestrator::{Account, InMemoryDirectory, Mode, OpenAiConfig, OrchestratorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Service configuration, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeouts and retry budget
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Generative backend; deterministic mode when absent
    #[serde(default)]
    pub backend: Option<OpenAiConfig>,

    /// Signal lexicon file overriding the built-in table
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Customer accounts served by the in-memory directory
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_file_or_default(config_path)?;
        config.apply_cli(cli);
        Ok(config)
    }

    /// Parse `path` if it exists, otherwise fall back to defaults
    pub fn from_file_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply global CLI overrides. The API key only ever arrives this way.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.deterministic {
            self.backend = None;
        }

        if let Some(backend) = self.backend.as_mut() {
            backend.api_key = cli.api_key.clone().unwrap_or_default();
        }

        if let Some(lexicon) = &cli.lexicon {
            self.lexicon_path = Some(lexicon.clone());
        }
    }

    /// Backend settings, present only when a backend is configured and has a key
    pub fn resolved_backend(&self) -> Option<&OpenAiConfig> {
        self.backend
            .as_ref()
            .filter(|backend| !backend.api_key.trim().is_empty())
    }

    pub fn mode(&self) -> Mode {
        if self.resolved_backend().is_some() {
            Mode::Generative
        } else {
            Mode::Deterministic
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            orchestrator: OrchestratorConfig::default(),
            backend: None,
            lexicon_path: None,
            directory: DirectoryConfig::default(),
        }
    }
}

/// In-memory customer directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Answer unknown ids with the demo account ($100.00 cleared, $23.45 pending)
    #[serde(default = "default_true")]
    pub demo_fallback: bool,

    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            demo_fallback: true,
            accounts: Vec::new(),
        }
    }
}

impl DirectoryConfig {
    pub fn build(&self) -> InMemoryDirectory {
        let directory = if self.demo_fallback {
            InMemoryDirectory::demo()
        } else {
            InMemoryDirectory::new()
        };

        self.accounts.iter().fold(directory, |directory, entry| {
            directory.with_account(
                CustomerId(entry.customer_id),
                Account::new(entry.cleared_cents, entry.pending_cents),
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub customer_id: u64,
    pub cleared_cents: i64,
    #[serde(default)]
    pub pending_cents: i64,
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}
