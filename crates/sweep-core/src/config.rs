use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_SCAN_LIMIT: u32 = 100;
pub const MAX_SCAN_LIMIT: u32 = 1000;
pub const SCAN_TIMEOUT_SECS: u64 = 30; // abandon an in-flight scan after 30s
pub const HISTORY_PAGE_SIZE: u8 = 100; // Discord REST cap per history call

/// Top-level config (sweep.toml + SWEEP_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub http: HttpConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub purge: PurgeConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// When set, slash commands are registered for this guild only.
    /// Guild registration propagates immediately; global takes up to an hour.
    pub guild_id: Option<u64>,
    #[serde(default = "bool_true")]
    pub slash_commands: bool,
}

/// Bounds and timing for the scan-and-delete workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Messages examined per request when the caller omits `limit`.
    #[serde(default = "default_scan_limit")]
    pub default_limit: u32,
    /// Hard cap on `limit` — larger requests are clamped, not rejected.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    /// Overall deadline for one scan (history fetch + deletions).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            default_limit: default_scan_limit(),
            max_limit: default_max_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Static slash commands that reply with a fixed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_return_links")]
    pub return_links: Vec<ReturnLinkCommand>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            return_links: default_return_links(),
        }
    }
}

/// One `/name` command and its canned reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLinkCommand {
    pub name: String,
    pub description: String,
    pub reply: String,
}

fn bool_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_scan_limit() -> u32 {
    DEFAULT_SCAN_LIMIT
}
fn default_max_limit() -> u32 {
    MAX_SCAN_LIMIT
}
fn default_timeout_secs() -> u64 {
    SCAN_TIMEOUT_SECS
}

fn default_return_links() -> Vec<ReturnLinkCommand> {
    vec![
        ReturnLinkCommand {
            name: "bcn".to_string(),
            description: "Get Barcelona return link".to_string(),
            reply: "Barcelona return link: https://www.seur.com/devoluciones/pages/devolucionInicio.do?id=6b98e763-d1a2-431d-a876-912cfc8cd00b".to_string(),
        },
        ReturnLinkCommand {
            name: "madrid".to_string(),
            description: "Get Madrid return link".to_string(),
            reply: "Madrid return link: https://www.seur.com/devoluciones/pages/devolucionInicio.do?id=78822075-b327-4dd1-920d-7865acbf4365".to_string(),
        },
    ]
}

impl SweepConfig {
    /// Load config from a TOML file with SWEEP_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.sweep/sweep.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SweepConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SWEEP_").split("_"))
            .extract()
            .map_err(|e| crate::error::SweepError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sweep/sweep.toml", home)
}
