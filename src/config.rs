use crate::client::AssistantData;
use crate::utils::get_env_name;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    env,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

const CONFIG_FILE_NAME: &str = "config.yaml";

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_INSTRUCTIONS: &str = "Assist a programmer with their code.";
const ASSISTANT_NAME: &str = "Default Assistant";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bearer credential for the assistant service
    pub api_key: Option<String>,
    /// Model used when a new assistant is created
    pub model: String,
    /// Instructions used when a new assistant is created
    pub instructions: String,
    pub api_base: Option<String>,
    pub organization_id: Option<String>,
    pub proxy: Option<String>,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
    /// Delay between run status checks, in milliseconds
    pub poll_interval: u64,
    /// Longest wait for a run in seconds, 0 waits forever
    pub poll_timeout: u64,
    /// Session key overriding the parent process id
    #[serde(skip)]
    pub session: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            instructions: DEFAULT_INSTRUCTIONS.into(),
            api_base: None,
            organization_id: None,
            proxy: None,
            connect_timeout: 10,
            poll_interval: 100,
            poll_timeout: 600,
            session: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn init() -> Result<Self> {
        let config_path = Self::config_file()?;
        let mut config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Self::default()
        };
        config.load_envs(|name| env::var(name).ok())?;
        Ok(config)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let env_name = get_env_name("config_dir");
        let path = if let Some(v) = env::var_os(env_name) {
            PathBuf::from(v)
        } else {
            let mut dir = dirs::config_dir().ok_or_else(|| anyhow!("Not found config dir"))?;
            dir.push(env!("CARGO_CRATE_NAME"));
            dir
        };
        Ok(path)
    }

    pub fn local_path(name: &str) -> Result<PathBuf> {
        let mut path = Self::config_dir()?;
        path.push(name);
        Ok(path)
    }

    pub fn config_file() -> Result<PathBuf> {
        Self::local_path(CONFIG_FILE_NAME)
    }

    pub fn assistant_data(&self) -> AssistantData {
        AssistantData {
            name: ASSISTANT_NAME.into(),
            instructions: self.instructions.clone(),
            model: self.model.clone(),
        }
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(self.poll_interval),
            timeout: match self.poll_timeout {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    fn load_config(config_path: &Path) -> Result<Self> {
        let ctx = || format!("Failed to load config at {}", config_path.display());
        let content = read_to_string(config_path).with_context(ctx)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|err| anyhow!("{err}"))
            .with_context(ctx)?;
        Ok(config)
    }

    fn load_envs<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get(API_KEY_ENV) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(&get_env_name("model")) {
            self.model = v;
        }
        // CHATGPT_CLI_INIT is the historical name for the instructions override
        if let Some(v) = get(&get_env_name("init")) {
            self.instructions = v;
        }
        if let Some(v) = get(&get_env_name("api_base")) {
            self.api_base = Some(v);
        }
        if let Some(v) = get(&get_env_name("organization_id")) {
            self.organization_id = Some(v);
        }
        if let Some(v) = get(&get_env_name("proxy")) {
            self.proxy = Some(v);
        }
        if let Some(v) = get(&get_env_name("session")) {
            self.session = Some(v);
        }
        if let Some(v) = parse_env(&get, "connect_timeout")? {
            self.connect_timeout = v;
        }
        if let Some(v) = parse_env(&get, "poll_interval")? {
            self.poll_interval = v;
        }
        if let Some(v) = parse_env(&get, "poll_timeout")? {
            self.poll_timeout = v;
        }
        Ok(())
    }
}

fn parse_env<F, T>(get: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let name = get_env_name(key);
    match get(&name) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid value '{v}' for {name}")),
        None => Ok(None),
    }
}
