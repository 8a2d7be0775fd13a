use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use polynet_crypto::keys::Keypair;
use polynet_net::loopback::LoopbackNetwork;
use polynet_types::Addr;

use crate::error::NodeError;

/// File name written by [`NodeConfig::init`].
pub const CONFIG_FILE: &str = "polynet.toml";

/// Key file name written by [`NodeConfig::init`].
pub const KEY_FILE: &str = "node.key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Path to the hex-encoded identity seed. Relative paths resolve
    /// against the directory holding the config file.
    pub key_path: String,
    /// Constituent network names, highest priority first.
    #[serde(default = "default_networks")]
    pub networks: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Statically known peers.
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

fn default_networks() -> Vec<String> {
    vec![LoopbackNetwork::NAME.to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    pub id: Addr,
    /// Transport addresses, e.g. "udp://10.0.0.2:4242".
    #[serde(default)]
    pub addrs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            key_path: format!("./{}", KEY_FILE),
            networks: default_networks(),
            logging: LoggingConfig::default(),
            peers: Vec::new(),
        }
    }
}

/// Directory used when the CLI is not given one: `~/.polynet`.
pub fn default_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".polynet"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file used when the CLI is not given one.
pub fn default_config_path() -> PathBuf {
    default_dir().join(CONFIG_FILE)
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: NodeConfig = toml::from_str(&contents).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to parse config file '{}': {}", path.display(), e),
        })?;
        Ok(config)
    }

    /// Initialize a default configuration file and a fresh key in the given
    /// directory. Returns the path of the config file.
    ///
    /// An existing config file is never overwritten. An existing key file is
    /// kept, so re-running init does not change the node's identity.
    pub fn init(dir: &Path) -> Result<PathBuf, NodeError> {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }

        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(NodeError::ConfigError {
                reason: format!("config file '{}' already exists", config_path.display()),
            });
        }

        let config = NodeConfig::default();
        let key_path = config.key_path_for(&config_path);
        if !key_path.exists() {
            write_keypair(&key_path, &Keypair::generate())?;
        }

        let toml_str = toml::to_string_pretty(&config).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to serialize default config: {}", e),
        })?;
        std::fs::write(&config_path, toml_str)?;

        Ok(config_path)
    }

    /// Where the key file lives, given the path the config was loaded from.
    pub fn key_path_for(&self, config_path: &Path) -> PathBuf {
        let key_path = Path::new(&self.key_path);
        if key_path.is_absolute() {
            return key_path.to_path_buf();
        }
        let relative = key_path.strip_prefix(".").unwrap_or(key_path);
        match config_path.parent() {
            Some(dir) => dir.join(relative),
            None => relative.to_path_buf(),
        }
    }

    /// Read the node key referenced by this config.
    pub fn load_keypair(&self, config_path: &Path) -> Result<Keypair, NodeError> {
        load_keypair(&self.key_path_for(config_path))
    }
}

/// Read a hex-encoded seed from a key file.
pub fn load_keypair(path: &Path) -> Result<Keypair, NodeError> {
    let contents = std::fs::read_to_string(path).map_err(|e| NodeError::KeyError {
        reason: format!("failed to read key file '{}': {}", path.display(), e),
    })?;
    Keypair::from_hex(&contents).map_err(|e| NodeError::KeyError {
        reason: format!("invalid key file '{}': {}", path.display(), e),
    })
}

/// Write a keypair's seed as hex, readable by the owner only on Unix.
pub fn write_keypair(path: &Path, keypair: &Keypair) -> Result<(), NodeError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let data = format!("{}\n", keypair.to_hex());

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(data.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, data)?;
    }

    Ok(())
}
