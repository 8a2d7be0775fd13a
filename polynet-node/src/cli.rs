use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use polynet_crypto::keys::Keypair;

use crate::config::{self, NodeConfig};
use crate::error::NodeError;
use crate::node::Node;
use crate::registry::NetworkRegistry;
use crate::swarm::LocalSwarm;

#[derive(Parser)]
#[command(
    name = "polynet",
    about = "Polynet overlay node: one address space over many networks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new node configuration and key
    Init {
        /// Output directory (defaults to ~/.polynet)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Generate a new key file
    Keygen {
        /// Path of the key file to write
        #[arg(short, long, default_value = config::KEY_FILE)]
        out: PathBuf,
        /// Replace an existing key file
        #[arg(long)]
        force: bool,
    },
    /// Show the node's address, networks, and peers
    Status {
        /// Path to config file (defaults to ~/.polynet/polynet.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Log level from the config file, used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> String {
        match &self.command {
            Command::Status { config: path } => {
                let path = path.clone().unwrap_or_else(config::default_config_path);
                NodeConfig::load(&path)
                    .map(|c| c.logging.level)
                    .unwrap_or_else(|_| "info".to_string())
            }
            _ => "info".to_string(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), NodeError> {
    match cli.command {
        Command::Init { dir } => {
            let dir = dir.unwrap_or_else(config::default_dir);
            let config_path = NodeConfig::init(&dir)?;
            let config = NodeConfig::load(&config_path)?;
            let keypair = config.load_keypair(&config_path)?;
            println!("Config: {}", config_path.display());
            println!("Key: {}", config.key_path_for(&config_path).display());
            println!("Address: {}", keypair.addr());
            Ok(())
        }
        Command::Keygen { out, force } => {
            if out.exists() && !force {
                return Err(NodeError::KeyError {
                    reason: format!(
                        "key file '{}' already exists (use --force to replace it)",
                        out.display()
                    ),
                });
            }
            let keypair = Keypair::generate();
            config::write_keypair(&out, &keypair)?;
            tracing::info!(path = %out.display(), "wrote key file");
            println!("Public key: {}", hex::encode(keypair.public_key()));
            println!("Address: {}", keypair.addr());
            Ok(())
        }
        Command::Status { config: path } => {
            let config_path = path.unwrap_or_else(config::default_config_path);
            let node_config = NodeConfig::load(&config_path)?;
            let keypair = node_config.load_keypair(&config_path)?;
            let swarm = Arc::new(LocalSwarm::new(&keypair));
            let node = Node::new(&node_config, &keypair, swarm, &NetworkRegistry::builtin()).await?;
            print!("{}", node.status());
            node.close().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        let cli = Cli::parse_from(["polynet", "status", "--config", "/tmp/p.toml"]);
        assert!(matches!(
            cli.command,
            Command::Status { config: Some(ref p) } if p == &PathBuf::from("/tmp/p.toml")
        ));
    }

    #[test]
    fn test_parse_keygen_default_out() {
        let cli = Cli::parse_from(["polynet", "keygen"]);
        assert!(matches!(
            cli.command,
            Command::Keygen { ref out, force: false } if out == &PathBuf::from("node.key")
        ));
    }

    #[test]
    fn test_log_level_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("polynet.toml");
        std::fs::write(&path, "key_path = \"./node.key\"\n[logging]\nlevel = \"debug\"\n").unwrap();

        let cli = Cli::parse_from(["polynet", "status", "-c", path.to_str().unwrap()]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["polynet", "status", "-c", "/nonexistent/polynet.toml"]);
        assert_eq!(cli.log_level(), "info");
    }

    #[tokio::test]
    async fn test_init_then_status() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("node");

        run(Cli::parse_from(["polynet", "init", "--dir", dir.to_str().unwrap()]))
            .await
            .unwrap();
        let config_path = dir.join("polynet.toml");
        run(Cli::parse_from([
            "polynet",
            "status",
            "--config",
            config_path.to_str().unwrap(),
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_status_with_unknown_network_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = NodeConfig::init(tmp.path()).unwrap();
        let contents = std::fs::read_to_string(&config_path).unwrap();
        std::fs::write(
            &config_path,
            contents.replace("\"loopback\"", "\"loopback\", \"mesh\""),
        )
        .unwrap();

        let result = run(Cli::parse_from([
            "polynet",
            "status",
            "--config",
            config_path.to_str().unwrap(),
        ]))
        .await;
        assert!(matches!(result, Err(NodeError::UnknownNetwork { .. })));
    }

    #[tokio::test]
    async fn test_keygen_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("id.key");

        run(Cli::parse_from(["polynet", "keygen", "--out", out.to_str().unwrap()]))
            .await
            .unwrap();
        let first = config::load_keypair(&out).unwrap().addr();

        let again = run(Cli::parse_from(["polynet", "keygen", "--out", out.to_str().unwrap()])).await;
        assert!(matches!(again, Err(NodeError::KeyError { .. })));
        assert_eq!(config::load_keypair(&out).unwrap().addr(), first);

        run(Cli::parse_from([
            "polynet",
            "keygen",
            "--out",
            out.to_str().unwrap(),
            "--force",
        ]))
        .await
        .unwrap();
        assert_ne!(config::load_keypair(&out).unwrap().addr(), first);
    }
}
