use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use ptc_server::{DatastoreConfig, ServerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "ptc-server",
    about = "PTC conference server",
    version,
)]
pub struct Cli {
    /// Listen on this address [default: 0.0.0.0:$PORT, or 0.0.0.0:8080]
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Durable commit log; an in-memory datastore is used when omitted
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Use the datastore emulator named by DATASTORE_EMULATOR_HOST
    #[arg(long, env = "USE_DATASTORE_EMULATOR")]
    pub emulator: bool,

    /// Seconds a conference snapshot is served from cache
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Store this JSON conference configuration before serving
    #[arg(long, value_name = "JSON")]
    pub configuration: Option<PathBuf>,
}

impl Cli {
    /// Load the configuration file, if any, then apply command-line
    /// overrides. `port` is the value of `PORT` from the environment.
    pub fn server_config(&self, port: Option<&str>) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(addr) = self.addr {
            config.bind_addr = addr;
        } else if let Some(port) = port {
            config.bind_addr.set_port(port.parse()?);
        }
        if let Some(path) = &self.data {
            config.datastore = DatastoreConfig::Log { path: path.clone() };
        }
        if self.emulator {
            config.use_emulator = true;
        }
        if let Some(secs) = self.cache_ttl {
            config.cache_ttl_secs = secs;
        }
        if let Some(path) = &self.configuration {
            config.configuration = Some(path.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_sets_default_addr() {
        let cli = Cli::parse_from(["ptc-server"]);
        let config = cli.server_config(Some("9090")).unwrap();
        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(config.datastore, DatastoreConfig::Memory);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ptc-server",
            "--addr",
            "127.0.0.1:7000",
            "--data",
            "/tmp/ptc.log",
            "--cache-ttl",
            "0",
            "--configuration",
            "conference.json",
        ]);
        let config = cli.server_config(Some("9090")).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.datastore, DatastoreConfig::Log { path: "/tmp/ptc.log".into() });
        assert_eq!(config.cache_ttl_secs, 0);
        assert_eq!(config.configuration, Some("conference.json".into()));
    }

    #[test]
    fn bad_port_is_an_error() {
        let cli = Cli::parse_from(["ptc-server"]);
        assert!(cli.server_config(Some("http")).is_err());
    }
}
