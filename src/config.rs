use clap::Parser;
use reqwest::Url;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use tokio::net::lookup_host;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("credential must look like NAME:PASSWORD, got `{0}`")]
    MalformedCredential(String),
    #[error("local url has no host: {0}")]
    MissingHost(Url),
    #[error("local url has no port: {0}")]
    MissingPort(Url),
    #[error("could not resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} resolved to no addresses")]
    NoAddress(String),
    #[error("target url cannot carry a path: {0}")]
    UnusableTarget(Url),
    #[error("failed to build cluster client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A `NAME:PASSWORD` pair from the command line, split at the first `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl FromStr for Credential {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (username, password) = s
            .split_once(':')
            .ok_or_else(|| ConfigError::MalformedCredential(s.to_string()))?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Parser)]
#[command(name = "cluster_gateway")]
#[command(about = "Authenticated REST gateway in front of a search cluster")]
pub struct GatewayConfig {
    /// URL the gateway listens on
    #[arg(short, long, env = "GATEWAY_LOCAL_URL", default_value = "http://localhost:5001")]
    pub local: Url,

    /// URL of the search cluster
    #[arg(short, long, env = "GATEWAY_TARGET_URL", default_value = "http://localhost:9200")]
    pub target: Url,

    /// Skip TLS certificate verification towards the cluster
    #[arg(short = 'n', long = "no-cert")]
    pub no_cert: bool,

    /// Allowed credential, repeatable; replaces the built-in list
    #[arg(short = 'u', long = "user", value_name = "NAME:PASSWORD")]
    pub users: Vec<Credential>,

    /// Serve an in-process fake cluster instead of connecting to the target
    #[arg(long)]
    pub in_memory: bool,
}

impl GatewayConfig {
    pub fn verify_certs(&self) -> bool {
        !self.no_cert
    }

    pub async fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let host = self
            .local
            .host_str()
            .ok_or_else(|| ConfigError::MissingHost(self.local.clone()))?
            .trim_start_matches('[')
            .trim_end_matches(']');
        let port = self
            .local
            .port_or_known_default()
            .ok_or_else(|| ConfigError::MissingPort(self.local.clone()))?;

        let mut addrs = lookup_host((host, port))
            .await
            .map_err(|source| ConfigError::Resolve {
                host: host.to_string(),
                source,
            })?;
        addrs
            .next()
            .ok_or_else(|| ConfigError::NoAddress(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_local_ports() {
        let config = GatewayConfig::try_parse_from(["cluster_gateway"]).unwrap();
        assert_eq!(config.local.as_str(), "http://localhost:5001/");
        assert_eq!(config.target.as_str(), "http://localhost:9200/");
        assert!(config.verify_certs());
        assert!(config.users.is_empty());
        assert!(!config.in_memory);
    }

    #[test]
    fn should_parse_short_flags() {
        let config = GatewayConfig::try_parse_from([
            "cluster_gateway",
            "-l",
            "http://0.0.0.0:8080",
            "-t",
            "https://search.internal:9243",
            "-n",
            "-u",
            "ops:s3:cret",
            "-u",
            "viewer:pw",
        ])
        .unwrap();

        assert_eq!(config.target.scheme(), "https");
        assert!(!config.verify_certs());
        assert_eq!(
            config.users,
            vec![
                Credential {
                    username: "ops".to_string(),
                    password: "s3:cret".to_string()
                },
                Credential {
                    username: "viewer".to_string(),
                    password: "pw".to_string()
                },
            ]
        );
    }

    #[test]
    fn should_reject_credential_without_separator() {
        let res = GatewayConfig::try_parse_from(["cluster_gateway", "-u", "nopassword"]);
        assert!(res.is_err());
    }

    #[test]
    fn should_reject_invalid_target_url() {
        let res = GatewayConfig::try_parse_from(["cluster_gateway", "-t", "not a url"]);
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn should_resolve_bind_address_from_local_url() {
        let config =
            GatewayConfig::try_parse_from(["cluster_gateway", "-l", "http://127.0.0.1:5001"])
                .unwrap();
        let addr = config.bind_address().await.unwrap();
        assert_eq!(addr, "127.0.0.1:5001".parse().unwrap());
    }

    #[tokio::test]
    async fn should_use_scheme_default_port() {
        let config =
            GatewayConfig::try_parse_from(["cluster_gateway", "-l", "http://127.0.0.1"]).unwrap();
        assert_eq!(config.bind_address().await.unwrap().port(), 80);
    }
}
