use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Docker Engine API socket.
    pub docker_socket: String,
    /// Cap on concurrently running collection tasks per pass.
    pub concurrency: usize,
    /// How many processes the top-by-CPU list carries.
    pub top_processes: usize,
    /// Cap on recent log entries in a snapshot.
    pub log_entries: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            docker_socket: "/var/run/docker.sock".into(),
            concurrency: 8,
            top_processes: 10,
            log_entries: 10,
        }
    }
}

impl AppConfig {
    /// Load from CONFIG_FILE (default `config.toml`); a missing file yields
    /// the built-in defaults. A `PORT` environment variable overrides the
    /// configured listen port either way.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s)?,
            Err(_) => Self::default(),
        };
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a port number, got {port:?}"))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.collection.docker_socket.is_empty(),
            "collection.docker_socket must be non-empty"
        );
        anyhow::ensure!(
            self.collection.concurrency > 0,
            "collection.concurrency must be > 0, got {}",
            self.collection.concurrency
        );
        anyhow::ensure!(
            self.collection.top_processes > 0,
            "collection.top_processes must be > 0, got {}",
            self.collection.top_processes
        );
        Ok(())
    }
}
