use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_DATA_FILE: &str = "data/store.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Where the record store keeps its JSON tree. An empty `data_file` keeps it in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_file: default_data_file() }
    }
}

fn default_data_file() -> String { DEFAULT_DATA_FILE.to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Configuration used when no config file is present: `SERVER_HOST`,
    /// `SERVER_PORT` (default 8081) and `STORE_DATA_FILE`.
    pub fn from_env() -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8081);
        let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());
        let mut store = StoreConfig::default();
        store.normalize_from_env();
        Self { server: ServerConfig { host, port, worker_threads }, store }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize_from_env();
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl StoreConfig {
    /// `STORE_DATA_FILE` overrides the file value, including with an empty string.
    pub fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("STORE_DATA_FILE") {
            self.data_file = path;
        }
        self.data_file = self.data_file.trim().to_string();
    }

    pub fn is_in_memory(&self) -> bool {
        self.data_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 2

            [store]
            data_file = "var/articles.json"
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.store.data_file, "var/articles.json");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        Ok(())
    }

    #[test]
    fn missing_sections_use_defaults() -> Result<()> {
        let cfg: AppConfig = toml::from_str("")?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.store.data_file, DEFAULT_DATA_FILE);
        Ok(())
    }

    #[test]
    fn normalize_fills_blank_host_and_threads() -> Result<()> {
        let mut server = ServerConfig { host: "  ".into(), port: 8080, worker_threads: Some(0) };
        server.normalize()?;
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.worker_threads, Some(4));
        Ok(())
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut server = ServerConfig { host: "localhost".into(), port: 0, worker_threads: None };
        assert!(server.normalize().is_err());
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[store]\ndata_file = \"\"\n")?;
        let cfg = load_from_file(path.to_str().unwrap_or_default())?;
        assert!(cfg.store.data_file.is_empty());
        assert_eq!(cfg.server.port, 8080);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }
}
