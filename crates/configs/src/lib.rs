use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")] 
    pub max_connections: u32,
    #[serde(default = "default_min_connections")] 
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")] 
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")] 
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")] 
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")] 
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// Tunables of the catalog core.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Upper bound on parent-pointer hops when walking towards a root.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// Minimum number of characters in a request rejection reason.
    #[serde(default = "default_min_rejection_reason_len")]
    pub min_rejection_reason_len: usize,
    /// Length of generated office-admin passwords.
    #[serde(default = "default_generated_password_len")]
    pub generated_password_len: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: default_max_tree_depth(),
            min_rejection_reason_len: default_min_rejection_reason_len(),
            generated_password_len: default_generated_password_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_max_tree_depth() -> usize { 64 }
fn default_min_rejection_reason_len() -> usize { 10 }
fn default_generated_password_len() -> usize { 12 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); a missing file falls back to
    /// defaults so that `DATABASE_URL` alone is enough to run.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.database.normalize_from_env();
        self.database.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
        // a zero-valued pool section usually means the table was omitted entirely
        if self.max_connections == 0 { self.max_connections = default_max_connections(); }
        if self.min_connections == 0 { self.min_connections = default_min_connections(); }
        if self.connect_timeout_secs == 0 { self.connect_timeout_secs = default_connect_timeout(); }
        if self.acquire_timeout_secs == 0 { self.acquire_timeout_secs = default_acquire_timeout(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        Ok(())
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tree_depth == 0 {
            return Err(anyhow!("catalog.max_tree_depth must be >= 1"));
        }
        if self.generated_password_len < 8 {
            return Err(anyhow!("catalog.generated_password_len must be >= 8"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_defaults_apply_when_section_missing() {
        let cfg = load_from_str("[database]\nurl = \"sqlite::memory:\"\n").unwrap();
        assert_eq!(cfg.catalog.max_tree_depth, 64);
        assert_eq!(cfg.catalog.min_rejection_reason_len, 10);
        assert_eq!(cfg.database.max_connections, 10);
        assert!(!cfg.logging.json);
    }

    #[test]
    fn rejects_unknown_scheme() {
        let mut cfg = load_from_str("[database]\nurl = \"mysql://localhost/db\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn accepts_sqlite_and_postgres() {
        for url in ["sqlite::memory:", "postgres://u:p@localhost/db"] {
            let mut cfg = load_from_str(&format!("[database]\nurl = \"{url}\"\n")).unwrap();
            assert!(cfg.normalize_and_validate().is_ok(), "{url}");
        }
    }

    #[test]
    fn catalog_overrides_are_read() {
        let cfg = load_from_str("[catalog]\nmax_tree_depth = 8\nmin_rejection_reason_len = 3\n").unwrap();
        assert_eq!(cfg.catalog.max_tree_depth, 8);
        assert_eq!(cfg.catalog.min_rejection_reason_len, 3);
        assert_eq!(cfg.catalog.generated_password_len, 12);
    }
}
