//! Config loading and certificate setup.

use std::path::{Path, PathBuf};

use stagecast_protocol::SelfSignedCert;
use tracing::info;

use crate::config::Config;
use crate::error::CoordinatorError;

/// Load configuration from the given path, or the default location.
pub fn load_config(path: Option<&str>) -> Result<Config, CoordinatorError> {
    let config_path = match path {
        Some(p) => PathBuf::from(p),
        None => default_config_path(),
    };

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| CoordinatorError::Config(format!("failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CoordinatorError::Config(format!("failed to parse config: {e}")))?;
        info!(path = %config_path.display(), "loaded config");
        Ok(config)
    } else {
        info!("no config file found, using defaults");
        Ok(Config::default())
    }
}

/// Load TLS cert and key from the config directory, or generate if missing.
pub fn load_or_generate_certs(config_dir: &Path) -> Result<(String, String), CoordinatorError> {
    let cert_path = config_dir.join("stagecast.crt");
    let key_path = config_dir.join("stagecast.key");

    if cert_path.exists() && key_path.exists() {
        let cert_pem = std::fs::read_to_string(&cert_path)
            .map_err(|e| CoordinatorError::Config(format!("failed to read cert: {e}")))?;
        let key_pem = std::fs::read_to_string(&key_path)
            .map_err(|e| CoordinatorError::Config(format!("failed to read key: {e}")))?;
        info!(path = %cert_path.display(), "loaded existing TLS cert");
        Ok((cert_pem, key_pem))
    } else {
        std::fs::create_dir_all(config_dir)
            .map_err(|e| CoordinatorError::Config(format!("failed to create config dir: {e}")))?;

        let cert = SelfSignedCert::generate(&local_hostname())
            .map_err(|e| CoordinatorError::Config(format!("failed to generate cert: {e}")))?;

        std::fs::write(&cert_path, &cert.cert_pem)
            .map_err(|e| CoordinatorError::Config(format!("failed to write cert: {e}")))?;
        std::fs::write(&key_path, &cert.key_pem)
            .map_err(|e| CoordinatorError::Config(format!("failed to write key: {e}")))?;

        info!(fingerprint = %cert.fingerprint, "generated new TLS cert");
        Ok((cert.cert_pem, cert.key_pem))
    }
}

/// Hostname used as the certificate common name.
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "stagecast".to_string())
}

/// Get the default config directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("stagecast")
}

/// Get the default config file path.
fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
