use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ARTIFACT_PATH: &str = "assets/ml/ml_components.onnx";
pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub artifact_path: PathBuf,
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.host);

        let port = parse_or(lookup("PORT"), defaults.port);

        let workers = parse_or(lookup("WORKERS"), defaults.workers).max(1);

        let artifact_path = lookup("ML_COMPONENTS_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.artifact_path);

        let json_limit = parse_or(lookup("JSON_LIMIT"), defaults.json_limit);

        Self {
            host,
            port,
            workers,
            artifact_path,
            json_limit,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
