use std::{env, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CELEBRATION_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
    pub celebration_duration: Duration,
}

impl Config {
    /// Reads `APP_DATA_DIR`, `PORT` and `CELEBRATION_MS`; unset or unparsable values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let celebration_ms = lookup("CELEBRATION_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CELEBRATION_MS);

        Self {
            data_dir,
            port,
            celebration_duration: Duration::from_millis(celebration_ms),
        }
    }
}
