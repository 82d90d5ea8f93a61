use crate::storage::{FileStorage, NoStorage, StateStorage};
use std::{env, path::PathBuf, sync::Arc};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(env::var("PORT").ok(), env::var("APP_DATA_DIR").ok())
    }

    pub fn from_vars(port: Option<String>, data_dir: Option<String>) -> Self {
        let port = port
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = match data_dir {
            None => Some(PathBuf::from(DEFAULT_DATA_DIR)),
            Some(value) if value.trim().is_empty() || value.trim().eq_ignore_ascii_case("none") => None,
            Some(value) => Some(PathBuf::from(value)),
        };

        Self { port, data_dir }
    }

    pub fn storage(&self) -> Arc<dyn StateStorage> {
        match &self.data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(NoStorage),
        }
    }
}
