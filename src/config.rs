use std::{env, path::PathBuf};

pub const DEFAULT_DETECT_ENDPOINT: &str = "https://serverless.roboflow.com/pimples-detection/4";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub detect_endpoint: String,
    /// Classifier credential. Detection is refused while this is unset.
    pub detect_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/state.json"));

        let detect_endpoint = env::var("DETECT_ENDPOINT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DETECT_ENDPOINT.to_string());

        let detect_api_key = env::var("DETECT_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self {
            port,
            data_path,
            detect_endpoint,
            detect_api_key,
        }
    }
}
