use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "wpm")
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("wpm_config.json"))
    }

    pub fn data_dir() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn results_path() -> PathBuf {
        Self::data_dir().join("results.csv")
    }

    pub fn log_path() -> PathBuf {
        Self::data_dir().join("wpm.log")
    }
}
