use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the practice client writes its log, since the terminal is busy
    /// drawing the UI.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("kanatap");
            Some(state_dir.join("kanatap.log"))
        } else {
            ProjectDirs::from("", "", "kanatap")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("kanatap.log"))
        }
    }
}
