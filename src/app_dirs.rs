use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("inkreplay"),
            )
        } else {
            ProjectDirs::from("", "", "inkreplay").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    /// Where the binary sends `log` output; stdout belongs to the terminal UI.
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("inkreplay.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lives_in_state_dir() {
        if let (Some(state), Some(log)) = (AppDirs::state_dir(), AppDirs::log_path()) {
            assert_eq!(log.parent(), Some(state.as_path()));
            assert!(log.ends_with("inkreplay.log"));
        }
    }
}
