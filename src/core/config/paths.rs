use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let data_dir = discover_data_dir(&project_root);
        Self::with_dirs(project_root, data_dir)
    }

    pub fn with_dirs(project_root: PathBuf, data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        for dir in [&data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            data_dir,
            log_dir,
        }
    }

    /// Resolves a configured path: absolute paths are kept, relative ones are
    /// taken from the working directory, the way the archive and store folder
    /// are addressed on the command line.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let candidate = PathBuf::from(raw);
        if candidate.is_absolute() {
            return candidate;
        }
        env::current_dir()
            .map(|cwd| cwd.join(&candidate))
            .unwrap_or(candidate)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("CORD_CHAT_ROOT") {
        return PathBuf::from(root);
    }

    if let Ok(cwd) = env::current_dir() {
        if cwd.join("config.yml").exists() {
            return cwd;
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

fn discover_data_dir(project_root: &Path) -> PathBuf {
    if let Ok(dir) = env::var("CORD_CHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    project_root.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_dirs_creates_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_dirs(tmp.path().to_path_buf(), tmp.path().join("data"));
        assert!(paths.log_dir.exists());
        assert_eq!(paths.log_dir, tmp.path().join("data").join("logs"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_dirs(tmp.path().to_path_buf(), tmp.path().to_path_buf());
        let absolute = tmp.path().join("archive.zip");
        assert_eq!(paths.resolve(&absolute.to_string_lossy()), absolute);
    }
}
