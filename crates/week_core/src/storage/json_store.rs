use super::PersistenceBackend;
use crate::error::AppError;
use std::path::{Path, PathBuf};

const STORE_DIR_ENV_VAR: &str = "WEEKPLAN_STORE_DIR";

/// Stores each key as `<key>.json` inside one directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Backend rooted at [`store_dir`].
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn staging_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }
}

pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("weekplan"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("weekplan"))
    }
}

impl PersistenceBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    /// Replaces the stored value atomically.
    ///
    /// The value goes to a sibling `.tmp` file first, which is then renamed
    /// over the target. A failed write leaves the previous document intact.
    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| AppError::io(format!("{}: {}", self.dir.display(), err)))?;

        let path = self.path_for(key);
        let staging = self.staging_path_for(key);
        let staged = write_private(&staging, value).and_then(|()| {
            std::fs::rename(&staging, &path)
                .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))
        });
        if staged.is_err() && staging.is_file() {
            std::fs::remove_file(&staging).ok();
        }
        staged
    }
}

fn write_private(path: &Path, value: &str) -> Result<(), AppError> {
    std::fs::write(path, value)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)?;
    }

    Ok(())
}
