use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("folder path is empty")]
    EmptyPath,

    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("{0} is not a folder")]
    NotADirectory(PathBuf),

    #[error("unable to open {path}: {source}")]
    Os {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Opens a folder in the user's file browser
pub trait FolderLauncher: Send + Sync {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

/// Launcher backed by the desktop's default file browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    /// Checks done before handing the path to the OS
    pub fn check(path: &Path) -> Result<(), LaunchError> {
        if path.as_os_str().is_empty() {
            return Err(LaunchError::EmptyPath);
        }
        if !path.exists() {
            return Err(LaunchError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(LaunchError::NotADirectory(path.to_path_buf()));
        }
        Ok(())
    }
}

impl FolderLauncher for SystemLauncher {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        Self::check(path)?;

        debug!("Opening folder {:?}", path);
        open::that(path).map_err(|source| LaunchError::Os {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Opened {:?}", path);
        Ok(())
    }
}
