use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("could not determine the user's home directory")]
    NoHome,
    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Resolve the application home directory.
///
/// - `None` (or blank) resolves to `<user home>/<default_subdir>`.
/// - A leading `~` is expanded against the user home.
/// - Relative paths are made absolute against the current directory.
///
/// When `create` is set, the directory (and parents) are created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured.as_deref().map(str::trim) {
        None | Some("") => user_home()?.join(default_subdir),
        Some(raw) => expand(raw)?,
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(HomeDirError::CurrentDir)?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}

fn expand(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf, HomeDirError> {
    // Windows keeps per-user app state under %APPDATA%.
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Ok(PathBuf::from(appdata));
        }
    }
    dirs::home_dir().ok_or(HomeDirError::NoHome)
}
