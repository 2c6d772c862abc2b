// ── Remote path normalisation & local destination handling ──────────────────

use log::debug;
use oget_core::{OgetError, OgetResult};
use std::fmt;
use std::path::{Component, Path};

/// Rewrite backslash separators as forward slashes.
pub fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// A remote directory in forward-slash form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDir(String);

impl RemoteDir {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize_separators(raw);
        if normalized.is_empty() {
            Self(".".to_string())
        } else {
            Self(normalized)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<dir>/<name>` with exactly one separator between the two.
    pub fn join(&self, name: &str) -> String {
        let base = self.0.trim_end_matches('/');
        if base.is_empty() {
            format!("/{}", name)
        } else {
            format!("{}/{}", base, name)
        }
    }
}

impl fmt::Display for RemoteDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accept a listed name only if it is a single ordinary path component, so the
/// local copy always lands directly under the destination root.
pub fn local_file_name(name: &str) -> OgetResult<&str> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(OgetError::unsafe_entry_name(name));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(OgetError::unsafe_entry_name(name)),
    }
}

/// Create the destination root (and parents) if missing, owner-only on unix.
pub fn ensure_local_root(path: &Path) -> OgetResult<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path).map_err(|e| {
        OgetError::local_storage(format!(
            "failed to create local directory {}: {}",
            path.display(),
            e
        ))
    })?;

    if !path.is_dir() {
        return Err(OgetError::local_storage(format!(
            "{} exists but is not a directory",
            path.display()
        )));
    }
    debug!("Local directory {} ready", path.display());
    Ok(())
}
