use crate::error::StorageError;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically collapses `.` and `..`, refusing anything that climbs above the root or
/// is anchored somewhere else.
fn normalize(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir if out.pop() => {},
            Component::ParentDir => return Err(StorageError::escape(path, "'..' climbs above the root")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::escape(path, "absolute paths are not allowed"));
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(StorageError::escape(path, "path names no file"));
    }
    Ok(out)
}

/// Maps a relative path into `root` (already canonical).
///
/// The deepest ancestor that exists on disk is canonicalized, so a symlink inside the
/// data directory cannot redirect reads or writes outside of it.
pub(crate) fn resolve(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let joined = root.join(normalize(path)?);

    let mut probe = Some(joined.as_path());
    while let Some(candidate) = probe {
        if candidate == root {
            return Ok(joined);
        }
        match candidate.canonicalize() {
            Ok(real) if real.starts_with(root) => return Ok(joined),
            Ok(_) => return Err(StorageError::escape(path, "symlink leads outside the root")),
            Err(err) if err.kind() == io::ErrorKind::NotFound => probe = candidate.parent(),
            Err(err) => {
                return Err(StorageError::Io { source: err, context: Some("Verifying path".into()) });
            },
        }
    }

    Err(StorageError::escape(path, "no ancestor inside the root"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_inner_parent_steps() {
        assert_eq!(normalize(Path::new("a/./b/../c.json")).unwrap(), PathBuf::from("a/c.json"));
    }

    #[test]
    fn test_normalize_rejects_escapes() {
        assert!(normalize(Path::new("../x")).is_err());
        assert!(normalize(Path::new("a/../../x")).is_err());
        assert!(normalize(Path::new("/etc/passwd")).is_err());
        assert!(normalize(Path::new(".")).is_err());
    }
}
