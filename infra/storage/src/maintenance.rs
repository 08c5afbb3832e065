use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Marker embedded in temporary file names written by [`Storage::write`](crate::Storage::write).
pub(crate) const TMP_MARKER: &str = ".helmtmp.";

/// Temp files younger than this may belong to a write still in flight.
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Removes temporary files abandoned by interrupted writes.
pub(crate) async fn purge_tmp(root: &Path) -> usize {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || sweep(&root, now)).await {
        Ok(removed) => {
            if removed > 0 {
                info!(removed, "Removed abandoned temporary files");
            }
            removed
        },
        Err(err) => {
            warn!(error = %err, "Temporary file sweep did not complete");
            0
        },
    }
}

fn sweep(root: &Path, now: SystemTime) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER)))
        .filter(|entry| {
            entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .and_then(|modified| now.duration_since(modified).ok())
                .is_none_or(|age| age > STALE_AFTER)
        })
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Failed to remove temporary file");
                false
            },
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_only_touches_stale_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join(format!("helm-config.json{TMP_MARKER}1"));
        let keep = dir.path().join("helm-config.json");
        std::fs::write(&tmp, b"partial").unwrap();
        std::fs::write(&keep, b"{}").unwrap();

        assert_eq!(sweep(dir.path(), SystemTime::now()), 0);
        assert!(tmp.exists());

        let later = SystemTime::now() + STALE_AFTER + Duration::from_secs(1);
        assert_eq!(sweep(dir.path(), later), 1);
        assert!(!tmp.exists());
        assert!(keep.exists());
    }
}
