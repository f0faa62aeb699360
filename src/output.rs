use std::path::Path;

use tracing::info;

use crate::error::PipelineError;

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;
    info!("Output directory ready: {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("site").join("pages");
        ensure_dir(&dist).unwrap();
        assert!(dist.is_dir());
    }

    #[test]
    fn existing_directory_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("keep.html"), "x").unwrap();
        ensure_dir(tmp.path()).unwrap();
        ensure_dir(tmp.path()).unwrap();
        assert!(tmp.path().join("keep.html").exists());
    }

    #[test]
    fn file_in_the_way_is_a_directory_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("dist");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = ensure_dir(&blocker.join("nested")).unwrap_err();
        match err {
            PipelineError::Directory { path, .. } => assert_eq!(path, blocker.join("nested")),
            other => panic!("expected directory error, got {other:?}"),
        }
    }
}
