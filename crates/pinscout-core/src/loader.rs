use crate::{Error, Result};
use pinscout_deps::{parse_manifest, Manifest};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Path reported for manifests read from stdin
pub const STDIN_PATH: &str = "-";

/// Read a lock file from disk and parse it
///
/// One synchronous read, then a linear scan. Errors carry the path.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading manifest");

    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_manifest(&content).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a lock file from any reader (stdin, in-memory buffers)
///
/// Errors report the path as `-`.
pub fn read_manifest<R: Read>(mut reader: R) -> Result<Manifest> {
    let path = PathBuf::from(STDIN_PATH);
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;

    parse_manifest(&content).map_err(|source| Error::Manifest { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinscout_deps::ManifestError;
    use std::io::Write;

    #[test]
    fn test_load_manifest_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# pinned").unwrap();
        writeln!(file, "dnspython==1.15.0").unwrap();
        writeln!(file, "six==1.10.0    # via requests-file").unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("six").unwrap().origin_comment(), Some("via requests-file"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(dir.path().join("requirements.txt")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.manifest_error().is_none());
    }

    #[test]
    fn test_bad_manifest_keeps_path_and_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "requests==2.13.0").unwrap();
        writeln!(file, "requests==2.13.0").unwrap();

        let err = load_manifest(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
        assert!(matches!(
            err.manifest_error(),
            Some(ManifestError::DuplicateRequirement { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_manifest_from_reader() {
        let manifest = read_manifest("idna==2.5; python_version < '2.7.9'\n".as_bytes()).unwrap();
        assert_eq!(manifest.len(), 1);

        let err = read_manifest("idna>=2.5\n".as_bytes()).unwrap_err();
        match &err {
            Error::Manifest { path, source } => {
                assert_eq!(path, Path::new(STDIN_PATH));
                assert!(matches!(source, ManifestError::MalformedLine { line: 1, .. }));
            }
            other => panic!("expected Manifest error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("-: Malformed line 1"));
    }
}
