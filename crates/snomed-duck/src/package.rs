//! Package location resolution.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;
use zip::ZipArchive;

use crate::types::{LoaderError, LoaderResult};

/// A resolved release package root.
///
/// Either the directory the operator supplied, or the first top-level
/// entry of an extracted zip archive. For archives, the extraction
/// directory lives as long as this value.
pub struct PackageRoot {
    root: PathBuf,
    _extracted: Option<TempDir>,
}

impl PackageRoot {
    /// Resolves the operator-supplied package location.
    ///
    /// # Errors
    /// [`LoaderError::InvalidPackage`] for an empty or non-directory
    /// location, [`LoaderError::ZipNotFound`] for a missing archive.
    pub fn resolve(location: &Path) -> LoaderResult<Self> {
        if location.as_os_str().is_empty() {
            return Err(LoaderError::InvalidPackage);
        }

        if location.extension().is_some_and(|ext| ext == "zip") {
            return Self::extract(location);
        }

        if location.is_dir() {
            return Ok(Self {
                root: location.to_path_buf(),
                _extracted: None,
            });
        }

        Err(LoaderError::InvalidPackage)
    }

    fn extract(archive_path: &Path) -> LoaderResult<Self> {
        if !archive_path.is_file() {
            return Err(LoaderError::ZipNotFound {
                path: archive_path.display().to_string(),
            });
        }

        info!("extracting package '{}'", archive_path.display());
        let dir = tempfile::tempdir()?;
        let mut archive = ZipArchive::new(File::open(archive_path)?)?;
        archive.extract(dir.path())?;

        // The release structure sits at the archive's first top-level entry.
        let first = fs::read_dir(dir.path())?
            .next()
            .ok_or(LoaderError::InvalidPackage)??;

        Ok(Self {
            root: first.path(),
            _extracted: Some(dir),
        })
    }

    /// Returns the release root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_empty_location_is_invalid() {
        assert!(matches!(
            PackageRoot::resolve(Path::new("")),
            Err(LoaderError::InvalidPackage)
        ));
    }

    #[test]
    fn test_missing_directory_is_invalid() {
        assert!(matches!(
            PackageRoot::resolve(Path::new("/no/such/release")),
            Err(LoaderError::InvalidPackage)
        ));
    }

    #[test]
    fn test_missing_archive_is_reported() {
        assert!(matches!(
            PackageRoot::resolve(Path::new("/no/such/release.zip")),
            Err(LoaderError::ZipNotFound { .. })
        ));
    }

    #[test]
    fn test_plain_directory_resolves_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        let package = PackageRoot::resolve(dir.path()).unwrap();
        assert_eq!(package.path(), dir.path());
    }

    #[test]
    fn test_archive_resolves_to_first_top_level_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("SnomedCT_Release.zip");

        let mut writer = zip::ZipWriter::new(File::create(&archive_path).unwrap());
        let options = SimpleFileOptions::default();
        writer
            .add_directory("SnomedCT_Release/Snapshot/Terminology", options)
            .unwrap();
        writer
            .start_file(
                "SnomedCT_Release/Snapshot/Terminology/sct2_Concept_Snapshot_INT_20240101.txt",
                options,
            )
            .unwrap();
        writer.write_all(b"id\n").unwrap();
        writer.finish().unwrap();

        let package = PackageRoot::resolve(&archive_path).unwrap();
        assert!(package.path().ends_with("SnomedCT_Release"));
        assert!(package
            .path()
            .join("Snapshot/Terminology/sct2_Concept_Snapshot_INT_20240101.txt")
            .is_file());
    }
}
