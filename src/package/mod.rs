//! Package share-directory lookup.
//!
//! Packages are found through an ament-style resource index: a package `P`
//! installed under prefix `X` has a marker file at
//! `X/share/ament_index/resource_index/packages/P` and its data under
//! `X/share/P`. Prefixes are searched in order; the first match wins.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable listing install prefixes
pub const PREFIX_PATH_VAR: &str = "AMENT_PREFIX_PATH";

const PACKAGE_MARKERS: &str = "share/ament_index/resource_index/packages";

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Cannot find share directory for package {package}")]
    NotFound { package: String },

    #[error("Invalid package name '{0}'")]
    InvalidName(String),
}

/// Resolves a package name to its share directory
pub trait PackageLocator: Send + Sync {
    fn share_directory(&self, package: &str) -> Result<PathBuf, LocateError>;
}

/// Ament resource-index lookup over a list of install prefixes
#[derive(Debug, Clone, Default)]
pub struct AmentIndex {
    prefixes: Vec<PathBuf>,
}

impl AmentIndex {
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    /// Prefixes from `AMENT_PREFIX_PATH`
    pub fn from_env() -> Self {
        let prefixes = env::var_os(PREFIX_PATH_VAR)
            .map(|value| env::split_paths(&value).collect())
            .unwrap_or_default();
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    fn marker(prefix: &Path, package: &str) -> PathBuf {
        prefix.join(PACKAGE_MARKERS).join(package)
    }
}

impl PackageLocator for AmentIndex {
    fn share_directory(&self, package: &str) -> Result<PathBuf, LocateError> {
        if package.is_empty()
            || package == "."
            || package == ".."
            || package.contains(['/', '\\'])
        {
            return Err(LocateError::InvalidName(package.to_string()));
        }

        for prefix in &self.prefixes {
            if Self::marker(prefix, package).is_file() {
                let share = prefix.join("share").join(package);
                tracing::debug!(
                    package = %package,
                    share = %share.display(),
                    "Located package"
                );
                return Ok(share);
            }
        }

        tracing::debug!(
            package = %package,
            prefixes = self.prefixes.len(),
            "Package not found in any prefix"
        );
        Err(LocateError::NotFound {
            package: package.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install(prefix: &Path, package: &str) {
        let markers = prefix.join(PACKAGE_MARKERS);
        fs::create_dir_all(&markers).unwrap();
        fs::write(markers.join(package), "").unwrap();
        fs::create_dir_all(prefix.join("share").join(package)).unwrap();
    }

    #[test]
    fn test_locates_installed_package() {
        let prefix = tempfile::tempdir().unwrap();
        install(prefix.path(), "lss_humanoid");

        let index = AmentIndex::new(vec![prefix.path().to_path_buf()]);
        let share = index.share_directory("lss_humanoid").unwrap();
        assert_eq!(share, prefix.path().join("share/lss_humanoid"));
    }

    #[test]
    fn test_first_prefix_wins() {
        let overlay = tempfile::tempdir().unwrap();
        let underlay = tempfile::tempdir().unwrap();
        install(overlay.path(), "bot");
        install(underlay.path(), "bot");

        let index = AmentIndex::new(vec![
            overlay.path().to_path_buf(),
            underlay.path().to_path_buf(),
        ]);
        assert_eq!(
            index.share_directory("bot").unwrap(),
            overlay.path().join("share/bot")
        );
    }

    #[test]
    fn test_missing_package() {
        let prefix = tempfile::tempdir().unwrap();
        let index = AmentIndex::new(vec![prefix.path().to_path_buf()]);

        let err = index.share_directory("ghost").unwrap_err();
        assert!(matches!(err, LocateError::NotFound { package } if package == "ghost"));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let index = AmentIndex::default();
        assert!(matches!(
            index.share_directory("../etc"),
            Err(LocateError::InvalidName(_))
        ));
        assert!(matches!(
            index.share_directory(""),
            Err(LocateError::InvalidName(_))
        ));
    }
}
