//! Release tree scanning.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::normalize::table_name;
use crate::pattern::NamingPattern;
use crate::plan::LoadPlanEntry;
use crate::release::ReleaseType;
use crate::types::ScanResult;

/// Visits every file under the release type's subtree of `root` and emits
/// a load plan entry for each file accepted by the naming grammar.
///
/// Files that do not match the grammar are skipped silently; release
/// packages legitimately contain readme and metadata files. A missing
/// subtree yields an empty result, not an error. The returned entries are
/// in traversal order; callers re-sort via [`crate::order_plan`] or build
/// a [`crate::LoadPlan`] directly.
pub fn scan_release(root: &Path, release_type: ReleaseType) -> ScanResult<Vec<LoadPlanEntry>> {
    let subtree = root.join(release_type.label());
    if !subtree.is_dir() {
        debug!("no {release_type} subtree under {}", root.display());
        return Ok(Vec::new());
    }

    let pattern = NamingPattern::new(release_type);
    let mut entries = Vec::new();

    for entry in WalkDir::new(&subtree) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy();

        match pattern.classify(&filename) {
            Some(descriptor) => {
                let table = table_name(&descriptor);
                debug!("resolved '{filename}' -> table '{table}'");
                let directory = entry
                    .path()
                    .parent()
                    .unwrap_or(&subtree)
                    .to_path_buf();
                entries.push(LoadPlanEntry {
                    table,
                    directory,
                    filename: filename.into_owned(),
                });
            }
            None => debug!("skipping '{filename}': not an RF2 content file"),
        }
    }

    Ok(entries)
}
