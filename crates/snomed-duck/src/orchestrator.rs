//! Load orchestration.
//!
//! Drives one run over a resolved package root: per release type, build
//! the load plan, apply schema DDL, import every planned file in order,
//! and validate referential integrity of the association refsets. Imports
//! are strictly sequential on the single engine session; plan order is
//! what guarantees concept data exists before reference sets that key
//! against it.

use std::fs;
use std::path::Path;

use snomed_rf2::{LoadPlan, LoadPlanEntry, ReleaseType};
use tracing::{debug, error, info, warn};

use crate::config::LoaderConfig;
use crate::db::{EngineError, ImportError, SqlEngine};
use crate::types::{LoaderError, LoaderResult};

/// The result of one file import, for reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The file was imported.
    Imported,
    /// The engine has no table for the file's canonical name.
    FormatRejected {
        /// The offending filename.
        filename: String,
        /// Engine error detail.
        detail: String,
    },
    /// The import failed for any other reason.
    Failed {
        /// The offending filename.
        filename: String,
        /// Engine error detail.
        detail: String,
    },
}

/// Aggregated result of a loader run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files imported successfully.
    pub imported: usize,
    /// Files rejected as unrecognised formats.
    pub rejected: usize,
    /// Files that failed to import for other reasons.
    pub failed: usize,
    /// Release types for which a non-empty plan was processed.
    pub loaded: Vec<ReleaseType>,
}

impl RunSummary {
    /// Returns true if at least one release type had files to import.
    pub fn any_imported(&self) -> bool {
        !self.loaded.is_empty()
    }
}

/// Sequential load driver over a [`SqlEngine`] session.
///
/// Owns no database state itself; the engine session is borrowed for the
/// duration of the run and released by its owner on every exit path.
pub struct Orchestrator<'a, E: SqlEngine> {
    engine: &'a E,
    config: LoaderConfig,
}

impl<'a, E: SqlEngine> Orchestrator<'a, E> {
    /// Creates an orchestrator over an engine session.
    pub fn new(engine: &'a E, config: LoaderConfig) -> Self {
        Self { engine, config }
    }

    /// Loads every release type found under `package_root`.
    ///
    /// Release types are processed in the fixed priority order (Full,
    /// then Snapshot). Per-file failures never abort the batch; the one
    /// fatal condition is a post-load integrity violation, returned as
    /// [`LoaderError::IntegrityViolation`].
    pub fn run(&self, package_root: &Path) -> LoaderResult<RunSummary> {
        let mut summary = RunSummary::default();

        for release_type in ReleaseType::LOAD_ORDER {
            let plan = LoadPlan::build(package_root, release_type)?;
            if plan.is_empty() {
                warn!("no matching files for release type {release_type}");
                continue;
            }

            info!("importing {} files for release type {release_type}", plan.len());
            self.apply_ddl(release_type);

            for entry in &plan {
                match self.import_entry(entry) {
                    ImportOutcome::Imported => summary.imported += 1,
                    ImportOutcome::FormatRejected { .. } => summary.rejected += 1,
                    ImportOutcome::Failed { .. } => summary.failed += 1,
                }
            }
            summary.loaded.push(release_type);

            self.validate_target_components(release_type)?;
        }

        if summary.any_imported() {
            self.start_ui();
        } else {
            info!("no release files were imported");
        }

        Ok(summary)
    }

    /// Applies the release type's schema DDL. A failure leaves the run in
    /// a degraded state but does not abort it; imports are attempted
    /// against whatever schema resulted.
    fn apply_ddl(&self, release_type: ReleaseType) {
        let script = self.config.ddl_script(release_type);
        match self.read_script(&script).and_then(|sql| self.engine.execute_ddl(&sql)) {
            Ok(()) => info!("executed SQL script '{}'", script.display()),
            Err(e) => error!("SQL execution failed: {}, {e}", script.display()),
        }
    }

    fn import_entry(&self, entry: &LoadPlanEntry) -> ImportOutcome {
        match self
            .engine
            .import_text_file(&entry.table, &entry.path(), &self.config.copy)
        {
            Ok(()) => {
                info!("imported '{}'", entry.filename);
                ImportOutcome::Imported
            }
            Err(ImportError::FormatRejected(detail)) => {
                error!("unrecognised file type '{}': {detail}", entry.filename);
                debug!("failed SQL: COPY {} FROM '{}'", entry.table, entry.path().display());
                ImportOutcome::FormatRejected {
                    filename: entry.filename.clone(),
                    detail,
                }
            }
            Err(ImportError::Other(detail)) => {
                error!("failed to import '{}': {detail}", entry.filename);
                debug!("failed SQL: COPY {} FROM '{}'", entry.table, entry.path().display());
                ImportOutcome::Failed {
                    filename: entry.filename.clone(),
                    detail,
                }
            }
        }
    }

    /// Checks that every active association refset member points at an
    /// existing concept. Violations are the one fatal condition in the
    /// pipeline; a failure to run the check itself is logged and skipped.
    fn validate_target_components(&self, release_type: ReleaseType) -> LoaderResult<()> {
        let script = self.config.validation_script(release_type);
        let violations = match self
            .read_script(&script)
            .and_then(|sql| self.engine.count_query_rows(&sql))
        {
            Ok(count) => count,
            Err(e) => {
                error!("SQL execution failed: {}, {e}", script.display());
                return Ok(());
            }
        };

        if violations > 0 {
            error!(
                "found {violations} invalid targetComponentIds in the {release_type} association refset"
            );
            return Err(LoaderError::IntegrityViolation {
                release_type,
                violations,
            });
        }

        debug!("target component validation passed for {release_type}");
        Ok(())
    }

    fn start_ui(&self) {
        match self.engine.start_ui() {
            Ok(()) => info!("UI running at http://localhost:{}", self.config.ui_port),
            Err(e) => error!("UI start failed: {e}"),
        }
    }

    fn read_script(&self, path: &Path) -> Result<String, EngineError> {
        fs::read_to_string(path).map_err(|e| EngineError::new(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    use crate::config::CopyOptions;

    /// Records engine calls and fails on demand.
    #[derive(Default)]
    struct FakeEngine {
        calls: RefCell<Vec<String>>,
        fail_ddl: bool,
        reject_tables: Vec<&'static str>,
        fail_tables: Vec<&'static str>,
        violations: usize,
    }

    impl FakeEngine {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl SqlEngine for FakeEngine {
        fn execute_ddl(&self, _sql: &str) -> Result<(), EngineError> {
            self.calls.borrow_mut().push("ddl".to_string());
            if self.fail_ddl {
                return Err(EngineError::new("ddl refused"));
            }
            Ok(())
        }

        fn count_query_rows(&self, _sql: &str) -> Result<usize, EngineError> {
            self.calls.borrow_mut().push("validate".to_string());
            Ok(self.violations)
        }

        fn import_text_file(
            &self,
            table: &str,
            _path: &Path,
            _options: &CopyOptions,
        ) -> Result<(), ImportError> {
            self.calls.borrow_mut().push(format!("import:{table}"));
            if self.reject_tables.contains(&table) {
                return Err(ImportError::FormatRejected("no such table".to_string()));
            }
            if self.fail_tables.contains(&table) {
                return Err(ImportError::Other("conversion failed".to_string()));
            }
            Ok(())
        }

        fn start_ui(&self) -> Result<(), EngineError> {
            self.calls.borrow_mut().push("ui".to_string());
            Ok(())
        }
    }

    /// A Snapshot-only package with concept, description, and two refset
    /// files.
    fn package_fixture() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let terminology = root.path().join("Snapshot/Terminology");
        let refset = root.path().join("Snapshot/Refset/Content");
        std::fs::create_dir_all(&terminology).unwrap();
        std::fs::create_dir_all(&refset).unwrap();

        for filename in [
            "sct2_Concept_Snapshot_INT_20240101.txt",
            "sct2_Description_Snapshot-en_INT_20240101.txt",
        ] {
            std::fs::write(terminology.join(filename), "id\n").unwrap();
        }
        for filename in [
            "der2_cRefset_AssociationSnapshot_INT_20240101.txt",
            "der2_Refset_SimpleSnapshot_INT_20240101.txt",
        ] {
            std::fs::write(refset.join(filename), "id\n").unwrap();
        }
        root
    }

    /// SQL resource scripts for the fake engine; contents are irrelevant.
    fn resources_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for release in ["full", "snapshot"] {
            std::fs::write(dir.path().join(format!("create_{release}_tables.sql")), "--\n")
                .unwrap();
            std::fs::write(
                dir.path().join(format!("validate_{release}_targetcomponentid.sql")),
                "--\n",
            )
            .unwrap();
        }
        dir
    }

    fn config_for(resources: &tempfile::TempDir) -> LoaderConfig {
        LoaderConfig {
            sql_resources: PathBuf::from(resources.path()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_package_skips_everything() {
        let package = tempfile::tempdir().unwrap();
        let resources = resources_fixture();
        let engine = FakeEngine::default();

        let summary = Orchestrator::new(&engine, config_for(&resources))
            .run(package.path())
            .unwrap();

        assert!(!summary.any_imported());
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_full_run_orders_steps() {
        let package = package_fixture();
        let resources = resources_fixture();
        let engine = FakeEngine::default();

        let summary = Orchestrator::new(&engine, config_for(&resources))
            .run(package.path())
            .unwrap();

        assert_eq!(summary.imported, 4);
        assert_eq!(summary.loaded, vec![ReleaseType::Snapshot]);
        assert_eq!(
            engine.calls(),
            [
                "ddl",
                "import:concept_s",
                "import:description_s",
                "import:associationrefset_s",
                "import:simple_s",
                "validate",
                "ui",
            ]
        );
    }

    #[test]
    fn test_one_failing_import_does_not_stop_the_batch() {
        let package = package_fixture();
        let resources = resources_fixture();
        let engine = FakeEngine {
            fail_tables: vec!["description_s"],
            reject_tables: vec!["simple_s"],
            ..Default::default()
        };

        let summary = Orchestrator::new(&engine, config_for(&resources))
            .run(package.path())
            .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.rejected, 1);
        assert!(engine.calls().contains(&"import:associationrefset_s".to_string()));
    }

    #[test]
    fn test_ddl_failure_degrades_but_continues() {
        let package = package_fixture();
        let resources = resources_fixture();
        let engine = FakeEngine {
            fail_ddl: true,
            ..Default::default()
        };

        let summary = Orchestrator::new(&engine, config_for(&resources))
            .run(package.path())
            .unwrap();

        assert_eq!(summary.imported, 4);
    }

    #[test]
    fn test_integrity_violation_is_fatal_before_ui_start() {
        let package = package_fixture();
        let resources = resources_fixture();
        let engine = FakeEngine {
            violations: 3,
            ..Default::default()
        };

        let result = Orchestrator::new(&engine, config_for(&resources)).run(package.path());

        match result {
            Err(LoaderError::IntegrityViolation {
                release_type,
                violations,
            }) => {
                assert_eq!(release_type, ReleaseType::Snapshot);
                assert_eq!(violations, 3);
            }
            other => panic!("expected integrity violation, got {other:?}"),
        }
        assert!(!engine.calls().contains(&"ui".to_string()));
    }

    #[test]
    fn test_missing_validation_script_is_not_fatal() {
        let package = package_fixture();
        let resources = tempfile::tempdir().unwrap();
        std::fs::write(resources.path().join("create_snapshot_tables.sql"), "--\n").unwrap();
        let engine = FakeEngine {
            violations: 3,
            ..Default::default()
        };

        // Without a validation script the check is skipped, so the
        // engine's pending violations are never seen.
        let summary = Orchestrator::new(&engine, config_for(&resources))
            .run(package.path())
            .unwrap();
        assert_eq!(summary.imported, 4);
        assert!(!engine.calls().contains(&"validate".to_string()));
    }

    /// A Snapshot package with real RF2 content, for runs against DuckDB
    /// itself. The association member's target is a parameter so tests
    /// can produce a referentially broken package.
    fn duckdb_package_fixture(target_component: &str) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let terminology = root.path().join("Snapshot/Terminology");
        let refset = root.path().join("Snapshot/Refset/Content");
        std::fs::create_dir_all(&terminology).unwrap();
        std::fs::create_dir_all(&refset).unwrap();

        std::fs::write(
            terminology.join("sct2_Concept_Snapshot_INT_20240101.txt"),
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             100005\t20240101\t1\t900000000000207008\t900000000000074008\n\
             100009\t20240101\t1\t900000000000207008\t900000000000074008\n",
        )
        .unwrap();
        std::fs::write(
            refset.join("der2_cRefset_AssociationSnapshot_INT_20240101.txt"),
            format!(
                "id\teffectiveTime\tactive\tmoduleId\trefsetId\treferencedComponentId\ttargetComponentId\n\
                 80000517-8513-4ca0-a44c-dc66f3c3a1c6\t20240101\t1\t900000000000207008\t900000000000527005\t100005\t{target_component}\n"
            ),
        )
        .unwrap();
        root
    }

    #[test]
    fn test_end_to_end_against_duckdb() {
        let package = duckdb_package_fixture("100009");
        let client = crate::db::DuckDbClient::open(None).unwrap();

        let summary = Orchestrator::new(&client, LoaderConfig::default())
            .run(package.path())
            .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.loaded, vec![ReleaseType::Snapshot]);
        assert_eq!(client.count_query_rows("SELECT * FROM concept_s").unwrap(), 2);
        assert_eq!(
            client
                .count_query_rows("SELECT * FROM associationrefset_s")
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_end_to_end_orphan_target_is_fatal() {
        let package = duckdb_package_fixture("999999999999");
        let client = crate::db::DuckDbClient::open(None).unwrap();

        let result = Orchestrator::new(&client, LoaderConfig::default()).run(package.path());

        assert!(matches!(
            result,
            Err(LoaderError::IntegrityViolation { violations: 1, .. })
        ));
    }
}
