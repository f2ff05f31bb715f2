//! # snomed-rf2
//!
//! Release file resolution for SNOMED CT RF2 distribution packages.
//!
//! Given a release directory tree, this crate determines which files are
//! valid RF2 content files for a release type (Full, Snapshot or Delta),
//! derives the canonical table name each file loads into, and produces a
//! load plan ordered so that terminology and concept data precede the
//! reference sets that depend on them.
//!
//! ## Usage
//!
//! ```no_run
//! use snomed_rf2::{LoadPlan, ReleaseType};
//!
//! let plan = LoadPlan::build("path/to/release".as_ref(), ReleaseType::Snapshot)?;
//! for entry in plan.iter() {
//!     println!("{} <- {}", entry.table, entry.filename);
//! }
//! # Ok::<(), snomed_rf2::ScanError>(())
//! ```

#![warn(missing_docs)]

mod normalize;
mod pattern;
mod plan;
mod release;
mod scan;
mod types;

pub use normalize::table_name;
pub use pattern::{ContentDescriptor, FileKind, NamingPattern};
pub use plan::{order_plan, LoadPlan, LoadPlanEntry, TERMINOLOGY_DIR};
pub use release::ReleaseType;
pub use scan::scan_release;
pub use types::{ScanError, ScanResult};
