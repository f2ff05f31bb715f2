//! Canonical table name derivation.
//!
//! Transforms an accepted filename's content descriptor into the lowercase
//! table name the target schema uses, via an ordered chain of rewrite
//! rules. Rule order matters: the later rules pattern-match on the literal
//! text produced by the base extraction or by each other.
//!
//! Table names are aligned with the set used by the IHTSDO release
//! validation framework.

use crate::pattern::ContentDescriptor;
use crate::release::ReleaseType;

/// Literal contractions applied after the suffix rules, in order.
const REWRITES: &[(&str, &str)] = &[
    ("Simplerefset", "Simple"),
    ("AssociationReference", "Association"),
    ("Language", "Lang"),
    ("ReferenceSet", ""),
    ("RelationshipConcreteValues", "Relationship_Concrete_Values"),
    ("StatedRelationship", "Stated_Relationship"),
];

/// Derives the canonical table name for a classified release file.
///
/// # Examples
///
/// ```
/// use snomed_rf2::{table_name, NamingPattern, ReleaseType};
///
/// let pattern = NamingPattern::new(ReleaseType::Snapshot);
/// let descriptor = pattern
///     .classify("sct2_Concept_Snapshot_INT_20240101.txt")
///     .unwrap();
/// assert_eq!(table_name(&descriptor), "concept_s");
/// ```
pub fn table_name(descriptor: &ContentDescriptor) -> String {
    normalize(&base_name(descriptor), descriptor.release_type)
}

/// Base extraction: terminology files keep their content type, derivative
/// files use the summary token (or the content type when no summary was
/// captured) with a `refset` marker. Both get the release short code as a
/// suffix.
fn base_name(descriptor: &ContentDescriptor) -> String {
    let code = descriptor.release_type.short_code();
    if descriptor.is_terminology() {
        format!("{}_{}", descriptor.content_type, code)
    } else {
        let summary = descriptor
            .summary
            .as_deref()
            .unwrap_or(&descriptor.content_type);
        format!("{summary}refset_{code}")
    }
}

/// Applies the rewrite chain to a base name and lowercases the result.
///
/// Every rule runs unconditionally; a rule whose pattern is absent is a
/// no-op, which also makes the chain idempotent on its own output.
fn normalize(base: &str, release_type: ReleaseType) -> String {
    let code = release_type.short_code();

    // The refset descriptor table carries no release suffix.
    let mut name = base.replace(&format!("RefsetDescriptorrefset_{code}"), "RefsetDescriptor");
    name = name.replace(&format!("RefsetDescriptor_{code}"), "RefsetDescriptor");

    for (pattern, replacement) in REWRITES {
        name = name.replace(pattern, replacement);
    }

    name.to_lowercase()
}
