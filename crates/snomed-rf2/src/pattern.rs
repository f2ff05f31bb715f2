//! RF2 release file naming grammar.
//!
//! Matches filenames against the RF2 release file naming convention:
//!
//! `[FileType]_[ContentType]_[ContentSubType]_[CountryNamespace]_[VersionDate].[FileExtension]`
//!
//! See <https://confluence.ihtsdotools.org/display/DOCRELFMT/3.3.2+Release+File+Naming+Convention>

use regex::Regex;

use crate::release::ReleaseType;

/// The core file kind encoded in the first filename segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `sct2` / `xsct2`: terminology data.
    Sct,
    /// `der2` / `xder2`: derivative (reference set) data.
    Der,
}

/// The parsed fields of a filename accepted by a [`NamingPattern`].
///
/// Transient: exists only to feed table name derivation for one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    /// File kind from the leading segment (`sct` or `der` core).
    pub kind: FileKind,
    /// The content type token, e.g. `Concept` or `cRefset`.
    pub content_type: String,
    /// The optional content summary token, e.g. `Language` or `OWLExpression`.
    pub summary: Option<String>,
    /// Whether the content sub type carried a numeric refset id.
    pub has_refset_id: bool,
    /// The release type the filename matched under.
    pub release_type: ReleaseType,
}

impl ContentDescriptor {
    /// Returns true if this file carries terminology data.
    ///
    /// OWL expression files use the `sct2` prefix but are reference set
    /// data, so they are excluded here.
    pub fn is_terminology(&self) -> bool {
        self.kind == FileKind::Sct && self.summary.as_deref() != Some("OWLExpression")
    }
}

/// A compiled filename matcher for one release type.
///
/// The pattern text embeds the release type's literal label, so a matcher
/// is built per release type. Stateless after construction.
#[derive(Debug)]
pub struct NamingPattern {
    release_type: ReleaseType,
    regex: Regex,
}

impl NamingPattern {
    /// Compiles the naming pattern for the given release type.
    pub fn new(release_type: ReleaseType) -> Self {
        let file_kind = r"x?(sct|der)2";
        let content_type = r"(\w+)";

        let refset_id = r"(\d{6,18})?";
        let summary = r"(\w+)?";
        let language_code = r"(?:-[a-z-]{2,8})?";
        let content_sub_type = format!(
            "{refset_id}{summary}{label}{language_code}",
            label = release_type.label()
        );

        // International releases carry the bare "INT" token; extension
        // releases use a two-letter country code plus a 7-digit namespace.
        let country_namespace = r"(?:INT|[A-Z]{2}\d{7})";
        let version_date = r"\d{8}";
        let file_ext = "txt";

        let pattern = format!(
            "^{file_kind}_{content_type}_{content_sub_type}_{country_namespace}_{version_date}\\.{file_ext}$"
        );
        let regex = Regex::new(&pattern).expect("naming pattern is a valid regex");

        Self {
            release_type,
            regex,
        }
    }

    /// Compiles the patterns for all release types.
    pub fn all() -> Vec<NamingPattern> {
        ReleaseType::ALL.iter().copied().map(Self::new).collect()
    }

    /// Returns the release type this pattern matches.
    pub fn release_type(&self) -> ReleaseType {
        self.release_type
    }

    /// Classifies a filename against the RF2 naming grammar.
    ///
    /// Returns the extracted fields on a match, or `None` for any other
    /// file. Non-matching files are expected in a release package (e.g.
    /// readme and metadata files) and are not an error.
    pub fn classify(&self, filename: &str) -> Option<ContentDescriptor> {
        let captures = self.regex.captures(filename)?;

        let kind = match captures.get(1).map(|m| m.as_str()) {
            Some("sct") => FileKind::Sct,
            Some("der") => FileKind::Der,
            _ => return None,
        };

        Some(ContentDescriptor {
            kind,
            content_type: captures[2].to_string(),
            summary: captures.get(4).map(|m| m.as_str().to_string()),
            has_refset_id: captures.get(3).is_some(),
            release_type: self.release_type,
        })
    }
}
