//! Version-range reconciliation for one package's collected declarations
//!
//! Specifiers use npm semantics: a bare version such as `4.17.5` is an
//! exact pin, while `^`, `~`, comparison operators and wildcards parse
//! through the `semver` crate. A set of declarations agrees when the
//! intersection of all declared ranges is non-empty; the specifier attached
//! to the earliest-collected declaration wins. Equality of specifier text
//! is sufficient on its own, so non-semver specifiers still agree when they
//! are textually identical.

use semver::{Comparator, Version, VersionReq};

use super::ConflictingVersion;
use super::locate::Declaration;

/// Outcome of reconciling all declarations collected for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reconciled {
    /// All declared ranges overlap; the earliest-collected specifier wins.
    Agreed { version: String },
    /// At least one pair of declared ranges has an empty intersection. The
    /// evidence lists every distinct declaration site in collection order.
    Conflict { versions: Vec<ConflictingVersion> },
}

pub(crate) fn reconcile(declarations: &[Declaration]) -> Reconciled {
    // Distinct declaration sites, in collection order. Repeated references
    // from the same context resolve to the same declaration and add nothing.
    let mut sites: Vec<&Declaration> = Vec::new();
    for declaration in declarations {
        if !sites.iter().any(|d| d.context == declaration.context) {
            sites.push(declaration);
        }
    }

    let winner = match sites.first() {
        Some(first) => first.version.clone(),
        None => {
            return Reconciled::Conflict {
                versions: Vec::new(),
            };
        }
    };

    if sites.iter().all(|d| d.version == winner) {
        return Reconciled::Agreed { version: winner };
    }

    let parsed: Option<Vec<VersionReq>> = sites
        .iter()
        .map(|d| parse_specifier(&d.version).ok())
        .collect();

    // Specifiers outside the supported grammar cannot be proven to overlap,
    // so distinct texts among them are a conflict.
    let compatible = parsed.as_deref().is_some_and(ranges_overlap);
    if compatible {
        Reconciled::Agreed { version: winner }
    } else {
        Reconciled::Conflict {
            versions: sites
                .iter()
                .map(|d| ConflictingVersion {
                    version: d.version.clone(),
                    context: d.context.clone(),
                })
                .collect(),
        }
    }
}

/// Parse an npm-style version specifier.
///
/// A bare full version is an exact pin, unlike Cargo's caret default; every
/// other form is handed to the `semver` grammar unchanged.
pub(crate) fn parse_specifier(specifier: &str) -> Result<VersionReq, semver::Error> {
    let trimmed = specifier.trim();
    if trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        if let Ok(version) = Version::parse(trimmed) {
            return VersionReq::parse(&format!("={version}"));
        }
    }
    VersionReq::parse(trimmed)
}

/// Candidate-probing intersection test.
///
/// Every comparator's floor version, plus its patch successor to honour
/// exclusive lower bounds, is tested against all requirements; the ranges
/// overlap iff some candidate satisfies every requirement. The floor of the
/// tightest lower bound lies inside any non-empty intersection, so probing
/// these candidates decides the common operator combinations exactly.
pub(crate) fn ranges_overlap(requirements: &[VersionReq]) -> bool {
    let mut candidates: Vec<Version> = Vec::new();
    for requirement in requirements {
        for comparator in &requirement.comparators {
            let floor = comparator_floor(comparator);
            let mut bumped = Version::new(floor.major, floor.minor, floor.patch + 1);
            bumped.pre = semver::Prerelease::EMPTY;
            candidates.push(floor);
            candidates.push(bumped);
        }
    }
    if candidates.is_empty() {
        // Only wildcard requirements: anything satisfies them.
        return true;
    }
    candidates
        .iter()
        .any(|candidate| requirements.iter().all(|r| r.matches(candidate)))
}

fn comparator_floor(comparator: &Comparator) -> Version {
    let mut floor = Version::new(
        comparator.major,
        comparator.minor.unwrap_or(0),
        comparator.patch.unwrap_or(0),
    );
    floor.pre = comparator.pre.clone();
    floor
}
