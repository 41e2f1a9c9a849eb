use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{ProxyError, Result};
use crate::schema::proxy;

/// Fishing-mortality proxy kinds; ordered as they build on one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProxyKind {
    Feff,
    Fgear,
    Fdist,
    Frealised,
}

impl ProxyKind {
    pub const ALL: [ProxyKind; 4] = [
        ProxyKind::Feff,
        ProxyKind::Fgear,
        ProxyKind::Fdist,
        ProxyKind::Frealised,
    ];

    /// Output column carrying this proxy.
    pub fn column(self) -> &'static str {
        match self {
            ProxyKind::Feff => proxy::FEFF,
            ProxyKind::Fgear => proxy::FGEAR,
            ProxyKind::Fdist => proxy::FDIST,
            ProxyKind::Frealised => proxy::FREALISED,
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for ProxyKind {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        ProxyKind::ALL
            .into_iter()
            .find(|kind| kind.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProxyError::UnknownProxy(s.to_string()))
    }
}

/// Proxy kinds computable from the optional inputs that are present.
///
/// Fgear is only offered without species data: once a distribution exists the
/// Fdist/Frealised path supersedes it.
pub fn computable(has_species: bool, has_gear_efficiency: bool) -> BTreeSet<ProxyKind> {
    let mut kinds = BTreeSet::from([ProxyKind::Feff]);
    if has_gear_efficiency && !has_species {
        kinds.insert(ProxyKind::Fgear);
    }
    if has_species {
        kinds.insert(ProxyKind::Fdist);
        if has_gear_efficiency {
            kinds.insert(ProxyKind::Frealised);
        }
    }
    kinds
}

/// Intersect the request with what the dataset supports.
pub fn resolve(
    requested: &BTreeSet<ProxyKind>,
    has_species: bool,
    has_gear_efficiency: bool,
) -> Result<BTreeSet<ProxyKind>> {
    let available = computable(has_species, has_gear_efficiency);
    let resolved: BTreeSet<ProxyKind> = requested.intersection(&available).copied().collect();
    if resolved.is_empty() {
        return Err(ProxyError::NoComputableProxy {
            requested: display_set(requested),
            available: display_set(&available),
        });
    }
    Ok(resolved)
}

pub(crate) fn display_set(kinds: &BTreeSet<ProxyKind>) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
