use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const AUTHORITY_SEPARATOR: char = ',';

/// Stable identifier of an authenticated identity (the member email).
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalKey(pub String);

impl PrincipalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PrincipalKey {
    fn from(value: &str) -> Self {
        PrincipalKey(value.to_string())
    }
}

/// Set of authority strings (roles or permissions) granted to a principal.
///
/// On the wire this travels as a single comma-joined claim; inside the crate
/// it is always a set, so ordering and duplicates never matter.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Authorities(BTreeSet<String>);

impl Authorities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, authority: impl Into<String>) -> bool {
        self.0.insert(authority.into())
    }

    pub fn contains(&self, authority: &str) -> bool {
        self.0.contains(authority)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first authority that cannot be carried by the joined claim.
    /// Segments are trimmed on the way back in, so edge whitespace is refused.
    pub fn find_unencodable(&self) -> Option<&str> {
        self.iter().find(|a| {
            a.is_empty() || a.contains(AUTHORITY_SEPARATOR) || a.trim() != *a
        })
    }

    pub fn to_claim(&self) -> String {
        self.iter()
            .collect::<Vec<_>>()
            .join(&AUTHORITY_SEPARATOR.to_string())
    }

    pub fn from_claim(claim: &str) -> Self {
        claim
            .split(AUTHORITY_SEPARATOR)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Authorities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Authorities(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub key: PrincipalKey,
    pub authorities: Authorities,
}

impl Principal {
    pub fn new(key: impl Into<String>, authorities: Authorities) -> Self {
        Principal {
            key: PrincipalKey(key.into()),
            authorities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_sorted_and_deduplicated() {
        let authorities: Authorities = ["ROLE_USER", "ROLE_ADMIN", "ROLE_USER"].into_iter().collect();
        assert_eq!(authorities.len(), 2);
        assert_eq!(authorities.to_claim(), "ROLE_ADMIN,ROLE_USER");
    }

    #[test]
    fn from_claim_skips_blank_segments() {
        let authorities = Authorities::from_claim("ROLE_USER,, ROLE_ADMIN ,");
        assert!(authorities.contains("ROLE_USER"));
        assert!(authorities.contains("ROLE_ADMIN"));
        assert_eq!(authorities.len(), 2);

        assert!(Authorities::from_claim("").is_empty());
    }

    #[test]
    fn separator_inside_authority_is_unencodable() {
        let authorities: Authorities = ["ROLE_USER", "read,write"].into_iter().collect();
        assert_eq!(authorities.find_unencodable(), Some("read,write"));

        let fine: Authorities = ["ROLE_USER"].into_iter().collect();
        assert_eq!(fine.find_unencodable(), None);
    }

    #[test]
    fn edge_whitespace_is_unencodable() {
        let leading: Authorities = [" ROLE_USER"].into_iter().collect();
        assert_eq!(leading.find_unencodable(), Some(" ROLE_USER"));

        let trailing: Authorities = ["ROLE_USER\t"].into_iter().collect();
        assert_eq!(trailing.find_unencodable(), Some("ROLE_USER\t"));

        let inner: Authorities = ["ROLE_SUPER USER"].into_iter().collect();
        assert_eq!(inner.find_unencodable(), None);
    }
}
