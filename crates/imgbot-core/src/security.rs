use std::collections::HashSet;

// ============== Authorization ==============

/// Allow-list of requester identities.
///
/// An empty list means open access: everyone is allowed. A non-empty list is an
/// exact-match allow-list over the identity's string form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: identities
                .into_iter()
                .map(|s| {
                    let s: String = s.into();
                    s.trim().to_string()
                })
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list (`"42, 99"`). Blank entries are dropped.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// `None` is a requester with no identity (e.g. anonymous channel posts):
    /// only admitted when access is open.
    pub fn is_allowed(&self, identity: Option<&str>) -> bool {
        if self.is_open() {
            return true;
        }
        identity.is_some_and(|id| self.allowed.contains(id))
    }
}
