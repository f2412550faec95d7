//! Cache key namespace.

use std::fmt;

use gateway_core::whitelist::normalize_group;

/// Key of a cache entry.
///
/// Whitelist group names are normalized to lowercase on construction, so
/// `"SGame"` and `"sgame"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// The aggregate server list.
    ServerList,
    /// The candidate set of login announcements.
    LoginNotice,
    /// The allow list of one API group.
    Whitelist(String),
}

impl CacheKey {
    /// Builds a whitelist key from a raw group name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_server::cache::CacheKey;
    ///
    /// let key = CacheKey::whitelist(" AdminServer ");
    /// assert_eq!(key.to_string(), "whitelist_adminserver");
    /// assert_eq!(key.group(), Some("adminserver"));
    /// ```
    pub fn whitelist(group: &str) -> Self {
        Self::Whitelist(normalize_group(group))
    }

    /// Retorna el grupo si la key es de whitelist.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Whitelist(group) => Some(group),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerList => f.write_str("serverList"),
            Self::LoginNotice => f.write_str("loginNotice"),
            Self::Whitelist(group) => write!(f, "whitelist_{group}"),
        }
    }
}
