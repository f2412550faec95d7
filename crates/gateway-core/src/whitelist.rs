//! IP whitelist entries and the access-check rule.
//!
//! A group's allow list has three meaningful states:
//! - `None`: the group is not configured, every address is allowed.
//! - `Some([])`: the group is configured empty, every address is denied.
//! - `Some([..])`: only listed addresses (literal IPs or CIDR blocks) are allowed.

use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{GatewayError, Result};

/// A single whitelist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistEntry {
    Ip(IpAddr),
    Cidr(IpNetwork),
}

impl WhitelistEntry {
    /// Returns true if `addr` is this IP or falls inside this block.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match self {
            Self::Ip(ip) => *ip == addr,
            Self::Cidr(network) => network.contains(addr),
        }
    }
}

impl FromStr for WhitelistEntry {
    type Err = GatewayError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GatewayError::validation("ip", "IP address cannot be empty"));
        }

        if raw.contains('/') {
            raw.parse::<IpNetwork>()
                .map(Self::Cidr)
                .map_err(|e| GatewayError::validation("ip", format!("invalid CIDR '{raw}': {e}")))
        } else {
            raw.parse::<IpAddr>()
                .map(Self::Ip)
                .map_err(|_| GatewayError::validation("ip", format!("invalid IP address: {raw}")))
        }
    }
}

impl fmt::Display for WhitelistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::Cidr(network) => write!(f, "{network}"),
        }
    }
}

/// Normalizes an API group name for use as a key.
pub fn normalize_group(group: &str) -> String {
    group.trim().to_lowercase()
}

/// Validates a single entry and returns it trimmed.
pub fn validate_entry(raw: &str) -> Result<String> {
    raw.parse::<WhitelistEntry>()?;
    Ok(raw.trim().to_string())
}

/// Validates a full replacement list.
///
/// Blank entries are dropped and duplicates collapse onto their first
/// occurrence. The first invalid entry rejects the whole list.
pub fn validate_entries<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut valid: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let entry = entry.as_ref();
        if entry.trim().is_empty() {
            continue;
        }
        let entry = validate_entry(entry)?;
        if !valid.contains(&entry) {
            valid.push(entry);
        }
    }
    Ok(valid)
}

/// Checks `client_ip` against a group's allow list.
///
/// Exact string match is tried first, then containment in any CIDR entry.
/// Unparseable list entries are skipped; an unparseable client address is
/// denied whenever a list is configured.
///
/// # Example
///
/// ```
/// use gateway_core::whitelist::is_allowed;
///
/// let list = vec!["10.0.0.0/24".to_string()];
/// assert!(is_allowed("10.0.0.5", Some(&list)));
/// assert!(!is_allowed("10.0.1.5", Some(&list)));
/// assert!(is_allowed("10.0.1.5", None));
/// assert!(!is_allowed("10.0.1.5", Some(&[])));
/// ```
pub fn is_allowed(client_ip: &str, allowed: Option<&[String]>) -> bool {
    let Some(allowed) = allowed else {
        return true;
    };
    if allowed.is_empty() {
        return false;
    }

    let client_ip = client_ip.trim();
    let Ok(addr) = client_ip.parse::<IpAddr>() else {
        return false;
    };

    allowed.iter().any(|entry| {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }
        if entry == client_ip {
            return true;
        }
        entry.contains('/')
            && entry
                .parse::<IpNetwork>()
                .is_ok_and(|network| network.contains(addr))
    })
}
