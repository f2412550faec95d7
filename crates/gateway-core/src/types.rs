//! Domain records shared by the store, the cache layer and the HTTP surface.
//!
//! Optional fields use `Option<T>` with a load-bearing meaning: `None` is
//! "not reported", never "reset to the default". Both a missing JSON field and
//! an explicit `null` deserialize to `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server states reported by game servers.
pub mod server_state {
    /// Under maintenance.
    pub const MAINTENANCE: i32 = 1;
    /// Running normally.
    pub const SMOOTH: i32 = 2;
    /// Running at capacity.
    pub const FULL: i32 = 3;
}

/// Composite identity of a game server: `(cluster_id, game_id)`.
///
/// # Example
///
/// ```
/// use gateway_core::ServerKey;
///
/// let key = ServerKey::new(3, 1001);
/// assert_eq!(key.to_string(), "server_3_1001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerKey {
    pub cluster_id: i64,
    pub game_id: i64,
}

impl ServerKey {
    pub fn new(cluster_id: i64, game_id: i64) -> Self {
        Self {
            cluster_id,
            game_id,
        }
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server_{}_{}", self.cluster_id, self.game_id)
    }
}

/// A game server entry in the server list.
///
/// Every field except the composite key is optional. A record received from a
/// game server is a sparse update; a record held by the cache is the merged
/// result of every update seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub cluster_id: i64,
    pub game_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub port: Option<i32>,
    /// See [`server_state`].
    #[serde(default)]
    pub state: Option<i32>,
    #[serde(default)]
    pub is_show: Option<i32>,
    #[serde(default)]
    pub is_new: Option<i32>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
}

impl ServerRecord {
    /// Creates a record carrying only its key; every other field is absent.
    pub fn new(cluster_id: i64, game_id: i64) -> Self {
        Self {
            cluster_id,
            game_id,
            ..Default::default()
        }
    }

    /// Returns the composite key.
    pub fn key(&self) -> ServerKey {
        ServerKey::new(self.cluster_id, self.game_id)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn with_port(mut self, port: i32) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_state(mut self, state: i32) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_is_show(mut self, is_show: i32) -> Self {
        self.is_show = Some(is_show);
        self
    }
}

/// A login announcement ("notice") shown to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub notice_type: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub priority: i32,
    /// 1 = enabled.
    #[serde(default)]
    pub is_enable: i32,
    /// Unix seconds, inclusive.
    #[serde(default)]
    pub start_time: i64,
    /// Unix seconds, exclusive.
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub info: String,
}

impl Announcement {
    /// Returns true when the announcement is enabled and not yet ended at `now`.
    pub fn is_pending_or_active(&self, now: i64) -> bool {
        self.is_enable == 1 && self.end_time > now
    }

    /// Returns true when the announcement is enabled and `now` lies in
    /// `[start_time, end_time)`.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.is_enable == 1 && self.start_time <= now && now < self.end_time
    }

    /// Returns true if `self` beats `other` for the same notice type:
    /// higher priority first, then higher id.
    pub fn outranks(&self, other: &Announcement) -> bool {
        (self.priority, self.id) > (other.priority, other.id)
    }
}

/// One server a player has logged into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHistoryEntry {
    pub cluster_id: i64,
    pub game_id: i64,
    pub player_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_time: Option<i64>,
}

impl PlayerHistoryEntry {
    pub fn new(cluster_id: i64, game_id: i64, player_id: i64) -> Self {
        Self {
            cluster_id,
            game_id,
            player_id,
            ..Default::default()
        }
    }

    pub fn key(&self) -> ServerKey {
        ServerKey::new(self.cluster_id, self.game_id)
    }
}

/// Account states.
pub mod account_state {
    pub const NORMAL: i32 = 0;
    pub const WHITELISTED: i32 = 1;
}

/// Login history of one account, most recently used server first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    pub account_id: String,
    /// See [`account_state`].
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub player_list: Vec<PlayerHistoryEntry>,
    #[serde(default)]
    pub info: Option<String>,
}

impl UserHistory {
    /// History returned for accounts that never logged in.
    pub fn empty(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Default::default()
        }
    }
}

/// Filters for the paged announcement listing used by the admin panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default, rename = "pageSize")]
    pub page_size: i64,
    #[serde(default)]
    pub title: String,
    /// 0 means any type.
    #[serde(default)]
    pub notice_type: i32,
    #[serde(default)]
    pub is_enable: Option<i32>,
}

impl AnnouncementQuery {
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    /// Larger requests are served this many rows.
    pub const MAX_PAGE_SIZE: i64 = 100;

    /// Returns a copy with non-positive paging values replaced by defaults.
    pub fn normalized(&self) -> Self {
        Self {
            page: if self.page <= 0 { 1 } else { self.page },
            page_size: if self.page_size <= 0 {
                Self::DEFAULT_PAGE_SIZE
            } else {
                self.page_size.min(Self::MAX_PAGE_SIZE)
            },
            ..self.clone()
        }
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> usize {
        let q = self.normalized();
        usize::try_from((q.page - 1).saturating_mul(q.page_size)).unwrap_or(usize::MAX)
    }

    /// Returns true if `notice` passes the filters.
    pub fn matches(&self, notice: &Announcement) -> bool {
        (self.title.is_empty() || notice.title.contains(&self.title))
            && (self.notice_type == 0 || notice.notice_type == self.notice_type)
            && self.is_enable.is_none_or(|flag| notice.is_enable == flag)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: u64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}
