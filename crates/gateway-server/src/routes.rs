//! Route table: paths and the API group each one belongs to.
//!
//! The access-control middleware looks a request path up here; paths outside
//! the table (health, metrics) are not restricted.

/// API groups. Their lowercase forms are the whitelist group names.
pub mod group {
    /// Client-facing endpoints.
    pub const OUT: &str = "out";
    /// Endpoints called by game servers.
    pub const SGAME: &str = "sgame";
    /// Admin panel endpoints.
    pub const ADMIN_SERVER: &str = "adminServer";
}

// out
pub const GET_SERVER_LIST: &str = "/loginServer/getServerList";
pub const GET_PLAYER_SERVER_LIST: &str = "/loginServer/getPlayerServerList";
pub const GET_LOGIN_NOTICE: &str = "/loginServer/getLoginNotice";

// sgame
pub const REPORT_SERVER_LIST: &str = "/loginServer/reportServerList";
pub const CHANGE_SERVER_STATE: &str = "/loginServer/changeServerState";
pub const SET_USER_HISTORY: &str = "/loginServer/setUserHistory";
pub const SET_USER_STATE: &str = "/loginServer/setUserState";

// adminServer
pub const CREATE_LOGIN_NOTICE: &str = "/loginServer/loginNotice/create";
pub const UPDATE_LOGIN_NOTICE: &str = "/loginServer/loginNotice/update";
pub const DELETE_LOGIN_NOTICE: &str = "/loginServer/loginNotice/delete";
pub const BATCH_DELETE_LOGIN_NOTICE: &str = "/loginServer/loginNotice/batchDelete";
pub const FIND_LOGIN_NOTICE: &str = "/loginServer/loginNotice/find";
pub const LIST_LOGIN_NOTICE: &str = "/loginServer/loginNotice/list";
pub const GET_WHITELIST: &str = "/loginServer/whitelist/get";
pub const GET_ALL_WHITELISTS: &str = "/loginServer/whitelist/getAll";
pub const SET_WHITELIST: &str = "/loginServer/whitelist/set";
pub const ADD_WHITELIST_IP: &str = "/loginServer/whitelist/add";
pub const REMOVE_WHITELIST_IP: &str = "/loginServer/whitelist/remove";

pub const HEALTH: &str = "/health";
pub const METRICS: &str = "/metrics";

const ROUTE_GROUPS: &[(&str, &str)] = &[
    (GET_SERVER_LIST, group::OUT),
    (GET_PLAYER_SERVER_LIST, group::OUT),
    (GET_LOGIN_NOTICE, group::OUT),
    (REPORT_SERVER_LIST, group::SGAME),
    (CHANGE_SERVER_STATE, group::SGAME),
    (SET_USER_HISTORY, group::SGAME),
    (SET_USER_STATE, group::SGAME),
    (CREATE_LOGIN_NOTICE, group::ADMIN_SERVER),
    (UPDATE_LOGIN_NOTICE, group::ADMIN_SERVER),
    (DELETE_LOGIN_NOTICE, group::ADMIN_SERVER),
    (BATCH_DELETE_LOGIN_NOTICE, group::ADMIN_SERVER),
    (FIND_LOGIN_NOTICE, group::ADMIN_SERVER),
    (LIST_LOGIN_NOTICE, group::ADMIN_SERVER),
    (GET_WHITELIST, group::ADMIN_SERVER),
    (GET_ALL_WHITELISTS, group::ADMIN_SERVER),
    (SET_WHITELIST, group::ADMIN_SERVER),
    (ADD_WHITELIST_IP, group::ADMIN_SERVER),
    (REMOVE_WHITELIST_IP, group::ADMIN_SERVER),
];

/// Returns the API group of `path`, if it is a grouped route.
pub fn group_for(path: &str) -> Option<&'static str> {
    ROUTE_GROUPS
        .iter()
        .find(|(route, _)| *route == path)
        .map(|(_, group)| *group)
}
