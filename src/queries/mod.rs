//! GraphQL documents, sent verbatim

pub mod alerts {
    pub const LIST: &str = include_str!("alerts/list.graphql");
    pub const GET: &str = include_str!("alerts/get.graphql");
    pub const ADD_COMMENT: &str = include_str!("alerts/add_comment.graphql");
    pub const UPDATE_STATUS: &str = include_str!("alerts/update_status.graphql");
    pub const UPDATE_ASSIGNEE_BY_ID: &str = include_str!("alerts/update_assignee_by_id.graphql");
    pub const UPDATE_ASSIGNEE_BY_EMAIL: &str =
        include_str!("alerts/update_assignee_by_email.graphql");
}

pub mod cloud_accounts {
    pub const LIST: &str = include_str!("cloud_accounts/list.graphql");
    pub const GET: &str = include_str!("cloud_accounts/get.graphql");
}

pub mod queries {
    pub const EXECUTE: &str = include_str!("queries/execute.graphql");
    pub const RESULTS: &str = include_str!("queries/results.graphql");
}

pub mod sources {
    pub const LIST: &str = include_str!("sources/list.graphql");
    pub const GET: &str = include_str!("sources/get.graphql");
    pub const DELETE: &str = include_str!("sources/delete.graphql");
}

pub mod databases {
    pub const LIST: &str = include_str!("databases/list.graphql");
    pub const GET: &str = include_str!("databases/get.graphql");
}

pub mod metrics {
    pub const ALL: &str = include_str!("metrics/all.graphql");
}

pub mod users {
    pub const LIST: &str = include_str!("users/list.graphql");
    pub const GET_BY_ID: &str = include_str!("users/get_by_id.graphql");
    pub const GET_BY_EMAIL: &str = include_str!("users/get_by_email.graphql");
    pub const UPDATE: &str = include_str!("users/update.graphql");
}

pub mod roles {
    pub const LIST: &str = include_str!("roles/list.graphql");
}

pub mod tokens {
    pub const ROTATE: &str = include_str!("tokens/rotate.graphql");
}
