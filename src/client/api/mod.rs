//! Resource facades
//!
//! Each facade borrows the [`Panther`](super::Panther) client, validates its
//! arguments, and hands a descriptor plus a shape to the core. Validation
//! failures return before any request is made.

mod alerts;
mod cloud_accounts;
mod data_models;
mod databases;
mod globals;
mod metrics;
mod queries;
mod roles;
mod rules;
mod sources;
mod tokens;
mod users;

pub use alerts::{AlertStatus, AlertUpdate, Alerts, CommentFormat};
pub use cloud_accounts::CloudAccounts;
pub use data_models::{DataModelSpec, DataModels};
pub use databases::Databases;
pub use globals::{GlobalSpec, Globals};
pub use metrics::{DEFAULT_INTERVAL_MINUTES, Metrics, SeriesBreakdown, series_breakdown};
pub use queries::{Queries, QueryResults, QueryStatus};
pub use roles::Roles;
pub use rules::{
    InlineFilters, RuleMock, RuleSpec, Rules, Severity, TestError, TestFunctionOutput, TestFunctions,
    TestResult, TestRun, UnitTest, unpack_test_result,
};
pub use sources::Sources;
pub use tokens::Tokens;
pub use users::{UserUpdate, Users};
