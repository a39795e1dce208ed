//! Pagination argument types for CLI commands

use clap::Args;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use panther_seim::Result;

/// Shared pagination arguments for list commands.
///
/// Flatten this into any command that lists a paginated resource:
/// ```ignore
/// List {
///     #[command(flatten)]
///     pagination: PaginationArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct PaginationArgs {
    /// Maximum results to return
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl PaginationArgs {
    /// Drain `stream`, stopping once `limit` items are in hand.
    ///
    /// Pages past the limit are never requested.
    pub async fn collect<T>(&self, stream: BoxStream<'static, Result<T>>) -> Result<Vec<T>> {
        match self.limit {
            Some(limit) => stream.take(limit).try_collect().await,
            None => stream.try_collect().await,
        }
    }

    /// Truncate an already-collected list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        match self.limit {
            Some(limit) => items.into_iter().take(limit).collect(),
            None => items,
        }
    }
}
