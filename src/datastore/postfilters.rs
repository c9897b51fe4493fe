//! Ways to filter posts based on their fields. Filter semantics work just like SQL:
//! If a field is unset, its filter won't be applied.
//! If set, filter out posts that don't match the filter.
use chrono::{offset::Utc, DateTime};
use serde::Deserialize;
use uuid::Uuid;

/// How many posts one page of any stream holds.
pub const PAGE_SIZE: u8 = 100;

/// Filters that can be applied to queries on the datastore. Results are always newest-first.
#[derive(Default, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct PostFilters {
    pub id: Option<Uuid>,
    /// Only posts owned by one of these users.
    pub user_ids: Option<Vec<Uuid>>,
    pub text_contains: Option<String>,
    pub created_before: Option<DateTime<Utc>>,
    /// Maximum number of posts to let match the filter. `None` means no cap.
    #[serde(default = "default_limit")]
    pub limit: Option<u8>,
}

impl PostFilters {
    /// One page of posts owned by `user_id`.
    pub fn by_user(user_id: Uuid) -> Self {
        Self {
            user_ids: Some(vec![user_id]),
            limit: Some(PAGE_SIZE),
            ..Default::default()
        }
    }

    /// The first page of everybody's posts.
    pub fn first_page() -> Self {
        Self {
            limit: Some(PAGE_SIZE),
            ..Default::default()
        }
    }
}

fn default_limit() -> Option<u8> {
    Some(PAGE_SIZE)
}
