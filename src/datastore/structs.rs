use crate::datastore::postfilters::PostFilters;
use crate::datastore::tables::{posts, relationships, sessions, users};
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user of the website.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// argon2 PHC string. Never leaves the backend.
    pub password_hash: String,
    pub joined_at: DateTime<Utc>,
    pub is_admin: bool,
}

/// Parameters for the database statement which inserts new users.
#[derive(Insertable, Debug, Clone)]
#[table_name = "users"]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// A post from a user
#[derive(
    Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, Associations,
)]
#[belongs_to(User)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    #[allow(dead_code)]
    /// Does this post match all specified filters?
    pub fn matches(&self, filters: &PostFilters) -> bool {
        if let Some(id) = &filters.id {
            if id != &self.id {
                return false;
            }
        }
        if let Some(user_ids) = &filters.user_ids {
            if !user_ids.contains(&self.user_id) {
                return false;
            }
        }
        if let Some(substring) = &filters.text_contains {
            if !self.content.contains(substring.as_str()) {
                return false;
            }
        }
        if let Some(created_before) = filters.created_before {
            if self.created_at >= created_before {
                return false;
            }
        }
        true
    }
}

/// Parameters for the database statement which inserts new posts.
#[derive(Insertable, Debug, Clone)]
#[table_name = "posts"]
pub struct NewPost {
    pub user_id: Uuid,
    pub content: String,
}

/// A follow edge: `from_user_id` reads whatever `to_user_id` posts.
#[derive(Queryable, Insertable, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[table_name = "relationships"]
pub struct Relationship {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
}

/// A login session. Session tokens carry its ID.
#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Eq, Associations)]
#[belongs_to(User)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Can this session still authenticate requests at `now`?
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

#[derive(Insertable, Debug, Clone)]
#[table_name = "sessions"]
pub struct NewSession {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
