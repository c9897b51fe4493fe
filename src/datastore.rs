#[cfg(test)]
pub mod mock;
pub mod postfilters;
pub mod postgres;
pub mod structs;
pub mod tables;

use crate::datastore::structs::{NewPost, NewSession, NewUser, Post, Session, User};
use crate::twoface::Fallible;
use async_trait::async_trait;
use postfilters::PostFilters;
use uuid::Uuid;

#[async_trait]
/// The interface for storing user accounts.
pub trait UserStore {
    /// Fails with `ExternalError::USER_EXISTS` if the username (ignoring case) or email is taken.
    /// Nothing is written in that case.
    async fn new_user(&self, new_user: NewUser) -> Fallible<User>;
    async fn get_user(&self, user_id: Uuid) -> Fallible<Option<User>>;
    async fn find_user_by_email(&self, email: String) -> Fallible<Option<User>>;
    /// Case-insensitive.
    async fn find_user_by_username(&self, username: String) -> Fallible<Option<User>>;
}

#[async_trait]
/// The interface for storing post data.
pub trait PostStore {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post>;
    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>>;
    /// Newest first.
    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>>;
    /// Posts by `user_id` or anyone they follow, newest first.
    async fn stream(&self, user_id: Uuid, num_posts: u8) -> Fallible<Vec<Post>>;
}

#[async_trait]
/// The interface for storing follow edges.
pub trait GraphStore {
    /// Following someone twice is not an error, the edge just stays.
    async fn follow(&self, edge: Relationship) -> Fallible<()>;
    /// Unfollowing someone you don't follow is not an error.
    async fn unfollow(&self, edge: Relationship) -> Fallible<()>;
    async fn is_following(&self, edge: Relationship) -> Fallible<bool>;
    /// Users that `user_id` follows, ordered by username.
    async fn following(&self, user_id: Uuid) -> Fallible<Vec<User>>;
    /// Users following `user_id`, ordered by username.
    async fn followers(&self, user_id: Uuid) -> Fallible<Vec<User>>;
}

#[async_trait]
/// The interface for storing login sessions.
pub trait SessionStore {
    async fn new_session(&self, new_session: NewSession) -> Fallible<Session>;
    async fn get_session(&self, session_id: Uuid) -> Fallible<Option<Session>>;
    /// Returns the revoked session, or None if there was no such live session.
    async fn revoke_session(&self, session_id: Uuid) -> Fallible<Option<Session>>;
}

pub use structs::Relationship;

/// Everything the API needs from a datastore.
pub trait Client:
    UserStore + PostStore + GraphStore + SessionStore + Clone + Send + Sync + 'static
{
}

impl<T> Client for T where
    T: UserStore + PostStore + GraphStore + SessionStore + Clone + Send + Sync + 'static
{
}
