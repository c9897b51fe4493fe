use crate::datastore::{
    postfilters::PostFilters,
    structs::{NewPost, NewSession, NewUser, Post, Relationship, Session, User},
    GraphStore, PostStore, SessionStore, UserStore,
};
use crate::twoface::{Describe, ExternalError, Fallible};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::offset::Utc;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default, Debug)]
struct Tables {
    users: Vec<User>,
    /// In insertion order, so later entries are newer.
    posts: Vec<Post>,
    relationships: BTreeSet<(Uuid, Uuid)>,
    sessions: Vec<Session>,
}

impl Tables {
    fn user(&self, user_id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Matching posts, newest first. Posts with equal timestamps keep insertion order reversed.
    fn newest_first<'a>(&'a self, keep: impl Fn(&Post) -> bool + 'a) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().rev().filter(|p| keep(*p)).cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn users_by_name(&self, ids: impl Iterator<Item = Uuid>) -> Vec<User> {
        let mut users: Vec<User> = ids.filter_map(|id| self.user(id)).cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}

/// A mock implementation of the datastore traits. Enforces the same constraints as the Postgres
/// schema.
#[derive(Clone, Default, Debug)]
pub struct Client {
    tables: Arc<Mutex<Tables>>,
}

impl Client {
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.tables.lock().unwrap().posts = posts;
    }

    /// A user named `name` with email `<name>@example.com` and an unusable password hash.
    pub async fn seed_user(&self, name: &str) -> User {
        self.new_user(NewUser {
            username: name.to_owned(),
            email: format!("{}@example.com", name),
            password_hash: String::new(),
            is_admin: false,
        })
        .await
        .unwrap()
    }

    pub fn edge_count(&self) -> usize {
        self.tables.lock().unwrap().relationships.len()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }
}

#[async_trait]
impl UserStore for Client {
    async fn new_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut tables = self.tables.lock().unwrap();
        let taken = tables
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&new_user.username) || u.email == new_user.email);
        if taken {
            return Err(anyhow!("duplicate key value violates unique constraint")
                .describe(ExternalError::USER_EXISTS));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            joined_at: Utc::now(),
            is_admin: new_user.is_admin,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        Ok(self.tables.lock().unwrap().user(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: String) -> Fallible<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: String) -> Fallible<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username.eq_ignore_ascii_case(&username)).cloned())
    }
}

#[async_trait]
impl PostStore for Client {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        let mut tables = self.tables.lock().unwrap();
        if tables.user(new_post.user_id).is_none() {
            return Err(anyhow!("posts.user_id violates foreign key constraint").into());
        }
        let post = Post {
            id: Uuid::new_v4(),
            user_id: new_post.user_id,
            content: new_post.content,
            created_at: Utc::now(),
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let tables = self.tables.lock().unwrap();
        let mut posts = tables.newest_first(|p| p.matches(&filters));
        if let Some(limit) = filters.limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn stream(&self, user_id: Uuid, num_posts: u8) -> Fallible<Vec<Post>> {
        let tables = self.tables.lock().unwrap();
        let relationships = &tables.relationships;
        let mut posts = tables.newest_first(|p| {
            p.user_id == user_id || relationships.contains(&(user_id, p.user_id))
        });
        posts.truncate(num_posts as usize);
        Ok(posts)
    }
}

#[async_trait]
impl GraphStore for Client {
    async fn follow(&self, edge: Relationship) -> Fallible<()> {
        let mut tables = self.tables.lock().unwrap();
        if tables.user(edge.from_user_id).is_none() || tables.user(edge.to_user_id).is_none() {
            return Err(anyhow!("relationships violates foreign key constraint").into());
        }
        tables
            .relationships
            .insert((edge.from_user_id, edge.to_user_id));
        Ok(())
    }

    async fn unfollow(&self, edge: Relationship) -> Fallible<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .relationships
            .remove(&(edge.from_user_id, edge.to_user_id));
        Ok(())
    }

    async fn is_following(&self, edge: Relationship) -> Fallible<bool> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .relationships
            .contains(&(edge.from_user_id, edge.to_user_id)))
    }

    async fn following(&self, user_id: Uuid) -> Fallible<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        let ids = tables
            .relationships
            .iter()
            .filter(|(from, _)| *from == user_id)
            .map(|(_, to)| *to);
        Ok(tables.users_by_name(ids))
    }

    async fn followers(&self, user_id: Uuid) -> Fallible<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        let ids = tables
            .relationships
            .iter()
            .filter(|(_, to)| *to == user_id)
            .map(|(from, _)| *from);
        Ok(tables.users_by_name(ids))
    }
}

#[async_trait]
impl SessionStore for Client {
    async fn new_session(&self, new_session: NewSession) -> Fallible<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: new_session.user_id,
            created_at: Utc::now(),
            expires_at: new_session.expires_at,
            revoked_at: None,
        };
        self.tables.lock().unwrap().sessions.push(session.clone());
        Ok(session)
    }

    async fn get_session(&self, session_id: Uuid) -> Fallible<Option<Session>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.sessions.iter().find(|s| s.id == session_id).cloned())
    }

    async fn revoke_session(&self, session_id: Uuid) -> Fallible<Option<Session>> {
        let mut tables = self.tables.lock().unwrap();
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.revoked_at.is_none())
            .map(|s| {
                s.revoked_at = Some(Utc::now());
                s.clone()
            });
        Ok(session)
    }
}
