//! The follow graph: directed edges from a reader to the users whose posts they read.
use crate::datastore::{structs::User, GraphStore, Relationship};
use crate::twoface::Fallible;
use tracing::info;

fn edge(from: &User, to: &User) -> Relationship {
    Relationship {
        from_user_id: from.id,
        to_user_id: to.id,
    }
}

/// Idempotent: following someone you already follow changes nothing.
pub async fn follow<DS: GraphStore>(ds: &DS, from: &User, to: &User) -> Fallible<()> {
    ds.follow(edge(from, to)).await?;
    info!(from = %from.username, to = %to.username, "followed");
    Ok(())
}

/// Idempotent: unfollowing someone you don't follow changes nothing.
pub async fn unfollow<DS: GraphStore>(ds: &DS, from: &User, to: &User) -> Fallible<()> {
    ds.unfollow(edge(from, to)).await?;
    info!(from = %from.username, to = %to.username, "unfollowed");
    Ok(())
}

pub async fn is_following<DS: GraphStore>(ds: &DS, from: &User, to: &User) -> Fallible<bool> {
    ds.is_following(edge(from, to)).await
}

/// Everyone `user` follows.
pub async fn following<DS: GraphStore>(ds: &DS, user: &User) -> Fallible<Vec<User>> {
    ds.following(user.id).await
}

/// Everyone who follows `user`.
pub async fn followers<DS: GraphStore>(ds: &DS, user: &User) -> Fallible<Vec<User>> {
    ds.followers(user.id).await
}
