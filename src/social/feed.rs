//! Composing the streams of posts users read.
use crate::datastore::{
    postfilters::{PostFilters, PAGE_SIZE},
    structs::{Post, User},
    GraphStore, PostStore, UserStore,
};
use crate::social::graph;
use crate::twoface::{Fallible, FoundOr};

/// One user's own posts, as seen by somebody.
#[derive(Debug)]
pub struct UserStream {
    pub user: User,
    pub posts: Vec<Post>,
    /// Whether the viewer follows `user`. None if nobody is logged in.
    pub viewer_follows: Option<bool>,
}

/// Posts by `user` and by everyone they follow, newest first. One page at most.
pub async fn stream_for<DS: PostStore>(ds: &DS, user: &User) -> Fallible<Vec<Post>> {
    ds.stream(user.id, PAGE_SIZE).await
}

/// The posts written by `target_username` (ignoring case), newest first. Who they follow doesn't
/// matter here. Fails with NotFound if there's no such user.
pub async fn stream_for_username<DS>(
    ds: &DS,
    viewer: Option<&User>,
    target_username: &str,
) -> Fallible<UserStream>
where
    DS: UserStore + PostStore + GraphStore,
{
    let user = ds
        .find_user_by_username(target_username.to_owned())
        .await?
        .found_or("user")?;
    let posts = ds.list_posts(PostFilters::by_user(user.id)).await?;
    let viewer_follows = match viewer {
        Some(viewer) => Some(graph::is_following(ds, viewer, &user).await?),
        None => None,
    };
    Ok(UserStream {
        user,
        posts,
        viewer_follows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;
    use crate::social::posts::create_post;
    use crate::twoface::Cause;

    fn contents(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.content.as_str()).collect()
    }

    #[actix_rt::test]
    async fn test_follow_then_unfollow_scenario() {
        let ds = mock::Client::default();
        let alice = ds.seed_user("alice").await;
        let bob = ds.seed_user("bob").await;

        graph::follow(&ds, &alice, &bob).await.unwrap();
        create_post(&ds, &bob, "hello").await.unwrap();

        assert_eq!(contents(&stream_for(&ds, &alice).await.unwrap()), vec!["hello"]);
        let bobs = stream_for_username(&ds, Some(&alice), "bob").await.unwrap();
        assert_eq!(contents(&bobs.posts), vec!["hello"]);
        assert_eq!(bobs.viewer_follows, Some(true));

        graph::unfollow(&ds, &alice, &bob).await.unwrap();

        assert!(stream_for(&ds, &alice).await.unwrap().is_empty());
        let bobs = stream_for_username(&ds, Some(&alice), "bob").await.unwrap();
        assert_eq!(contents(&bobs.posts), vec!["hello"]);
        assert_eq!(bobs.viewer_follows, Some(false));
    }

    #[actix_rt::test]
    async fn test_own_posts_are_always_in_stream() {
        let ds = mock::Client::default();
        let alice = ds.seed_user("alice").await;
        let bob = ds.seed_user("bob").await;
        let carol = ds.seed_user("carol").await;

        create_post(&ds, &alice, "mine").await.unwrap();
        create_post(&ds, &carol, "carol's").await.unwrap();
        assert_eq!(contents(&stream_for(&ds, &alice).await.unwrap()), vec!["mine"]);

        graph::follow(&ds, &alice, &bob).await.unwrap();
        create_post(&ds, &bob, "bob's").await.unwrap();
        let stream = stream_for(&ds, &alice).await.unwrap();
        assert_eq!(contents(&stream), vec!["bob's", "mine"]);

        // Carol isn't followed, so her post never shows up
        assert!(stream.iter().all(|p| p.user_id != carol.id));
    }

    #[actix_rt::test]
    async fn test_stream_is_one_page() {
        let ds = mock::Client::default();
        let alice = ds.seed_user("alice").await;
        for i in 0..(PAGE_SIZE as usize + 5) {
            create_post(&ds, &alice, &format!("post {}", i)).await.unwrap();
        }
        let stream = stream_for(&ds, &alice).await.unwrap();
        assert_eq!(stream.len(), PAGE_SIZE as usize);
        assert_eq!(stream[0].content, format!("post {}", PAGE_SIZE as usize + 4));
    }

    #[actix_rt::test]
    async fn test_username_lookup_ignores_case() {
        let ds = mock::Client::default();
        let bob = ds.seed_user("Bob").await;
        create_post(&ds, &bob, "hi").await.unwrap();

        let stream = stream_for_username(&ds, None, "bOB").await.unwrap();
        assert_eq!(stream.user.id, bob.id);
        assert_eq!(stream.viewer_follows, None);
        assert_eq!(contents(&stream.posts), vec!["hi"]);
    }

    #[actix_rt::test]
    async fn test_unknown_username_is_not_found() {
        let ds = mock::Client::default();
        let alice = ds.seed_user("alice").await;
        let err = stream_for_username(&ds, Some(&alice), "nosuchuser")
            .await
            .unwrap_err();
        assert_eq!(err.cause(), Cause::NotFound);
    }
}
