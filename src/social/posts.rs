use crate::datastore::{
    postfilters::PostFilters,
    structs::{NewPost, Post, User},
    PostStore,
};
use crate::twoface::{Fallible, FoundOr};
use uuid::Uuid;

/// Store `content` as a new post by `user`. Surrounding whitespace is trimmed, nothing else is
/// checked here, so an empty post is storable.
pub async fn create_post<DS: PostStore>(ds: &DS, user: &User, content: &str) -> Fallible<Post> {
    let new_post = NewPost {
        user_id: user.id,
        content: content.trim().to_owned(),
    };
    ds.new_post(new_post).await
}

/// Every post `user` wrote, newest first.
pub async fn posts_by_user<DS: PostStore>(ds: &DS, user: &User) -> Fallible<Vec<Post>> {
    let filters = PostFilters {
        user_ids: Some(vec![user.id]),
        ..Default::default()
    };
    ds.list_posts(filters).await
}

/// Fails with NotFound if there's no such post.
pub async fn get_post<DS: PostStore>(ds: &DS, post_id: Uuid) -> Fallible<Post> {
    ds.find_post(post_id).await?.found_or("post")
}

/// The first page of everybody's posts, newest first.
pub async fn global_stream<DS: PostStore>(ds: &DS) -> Fallible<Vec<Post>> {
    ds.list_posts(PostFilters::first_page()).await
}
