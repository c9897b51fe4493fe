//! For every business-logic struct in `datastore`, this module will have a matching struct
//! which redacts some business-sensitive fields.
use crate::api::{
    forms::{LoginForm, PostForm, RegisterForm},
    observe, CoerceColl, State,
};
use crate::datastore::{
    structs::{Post, User},
    Client, UserStore,
};
use crate::metrics;
use crate::social::{credentials, feed, graph, posts};
use crate::twoface::{Describe, ExternalError, Fallible, FoundOr};
use actix_web::{http::header, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use anyhow::anyhow;
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn configure<DS: Client>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::<DS>))
        .route("/register", web::post().to(register::<DS>))
        .route("/login", web::post().to(login::<DS>))
        .route("/logout", web::get().to(logout::<DS>))
        .route("/stream", web::get().to(stream::<DS>))
        .route("/stream/{username}", web::get().to(user_stream::<DS>))
        .route("/post/{post_id}", web::get().to(get_post::<DS>))
        .route("/new_post", web::post().to(new_post::<DS>))
        .route("/follow/{username}", web::get().to(follow::<DS>))
        .route("/unfollow/{username}", web::get().to(unfollow::<DS>))
        .route("/users/{username}/following", web::get().to(following::<DS>))
        .route("/users/{username}/followers", web::get().to(followers::<DS>));
}

/// A subset of User without the email or password hash
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct UserFacingUser {
    pub id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub is_admin: bool,
}

impl From<User> for UserFacingUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            joined_at: u.joined_at,
            is_admin: u.is_admin,
        }
    }
}

#[derive(Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct UserFacingPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for UserFacingPost {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            content: p.content,
            created_at: p.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserFacingUser,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserStreamResponse {
    pub user: UserFacingUser,
    pub posts: Vec<UserFacingPost>,
    /// Only present when the request was authenticated.
    pub viewer_follows: Option<bool>,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .header(header::LOCATION, location)
        .finish()
}

async fn user_named<DS: Client>(ds: &DS, username: String) -> Fallible<User> {
    ds.find_user_by_username(username).await?.found_or("user")
}

// The first page of everyone's posts
async fn index<DS: Client>(state: web::Data<State<DS>>) -> Fallible<web::Json<Vec<UserFacingPost>>> {
    observe("index", || async {
        let posts = posts::global_stream(&*state.ds).await?.coerce_into();
        Ok(web::Json(posts))
    })
    .await
}

async fn register<DS: Client>(
    state: web::Data<State<DS>>,
    body: web::Json<RegisterForm>,
) -> Fallible<HttpResponse> {
    observe("register", || async {
        body.validate()?;
        let user = credentials::create_user(
            &*state.ds,
            &body.username,
            &body.email,
            &body.password,
            false,
        )
        .await?;
        metrics::USERS_REGISTERED.inc();
        Ok(HttpResponse::Created().json(UserFacingUser::from(user)))
    })
    .await
}

async fn login<DS: Client>(
    state: web::Data<State<DS>>,
    body: web::Json<LoginForm>,
) -> Fallible<web::Json<LoginResponse>> {
    observe("login", || async {
        body.validate()?;
        let user = credentials::verify_credentials(&*state.ds, &body.email, &body.password).await?;
        guard!(let Some(user) = user else {
            return Err(anyhow!("login failed").describe(ExternalError::BAD_CREDENTIALS))
        });
        let token = state.sessions.login(&*state.ds, &user).await?;
        Ok(web::Json(LoginResponse {
            token,
            user: user.into(),
        }))
    })
    .await
}

async fn logout<DS: Client>(
    state: web::Data<State<DS>>,
    bearer: Option<BearerAuth>,
) -> Fallible<HttpResponse> {
    observe("logout", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        state.sessions.logout(&*state.ds, &auth).await?;
        Ok(see_other("/"))
    })
    .await
}

// The logged-in user's feed
async fn stream<DS: Client>(
    state: web::Data<State<DS>>,
    bearer: Option<BearerAuth>,
) -> Fallible<web::Json<Vec<UserFacingPost>>> {
    observe("stream", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        let posts = feed::stream_for(&*state.ds, &auth.user).await?.coerce_into();
        Ok(web::Json(posts))
    })
    .await
}

// Somebody's own posts. Logging in is optional.
async fn user_stream<DS: Client>(
    state: web::Data<State<DS>>,
    username: web::Path<String>,
    bearer: Option<BearerAuth>,
) -> Fallible<web::Json<UserStreamResponse>> {
    observe("user_stream", || async {
        let viewer = state.sessions.viewer(&*state.ds, bearer).await?;
        let stream = feed::stream_for_username(&*state.ds, viewer.as_ref(), &username).await?;
        Ok(web::Json(UserStreamResponse {
            user: stream.user.into(),
            posts: stream.posts.coerce_into(),
            viewer_follows: stream.viewer_follows,
        }))
    })
    .await
}

async fn get_post<DS: Client>(
    state: web::Data<State<DS>>,
    post_id: web::Path<Uuid>,
) -> Fallible<web::Json<UserFacingPost>> {
    observe("get_post", || async {
        let post = posts::get_post(&*state.ds, *post_id).await?;
        Ok(web::Json(post.into()))
    })
    .await
}

async fn new_post<DS: Client>(
    state: web::Data<State<DS>>,
    bearer: Option<BearerAuth>,
    body: web::Json<PostForm>,
) -> Fallible<HttpResponse> {
    observe("new_post", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        body.validate()?;
        let post = posts::create_post(&*state.ds, &auth.user, &body.content).await?;
        metrics::POSTS_CREATED.inc();
        Ok(HttpResponse::Created().json(UserFacingPost::from(post)))
    })
    .await
}

async fn follow<DS: Client>(
    state: web::Data<State<DS>>,
    username: web::Path<String>,
    bearer: Option<BearerAuth>,
) -> Fallible<HttpResponse> {
    observe("follow", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        let target = user_named(&*state.ds, username.into_inner()).await?;
        graph::follow(&*state.ds, &auth.user, &target).await?;
        metrics::GRAPH_CHANGES.with_label_values(&["follow"]).inc();
        Ok(see_other(&format!("/stream/{}", target.username)))
    })
    .await
}

async fn unfollow<DS: Client>(
    state: web::Data<State<DS>>,
    username: web::Path<String>,
    bearer: Option<BearerAuth>,
) -> Fallible<HttpResponse> {
    observe("unfollow", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        let target = user_named(&*state.ds, username.into_inner()).await?;
        graph::unfollow(&*state.ds, &auth.user, &target).await?;
        metrics::GRAPH_CHANGES.with_label_values(&["unfollow"]).inc();
        Ok(see_other(&format!("/stream/{}", target.username)))
    })
    .await
}

async fn following<DS: Client>(
    state: web::Data<State<DS>>,
    username: web::Path<String>,
) -> Fallible<web::Json<Vec<UserFacingUser>>> {
    observe("following", || async {
        let user = user_named(&*state.ds, username.into_inner()).await?;
        let users = graph::following(&*state.ds, &user).await?.coerce_into();
        Ok(web::Json(users))
    })
    .await
}

async fn followers<DS: Client>(
    state: web::Data<State<DS>>,
    username: web::Path<String>,
) -> Fallible<web::Json<Vec<UserFacingUser>>> {
    observe("followers", || async {
        let user = user_named(&*state.ds, username.into_inner()).await?;
        let users = graph::followers(&*state.ds, &user).await?.coerce_into();
        Ok(web::Json(users))
    })
    .await
}
