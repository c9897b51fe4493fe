use crate::api::{auth::require_admin, observe, State};
use crate::datastore::{postfilters::PostFilters, structs::Post, Client, PostStore};
use crate::twoface::{DescribeErr, ExternalError, Fallible};
use actix_web::{web, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;

pub fn configure<DS: Client>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/posts").route(web::get().to(list_all_posts::<DS>)));
}

// Admin endpoint. Filters come from the query string, e.g. `?user_ids[0]=<uuid>&limit=10`.
async fn list_all_posts<DS: Client>(
    state: web::Data<State<DS>>,
    bearer: Option<BearerAuth>,
    req: HttpRequest,
) -> Fallible<web::Json<Vec<Post>>> {
    observe("admin_list_posts", || async {
        let auth = state.sessions.require(&*state.ds, bearer).await?;
        require_admin(&auth.user)?;
        let filters: PostFilters = serde_qs::from_str(req.query_string())
            .describe_err(ExternalError::invalid_field("Invalid post filters"))?;
        let data = state.ds.list_posts(filters).await?;
        Ok(web::Json(data))
    })
    .await
}
