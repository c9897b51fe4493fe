use crate::datastore::{
    postfilters::PostFilters,
    postgres::{
        errors::{BlockingResp, DbPoolResult},
        PostgresStore,
    },
    structs::{NewPost, Post},
    tables::{posts, relationships},
    PostStore,
};
use crate::twoface::Fallible;
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    expression::BoxableExpression,
    expression_methods::BoolExpressionMethods,
    pg::Pg,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Bool,
    ExpressionMethods, OptionalExtension, TextExpressionMethods,
};
use uuid::Uuid;

#[async_trait]
impl PostStore for PostgresStore {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let post: Post = diesel::insert_into(posts::table)
                .values(&new_post)
                .get_result(&conn)?;
            Ok(post)
        })
        .await;
        query_result.to_resp()
    }

    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let post: Option<Post> = posts::table.find(post_id).first(&conn).optional()?;
            Ok(post)
        })
        .await;
        query_result.to_resp()
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let mut query = posts::table
                .order((posts::created_at.desc(), posts::id.desc()))
                .into_boxed();
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            if let Some(limit) = filters.limit {
                query = query.limit(limit as i64);
            }
            let posts: Vec<Post> = query.load(&conn)?;
            Ok(posts)
        })
        .await;
        query_result.to_resp()
    }

    async fn stream(&self, user_id: Uuid, num_posts: u8) -> Fallible<Vec<Post>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let followed = relationships::table
                .filter(relationships::from_user_id.eq(user_id))
                .select(relationships::to_user_id);
            let stream: Vec<Post> = posts::table
                .filter(
                    posts::user_id
                        .eq(user_id)
                        .or(posts::user_id.eq_any(followed)),
                )
                .order((posts::created_at.desc(), posts::id.desc()))
                .limit(num_posts as i64)
                .load(&conn)?;
            Ok(stream)
        })
        .await;
        query_result.to_resp()
    }
}

impl PostFilters {
    pub fn as_sql_where(
        &self,
    ) -> Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> {
        let mut wheres: Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> =
            Vec::new();
        if let Some(id) = self.id {
            wheres.push(Box::new(posts::id.eq(id)))
        }
        if let Some(user_ids) = &self.user_ids {
            wheres.push(Box::new(posts::user_id.eq_any(user_ids.clone())))
        }
        if let Some(substring) = &self.text_contains {
            wheres.push(Box::new(
                posts::content.like(format!("%{}%", escape_like(substring))),
            ))
        }
        if let Some(created_before) = self.created_before {
            wheres.push(Box::new(posts::created_at.lt(created_before)))
        }
        wheres
    }
}

/// Postgres LIKE treats `%` and `_` as wildcards, and `\` escapes them.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("hello"), "hello");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_every_set_filter_becomes_a_where_clause() {
        assert!(PostFilters::default().as_sql_where().is_empty());
        let filters = PostFilters {
            id: Some(Uuid::new_v4()),
            user_ids: Some(vec![Uuid::new_v4()]),
            text_contains: Some("hi".to_owned()),
            created_before: Some(chrono::Utc::now()),
            limit: None,
        };
        assert_eq!(filters.as_sql_where().len(), 4);
    }
}
