use crate::datastore::{
    postgres::{
        errors::{BlockingResp, DbPoolResult},
        PostgresStore,
    },
    structs::{Relationship, User},
    tables::{relationships, users},
    GraphStore,
};
use crate::twoface::Fallible;
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    dsl::exists,
    query_dsl::{QueryDsl, RunQueryDsl},
    select, ExpressionMethods, JoinOnDsl,
};
use tracing::debug;
use uuid::Uuid;

#[async_trait]
impl GraphStore for PostgresStore {
    async fn follow(&self, edge: Relationship) -> Fallible<()> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            // The composite primary key makes a repeated follow a no-op.
            let inserted = diesel::insert_into(relationships::table)
                .values(&edge)
                .on_conflict_do_nothing()
                .execute(&conn)?;
            if inserted == 0 {
                debug!(from = %edge.from_user_id, to = %edge.to_user_id, "already following");
            }
            Ok(())
        })
        .await;
        query_result.to_resp()
    }

    async fn unfollow(&self, edge: Relationship) -> Fallible<()> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let target = relationships::table.find((edge.from_user_id, edge.to_user_id));
            diesel::delete(target).execute(&conn)?;
            Ok(())
        })
        .await;
        query_result.to_resp()
    }

    async fn is_following(&self, edge: Relationship) -> Fallible<bool> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let target = relationships::table.find((edge.from_user_id, edge.to_user_id));
            let found: bool = select(exists(target)).get_result(&conn)?;
            Ok(found)
        })
        .await;
        query_result.to_resp()
    }

    async fn following(&self, user_id: Uuid) -> Fallible<Vec<User>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let followed: Vec<User> = relationships::table
                .inner_join(users::table.on(users::id.eq(relationships::to_user_id)))
                .filter(relationships::from_user_id.eq(user_id))
                .select(users::all_columns)
                .order(users::username)
                .load(&conn)?;
            Ok(followed)
        })
        .await;
        query_result.to_resp()
    }

    async fn followers(&self, user_id: Uuid) -> Fallible<Vec<User>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let followers: Vec<User> = relationships::table
                .inner_join(users::table.on(users::id.eq(relationships::from_user_id)))
                .filter(relationships::to_user_id.eq(user_id))
                .select(users::all_columns)
                .order(users::username)
                .load(&conn)?;
            Ok(followers)
        })
        .await;
        query_result.to_resp()
    }
}
