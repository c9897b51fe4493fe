use crate::datastore::{
    postgres::{
        errors::{on_unique_violation, BlockingResp, DbPoolResult},
        PostgresStore,
    },
    structs::{NewUser, User},
    tables::users,
    UserStore,
};
use crate::twoface::{ExternalError, Fallible};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    result::Error as DieselError,
    sql_types::Text,
    Connection, ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

sql_function!(fn lower(x: Text) -> Text);

#[async_trait]
impl UserStore for PostgresStore {
    async fn new_user(&self, new_user: NewUser) -> Fallible<User> {
        let conn = self.conn()?;
        let user = block(move || {
            // The unique indices are the real check. The transaction just makes sure a
            // conflicting insert leaves nothing behind.
            conn.transaction::<_, DieselError, _>(|| {
                diesel::insert_into(users::table)
                    .values(&new_user)
                    .get_result::<User>(&conn)
            })
            .map_err(|e| on_unique_violation(e, ExternalError::USER_EXISTS))
        })
        .await
        .to_resp()?;
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let user: Option<User> = users::table.find(user_id).first(&conn).optional()?;
            Ok(user)
        })
        .await;
        query_result.to_resp()
    }

    async fn find_user_by_email(&self, email: String) -> Fallible<Option<User>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let user: Option<User> = users::table
                .filter(users::email.eq(email))
                .first(&conn)
                .optional()?;
            Ok(user)
        })
        .await;
        query_result.to_resp()
    }

    async fn find_user_by_username(&self, username: String) -> Fallible<Option<User>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let user: Option<User> = users::table
                .filter(lower(users::username).eq(username.to_ascii_lowercase()))
                .first(&conn)
                .optional()?;
            Ok(user)
        })
        .await;
        query_result.to_resp()
    }
}
