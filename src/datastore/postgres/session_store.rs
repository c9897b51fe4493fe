use crate::datastore::{
    postgres::{
        errors::{BlockingResp, DbPoolResult},
        PostgresStore,
    },
    structs::{NewSession, Session},
    tables::sessions,
    SessionStore,
};
use crate::twoface::Fallible;
use actix_web::web::block;
use async_trait::async_trait;
use chrono::offset::Utc;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

#[async_trait]
impl SessionStore for PostgresStore {
    async fn new_session(&self, new_session: NewSession) -> Fallible<Session> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let session: Session = diesel::insert_into(sessions::table)
                .values(&new_session)
                .get_result(&conn)?;
            Ok(session)
        })
        .await;
        query_result.to_resp()
    }

    async fn get_session(&self, session_id: Uuid) -> Fallible<Option<Session>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let session: Option<Session> =
                sessions::table.find(session_id).first(&conn).optional()?;
            Ok(session)
        })
        .await;
        query_result.to_resp()
    }

    async fn revoke_session(&self, session_id: Uuid) -> Fallible<Option<Session>> {
        let conn = self.conn()?;
        let query_result: DbPoolResult<_> = block(move || {
            let target = sessions::table
                .find(session_id)
                .filter(sessions::revoked_at.is_null());
            let session: Option<Session> = diesel::update(target)
                .set(sessions::revoked_at.eq(Some(Utc::now())))
                .get_result(&conn)
                .optional()?;
            Ok(session)
        })
        .await;
        query_result.to_resp()
    }
}
