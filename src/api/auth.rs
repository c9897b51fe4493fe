//! Login sessions. A session token is a signed JWT naming a row in the sessions table, so
//! handlers get the logged-in `User` explicitly instead of from ambient request state.
use crate::datastore::{
    structs::{NewSession, User},
    SessionStore, UserStore,
};
use crate::twoface::{Cause, Describe, DescribeErr, ExternalError, Fallible};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use anyhow::anyhow;
use chrono::{offset::Utc, Duration};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID
    sub: Uuid,
    /// Session ID
    sid: Uuid,
    /// Expiry, as a Unix timestamp
    exp: usize,
}

/// Who made this request, and through which session.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session_id: Uuid,
    pub user: User,
}

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct Sessions {
    secret: Arc<Vec<u8>>,
    ttl: Duration,
}

impl Sessions {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: Arc::new(secret.as_bytes().to_vec()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Start a new session for `user` and return its token.
    pub async fn login<DS: SessionStore>(&self, ds: &DS, user: &User) -> Fallible<String> {
        let session = ds
            .new_session(NewSession {
                user_id: user.id,
                expires_at: Utc::now() + self.ttl,
            })
            .await?;
        let claims = Claims {
            sub: user.id,
            sid: session.id,
            exp: session.expires_at.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )?;
        info!(user_id = %user.id, session_id = %session.id, "logged in");
        Ok(token)
    }

    /// The session is revoked even though its token hasn't expired yet.
    pub async fn logout<DS: SessionStore>(&self, ds: &DS, auth: &Authenticated) -> Fallible<()> {
        ds.revoke_session(auth.session_id).await?;
        info!(user_id = %auth.user.id, session_id = %auth.session_id, "logged out");
        Ok(())
    }

    /// Resolve a bearer token to the user it was issued to. Fails with UserBadAuth if the token is
    /// missing, forged, expired or revoked.
    pub async fn require<DS>(&self, ds: &DS, bearer: Option<BearerAuth>) -> Fallible<Authenticated>
    where
        DS: SessionStore + UserStore,
    {
        guard!(let Some(bearer) = bearer else {
            return Err(anyhow!("no bearer token").describe(ExternalError::NOT_LOGGED_IN))
        });
        let claims = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .describe_err(ExternalError::NOT_LOGGED_IN)?
        .claims;

        let session = ds.get_session(claims.sid).await?;
        guard!(let Some(session) = session else {
            return Err(anyhow!("session {} doesn't exist", claims.sid)
                .describe(ExternalError::NOT_LOGGED_IN))
        });
        if session.user_id != claims.sub || !session.is_live(Utc::now()) {
            return Err(anyhow!("session {} is no longer valid", session.id)
                .describe(ExternalError::NOT_LOGGED_IN));
        }

        let user = ds.get_user(session.user_id).await?;
        guard!(let Some(user) = user else {
            return Err(anyhow!("session {} belongs to a missing user", session.id)
                .describe(ExternalError::NOT_LOGGED_IN))
        });
        Ok(Authenticated {
            session_id: session.id,
            user,
        })
    }

    /// Like `require`, but a request without a usable token is anonymous rather than an error.
    pub async fn viewer<DS>(&self, ds: &DS, bearer: Option<BearerAuth>) -> Fallible<Option<User>>
    where
        DS: SessionStore + UserStore,
    {
        if bearer.is_none() {
            return Ok(None);
        }
        match self.require(ds, bearer).await {
            Ok(auth) => Ok(Some(auth.user)),
            Err(e) if e.cause() == Cause::UserBadAuth => {
                debug!(error = %e, "treating request with unusable token as anonymous");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Fails with UserForbidden unless `user` is an admin.
pub fn require_admin(user: &User) -> Fallible<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(anyhow!("{} is not an admin", user.username).describe(ExternalError::ADMINS_ONLY))
    }
}
