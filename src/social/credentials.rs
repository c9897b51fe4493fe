//! Registering users and checking their passwords.
use crate::datastore::{
    postgres::errors::BlockingResp,
    structs::{NewUser, User},
    UserStore,
};
use crate::twoface::{Fallible, TfError};
use actix_web::web::block;
use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use tracing::{error, info};

lazy_static! {
    /// Verified against when the email is unknown, so both kinds of failed login cost one argon2 run.
    static ref DECOY_HASH: String =
        hash_password("not anybody's password").expect("couldn't hash the decoy password");
}

/// Store a new user. Only a salted hash of the password is kept.
/// Fails with `ExternalError::USER_EXISTS` if the username or email is taken.
pub async fn create_user<DS: UserStore>(
    ds: &DS,
    username: &str,
    email: &str,
    password: &str,
    admin: bool,
) -> Fallible<User> {
    let new_user = NewUser {
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash: hash_off_thread(password.to_owned()).await?,
        is_admin: admin,
    };
    let user = ds.new_user(new_user).await?;
    info!(user_id = %user.id, username = %user.username, admin, "registered user");
    Ok(user)
}

/// Returns the user if `password` is theirs. Unknown emails and wrong passwords both return None,
/// after roughly the same amount of work.
pub async fn verify_credentials<DS: UserStore>(
    ds: &DS,
    email: &str,
    password: &str,
) -> Fallible<Option<User>> {
    let user = ds.find_user_by_email(email.to_owned()).await?;
    guard!(let Some(user) = user else {
        verify_off_thread(DECOY_HASH.clone(), password.to_owned()).await?;
        return Ok(None)
    });
    if verify_off_thread(user.password_hash.clone(), password.to_owned()).await? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

// argon2 is slow on purpose, so it runs on the blocking threadpool like the diesel calls.
async fn hash_off_thread(password: String) -> Fallible<String> {
    block(move || hash_password(&password)).await.to_resp()
}

async fn verify_off_thread(password_hash: String, password: String) -> Fallible<bool> {
    block(move || Ok::<_, TfError>(verify_password(&password_hash, &password)))
        .await
        .to_resp()
}

/// Generates a new PHC-format password hash using argon2.
pub fn hash_password(password: &str) -> Fallible<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("couldn't hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Uses argon2 to verify the password hash against the provided password.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(err) => {
            error!("failed to parse password hash: {}", err);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}
