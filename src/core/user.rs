//! User business logic - account creation and token lookup.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;
use uuid::Uuid;

/// Creates a new account with an empty cart and a fresh session token.
///
/// # Errors
/// Returns an error if:
/// - The name or email is empty or whitespace-only
/// - The email does not contain `@`
/// - An account with this email already exists
/// - The database insert fails
pub async fn create_user(db: &DatabaseConnection, name: &str, email: &str) -> Result<user::Model> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    if name.is_empty() {
        return Err(Error::invalid_argument("Name cannot be empty"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(Error::invalid_argument("A valid email is required"));
    }

    if User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::invalid_argument("An account with this email already exists"));
    }

    let account = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email),
        token: Set(Uuid::new_v4().simple().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let account = account.insert(db).await?;
    info!("Created user {}", account.id);
    Ok(account)
}

/// Finds the account owning a session token.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_token(db: &DatabaseConnection, token: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Token.eq(token))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads an account or fails with [`Error::UserNotFound`].
///
/// Generic over the connection so it can run inside a storage transaction.
pub(crate) async fn require_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })
}
