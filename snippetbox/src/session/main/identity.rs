use crate::session::errors::SessionError;
use crate::session::types::Identity;
use crate::userdb::UserStore;

use super::session::Session;

/// Session key holding the logged-in user's id
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";

/// Resolve the session's user into a verified identity.
///
/// A session without a user id, or whose user no longer exists, is anonymous.
/// A failing lookup is an error and is never treated as "not logged in".
#[tracing::instrument(skip_all)]
pub async fn resolve_identity(
    session: &Session,
    users: &dyn UserStore,
) -> Result<Option<Identity>, SessionError> {
    let Some(user_id) = session.get_i64(AUTHENTICATED_USER_ID).await else {
        return Ok(None);
    };

    if users.exists(user_id).await? {
        Ok(Some(Identity { user_id }))
    } else {
        tracing::debug!(user_id, "Session refers to a user that no longer exists");
        Ok(None)
    }
}

/// Bind `user_id` to the session under a fresh token.
pub async fn log_in(session: &Session, user_id: i64) -> Result<(), SessionError> {
    session.renew_token().await?;
    session.put(AUTHENTICATED_USER_ID, user_id).await?;
    tracing::info!(user_id, "User logged in");
    Ok(())
}

/// Drop the user binding and move the remaining data to a fresh token.
pub async fn log_out(session: &Session) -> Result<(), SessionError> {
    session.renew_token().await?;
    session.remove(AUTHENTICATED_USER_ID).await;
    Ok(())
}
