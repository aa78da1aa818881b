//! Database primitives: connection settings, pool wiring and the session
//! lookups that turn a cookie into an authorization [`Actor`].

use chrono::{DateTime, Duration as Ttl, Utc};
use entity::{sessions, users};
use platform_authz::{Actor, Role};
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set,
};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Shared connection pool handle.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (env {0})")]
    MissingUrl(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_connections);
        Self {
            max_connections,
            ..Self::default()
        }
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let pool = Database::connect(options).await?;
    debug!(max_connections = settings.max_connections, "database pool ready");
    Ok(pool)
}

/// Whether the database answers. A disconnected handle reports false.
pub async fn ping(pool: &DbPool) -> bool {
    match pool.ping().await {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "database ping failed");
            false
        }
    }
}

/// Build the authorization actor for a user row. Unknown role names are kept
/// as "no role" so the policy denies them.
pub fn actor_from_user(user: &users::Model) -> Actor {
    let role = Role::parse(&user.role);
    if role.is_none() {
        warn!(user_id = %user.id, role = %user.role, "user carries an unrecognised role");
    }
    Actor {
        id: user.id,
        role,
        department_id: user.department_id,
        employee_id: user.employee_id,
        utc_offset_minutes: user.utc_offset_minutes,
    }
}

/// Resolve a session id to its actor. Expired sessions are removed and
/// reported as absent, as are sessions of deactivated users.
pub async fn load_session_actor(
    pool: &DbPool,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<Option<(users::Model, Actor)>> {
    let Some(session) = sessions::Entity::find_by_id(session_id).one(pool).await? else {
        return Ok(None);
    };
    if session.expires_at.with_timezone(&Utc) < now {
        sessions::Entity::delete_by_id(session_id).exec(pool).await?;
        debug!(%session_id, "expired session removed");
        return Ok(None);
    }
    let Some(user) = users::Entity::find_by_id(session.user_id).one(pool).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    let actor = actor_from_user(&user);
    Ok(Some((user, actor)))
}

pub async fn find_user_by_email(pool: &DbPool, email: &str) -> DbResult<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email.trim().to_lowercase()))
        .one(pool)
        .await?)
}

/// Open a session for `user_id` that lapses after `ttl`.
pub async fn create_session(
    pool: &DbPool,
    user_id: Uuid,
    now: DateTime<Utc>,
    ttl: Ttl,
) -> DbResult<Uuid> {
    let session_id = Uuid::new_v4();
    sessions::Entity::insert(sessions::ActiveModel {
        id: Set(session_id),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        expires_at: Set((now + ttl).into()),
        ip: Set(None),
        user_agent: Set(None),
    })
    .exec_without_returning(pool)
    .await?;
    debug!(%session_id, %user_id, "session created");
    Ok(session_id)
}

pub async fn delete_session(pool: &DbPool, session_id: Uuid) -> DbResult<()> {
    sessions::Entity::delete_by_id(session_id).exec(pool).await?;
    Ok(())
}
