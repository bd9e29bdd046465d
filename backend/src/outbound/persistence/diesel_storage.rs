//! PostgreSQL-backed storage implementing every storage port.
//!
//! The first-login bind is a conditional `UPDATE ... WHERE hashed_password =
//! 'tbd'`; PostgreSQL row locking makes it a compare-and-set across every
//! process sharing the database.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::info;

use crate::domain::ports::{
    BindOutcome, CredentialRepository, CredentialRepositoryError, GeofenceRepository,
    GeofenceRepositoryError, LocationRepository, LocationRepositoryError, Storage,
    StorageInitError,
};
use crate::domain::{
    CredentialRecord, FriendGroup, LocationFix, MemberLocation, Rect, UNSET_PASSWORD, Username,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::migrations::run_pending_migrations;
use super::models::{GeofenceRow, LocationRow, NewLocationRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolConfig, PoolError};
use super::schema::{geofences, locations, users};

/// Diesel-backed implementation of [`Storage`].
#[derive(Clone)]
pub struct DieselStorage {
    pool: DbPool,
    database_url: String,
}

impl DieselStorage {
    /// Wrap an existing pool. `database_url` is used only for migrations.
    pub fn new(pool: DbPool, database_url: impl Into<String>) -> Self {
        Self {
            pool,
            database_url: database_url.into(),
        }
    }

    /// Build a pool from `config` and wrap it.
    pub async fn connect(config: PoolConfig) -> Result<Self, StorageInitError> {
        let database_url = config.database_url().to_owned();
        let pool = DbPool::new(config)
            .await
            .map_err(|err| StorageInitError::connection(err.to_string()))?;
        Ok(Self::new(pool, database_url))
    }
}

fn credentials_pool_error(error: PoolError) -> CredentialRepositoryError {
    map_pool_error(error, CredentialRepositoryError::connection)
}

fn credentials_query_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> CredentialRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            CredentialRepositoryError::query,
            CredentialRepositoryError::connection,
        )
    }
}

fn locations_pool_error(error: PoolError) -> LocationRepositoryError {
    map_pool_error(error, LocationRepositoryError::connection)
}

fn locations_query_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> LocationRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            LocationRepositoryError::query,
            LocationRepositoryError::connection,
        )
    }
}

fn geofences_pool_error(error: PoolError) -> GeofenceRepositoryError {
    map_pool_error(error, GeofenceRepositoryError::connection)
}

fn geofences_query_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> GeofenceRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            GeofenceRepositoryError::query,
            GeofenceRepositoryError::connection,
        )
    }
}

#[async_trait]
impl CredentialRepository for DieselStorage {
    async fn get_user_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<CredentialRecord>, CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credentials_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(credentials_query_error("credential lookup"))?;
        row.map(CredentialRecord::try_from)
            .transpose()
            .map_err(CredentialRepositoryError::query)
    }

    async fn set_user_credentials(
        &self,
        username: &Username,
        digest: &str,
    ) -> Result<BindOutcome, CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credentials_pool_error)?;
        let updated = diesel::update(
            users::table
                .filter(users::username.eq(username.as_str()))
                .filter(users::hashed_password.eq(UNSET_PASSWORD)),
        )
        .set(users::hashed_password.eq(digest))
        .execute(&mut conn)
        .await
        .map_err(credentials_query_error("password bind"))?;
        Ok(if updated == 1 {
            BindOutcome::Bound
        } else {
            BindOutcome::AlreadyBound
        })
    }

    async fn create_user(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
    ) -> Result<(), CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credentials_pool_error)?;
        let inserted = diesel::insert_into(users::table)
            .values(NewUserRow {
                username: username.as_str(),
                hashed_password: UNSET_PASSWORD,
                friend_group: friend_group.as_str(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(credentials_query_error("user insert"))?;
        if inserted == 0 {
            return Err(CredentialRepositoryError::already_exists(username.as_str()));
        }
        info!(username = %username, friend_group = %friend_group, "user created");
        Ok(())
    }

    async fn reset_password(&self, username: &Username) -> Result<(), CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credentials_pool_error)?;
        let updated = diesel::update(users::table.filter(users::username.eq(username.as_str())))
            .set(users::hashed_password.eq(UNSET_PASSWORD))
            .execute(&mut conn)
            .await
            .map_err(credentials_query_error("password reset"))?;
        if updated == 0 {
            return Err(CredentialRepositoryError::not_found(username.as_str()));
        }
        info!(username = %username, "password reset");
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for DieselStorage {
    async fn save_user_location(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
        location: &LocationFix,
    ) -> Result<(), LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(locations_pool_error)?;
        diesel::insert_into(locations::table)
            .values(NewLocationRow {
                username: username.as_str(),
                friend_group: friend_group.as_str(),
                location: location.clone().into(),
                updated_at: Utc::now(),
            })
            .on_conflict(locations::username)
            .do_update()
            .set((
                locations::friend_group.eq(excluded(locations::friend_group)),
                locations::location.eq(excluded(locations::location)),
                locations::updated_at.eq(excluded(locations::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(locations_query_error("location upsert"))?;
        Ok(())
    }

    async fn get_user_locations_in_group(
        &self,
        friend_group: &FriendGroup,
    ) -> Result<Vec<MemberLocation>, LocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(locations_pool_error)?;
        let rows: Vec<LocationRow> = locations::table
            .filter(locations::friend_group.eq(friend_group.as_str()))
            .order(locations::username.asc())
            .select(LocationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(locations_query_error("group location scan"))?;
        rows.into_iter()
            .map(MemberLocation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(LocationRepositoryError::query)
    }
}

#[async_trait]
impl GeofenceRepository for DieselStorage {
    async fn save_rects(&self, rects: &[Rect]) -> Result<(), GeofenceRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let rows = rects
            .iter()
            .enumerate()
            .map(|(position, rect)| {
                i32::try_from(position)
                    .map(|position| GeofenceRow::at(position, rect))
                    .map_err(|_| GeofenceRepositoryError::query("too many rectangles"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.pool.get().await.map_err(geofences_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(geofences::table).execute(conn).await?;
                if !rows.is_empty() {
                    diesel::insert_into(geofences::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(geofences_query_error("rectangle replace"))
    }

    async fn get_rects(&self) -> Result<Vec<Rect>, GeofenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(geofences_pool_error)?;
        let rows: Vec<GeofenceRow> = geofences::table
            .order(geofences::position.asc())
            .select(GeofenceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(geofences_query_error("rectangle scan"))?;
        Ok(rows.into_iter().map(Rect::from).collect())
    }
}

#[async_trait]
impl Storage for DieselStorage {
    async fn initialize(&self) -> Result<(), StorageInitError> {
        run_pending_migrations(&self.database_url).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
