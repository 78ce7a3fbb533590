use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{AccountRepository, SessionStore};
use crate::domain::user::UserProfile;
use crate::schema::{sessions, users};

use super::models::{NewSessionRow, NewUserRow, UserRow};

/// Server-side sessions live for a week.
const SESSION_TTL_DAYS: i64 = 7;

pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_profile(row: UserRow) -> UserProfile {
    UserProfile {
        id: row.id,
        email: row.email,
        name: row.name,
        address: row.address,
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
struct ProfileChanges {
    name: Option<String>,
    address: Option<String>,
}

impl AccountRepository for DieselAccountRepository {
    fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        address: &str,
    ) -> Result<UserProfile, DomainError> {
        let mut conn = self.pool.get()?;

        let id = Uuid::new_v4();
        let result = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                name: name.to_string(),
                address: address.to_string(),
            })
            .execute(&mut conn);

        match result {
            Ok(_) => Ok(UserProfile {
                id,
                email: email.to_string(),
                name: name.to_string(),
                address: address.to_string(),
            }),
            // The unique index on email is the arbiter for duplicates.
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(DomainError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<(UserProfile, String)>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(|row| {
            let hash = row.password_hash.clone();
            (to_profile(row), hash)
        }))
    }

    fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        address: Option<String>,
    ) -> Result<UserProfile, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // An all-None changeset is not a valid UPDATE statement.
            if name.is_some() || address.is_some() {
                diesel::update(users::table.filter(users::id.eq(user_id)))
                    .set(&ProfileChanges { name, address })
                    .execute(conn)?;
            }

            let row = users::table
                .filter(users::id.eq(user_id))
                .select(UserRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            Ok(to_profile(row))
        })
    }
}

pub struct DieselSessionStore {
    pool: DbPool,
}

impl DieselSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for DieselSessionStore {
    fn create(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        let token = Uuid::new_v4();
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                id: token,
                user_id,
                expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            })
            .execute(&mut conn)?;

        Ok(token)
    }

    fn find_user(&self, token: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = sessions::table
            .inner_join(users::table)
            .filter(sessions::id.eq(token))
            .filter(sessions::expires_at.gt(Utc::now()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(to_profile))
    }

    fn delete(&self, token: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(sessions::table.filter(sessions::id.eq(token))).execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::{DieselAccountRepository, DieselSessionStore};
    use crate::domain::errors::DomainError;
    use crate::domain::ports::{AccountRepository, SessionStore};
    use crate::infrastructure::models::NewSessionRow;
    use crate::infrastructure::test_support::{insert_user, setup_db};
    use crate::schema::{sessions, users};

    #[tokio::test]
    async fn duplicate_email_does_not_create_a_second_account() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAccountRepository::new(pool.clone());

        repo.insert("demo@example.com", "hash-one", "Demo", "1 Demo St")
            .expect("first insert failed");
        let result = repo.insert("demo@example.com", "hash-two", "Other", "2 Demo St");

        assert!(matches!(result, Err(DomainError::EmailTaken)));
        let mut conn = pool.get().expect("connection failed");
        let count: i64 = users::table
            .filter(users::email.eq("demo@example.com"))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn find_by_email_returns_profile_and_hash() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAccountRepository::new(pool);

        repo.insert("demo@example.com", "the-hash", "Demo", "1 Demo St")
            .expect("insert failed");

        let (profile, hash) = repo
            .find_by_email("demo@example.com")
            .expect("find failed")
            .expect("user should exist");
        assert_eq!(profile.name, "Demo");
        assert_eq!(hash, "the-hash");

        assert!(repo
            .find_by_email("nobody@example.com")
            .expect("find failed")
            .is_none());
    }

    #[tokio::test]
    async fn update_profile_is_partial() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAccountRepository::new(pool);

        let profile = repo
            .insert("demo@example.com", "hash", "Demo", "1 Demo St")
            .expect("insert failed");

        let updated = repo
            .update_profile(profile.id, Some("Renamed".to_string()), None)
            .expect("update failed");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.address, "1 Demo St");

        // No fields at all leaves everything untouched.
        let unchanged = repo
            .update_profile(profile.id, None, None)
            .expect("update failed");
        assert_eq!(unchanged.name, "Renamed");
        assert_eq!(unchanged.address, "1 Demo St");
    }

    #[tokio::test]
    async fn session_roundtrip_and_logout() {
        let (_container, pool) = setup_db().await;
        let store = DieselSessionStore::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "session@example.com");

        let token = store.create(user_id).expect("create failed");
        let user = store
            .find_user(token)
            .expect("find failed")
            .expect("session should resolve");
        assert_eq!(user.id, user_id);

        store.delete(token).expect("delete failed");
        assert!(store.find_user(token).expect("find failed").is_none());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let (_container, pool) = setup_db().await;
        let store = DieselSessionStore::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "session@example.com");

        let token = Uuid::new_v4();
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                id: token,
                user_id,
                expires_at: Utc::now() - Duration::hours(1),
            })
            .execute(&mut conn)
            .expect("insert session failed");

        assert!(store.find_user(token).expect("find failed").is_none());
    }
}
