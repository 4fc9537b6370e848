//! Credential store - SQLite-backed accounts of the grocery assistant
pub mod migration;

pub use migration::MigrationManager;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{AssistantError, Result};
use crate::profile::{Transport, UserProfile};

pub const MAX_AGE: u32 = 120;

/// Sign-up form contents.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub profile: UserProfile,
}

pub struct CredentialStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl CredentialStore {
    /// Open or create the store file and bring its schema up to date.
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("Opening credential store at: {}", db_path.display());
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssistantError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| AssistantError::storage(format!("Failed to create connection pool: {}", e)))?;

        Self::initialize(pool)
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .map_err(|e| AssistantError::storage(format!("Failed to create connection pool: {}", e)))?;
        Self::initialize(pool)
    }

    fn initialize(pool: Pool<SqliteConnectionManager>) -> Result<Self> {
        {
            let mut conn = pool.get().map_err(storage_error)?;
            MigrationManager::new(&mut conn)
                .initialize_database()
                .map_err(storage_error)?;
        }
        info!("Credential store initialized successfully");
        Ok(Self { pool: Arc::new(pool) })
    }

    fn get_conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(storage_error)
    }

    /// Persist a new account and return its profile.
    pub fn create_account(&self, account: NewAccount) -> Result<UserProfile> {
        if account.username.is_empty() || account.password.is_empty() {
            return Err(AssistantError::authentication("Username and password are required."));
        }
        validate_profile(&account.profile)?;

        let conn = self.get_conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [&account.username],
                |_| Ok(()),
            )
            .optional()
            .map_err(storage_error)?
            .is_some();
        if exists {
            warn!("Sign-up rejected: username already taken");
            return Err(AssistantError::DuplicateAccount(account.username));
        }

        let profile = account.profile;
        let inserted = conn.execute(
            "INSERT INTO users
             (username, password, name, city, preferences, transport, age, budget, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                account.username,
                account.password,
                profile.name,
                profile.city,
                profile.preferences,
                profile.transport.to_stored(),
                profile.age,
                profile.budget,
                Utc::now().to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                info!("Account created");
                Ok(profile)
            }
            // Lost a race with a concurrent sign-up of the same name
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AssistantError::DuplicateAccount(account.username))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    /// Exact string match on username and password.
    pub fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let conn = self.get_conn()?;
        let Some(profile) = conn
            .query_row(
                "SELECT name, city, preferences, transport, age, budget
                 FROM users WHERE username = ?1 AND password = ?2",
                [username, password],
                |row| profile_from_row(row, 0),
            )
            .optional()
            .map_err(storage_error)?
        else {
            debug!("Login failed: no matching credentials");
            return Err(AssistantError::authentication("Invalid username or password."));
        };

        conn.execute(
            "UPDATE users SET last_login_at = ?1 WHERE username = ?2",
            params![Utc::now().to_rfc3339(), username],
        )
        .map_err(storage_error)?;

        info!("Login succeeded");
        Ok(profile)
    }

    pub fn get_profile(&self, username: &str) -> Result<Option<UserProfile>> {
        let conn = self.get_conn()?;
        conn.query_row(
            "SELECT name, city, preferences, transport, age, budget FROM users WHERE username = ?1",
            [username],
            |row| profile_from_row(row, 0),
        )
        .optional()
        .map_err(storage_error)
    }

    pub fn account_count(&self) -> Result<i64> {
        let conn = self.get_conn()?;
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(storage_error)
    }
}

/// Columns may be NULL in tables created by earlier versions of the store.
fn profile_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<UserProfile> {
    let text = |i: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(offset + i)?.unwrap_or_default())
    };
    Ok(UserProfile {
        name: text(0)?,
        city: text(1)?,
        preferences: text(2)?,
        transport: Transport::from_stored(&text(3)?),
        age: row.get::<_, Option<u32>>(offset + 4)?.unwrap_or_default(),
        budget: row.get::<_, Option<f64>>(offset + 5)?.unwrap_or_default(),
    })
}

fn validate_profile(profile: &UserProfile) -> Result<()> {
    if profile.age > MAX_AGE {
        return Err(AssistantError::Validation(format!(
            "age must be between 0 and {}, got {}",
            MAX_AGE, profile.age
        )));
    }
    if !profile.budget.is_finite() || profile.budget < 0.0 {
        return Err(AssistantError::Validation(format!(
            "budget must be a non-negative amount, got {}",
            profile.budget
        )));
    }
    Ok(())
}

fn storage_error(e: impl std::fmt::Display) -> AssistantError {
    AssistantError::storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password: "geheim".to_string(),
            profile: UserProfile {
                name: "Max Mustermann".to_string(),
                city: "Berlin".to_string(),
                preferences: "Bio".to_string(),
                transport: Transport::Many(vec!["Car".to_string(), "Bicycle".to_string()]),
                age: 30,
                budget: 50.0,
            },
        }
    }

    // ===== Sign-up Tests =====

    #[test]
    fn test_create_account_returns_profile() {
        let store = CredentialStore::open_in_memory().unwrap();
        let profile = store.create_account(create_test_account("max")).unwrap();

        assert_eq!(profile.city, "Berlin");
        assert_eq!(store.account_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.create_account(create_test_account("max")).unwrap();

        let err = store.create_account(create_test_account("max")).unwrap_err();
        assert!(matches!(err, AssistantError::DuplicateAccount(ref name) if name == "max"));
        assert_eq!(store.account_count().unwrap(), 1);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let store = CredentialStore::open_in_memory().unwrap();
        let mut account = create_test_account("");
        let err = store.create_account(account.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Username and password are required.");

        account.username = "max".to_string();
        account.password = String::new();
        assert!(matches!(store.create_account(account), Err(AssistantError::Authentication(_))));
    }

    #[test]
    fn test_profile_ranges_validated() {
        let store = CredentialStore::open_in_memory().unwrap();

        let mut too_old = create_test_account("old");
        too_old.profile.age = 121;
        assert!(matches!(store.create_account(too_old), Err(AssistantError::Validation(_))));

        let mut in_debt = create_test_account("debt");
        in_debt.profile.budget = -1.0;
        assert!(matches!(store.create_account(in_debt), Err(AssistantError::Validation(_))));

        assert_eq!(store.account_count().unwrap(), 0);
    }

    // ===== Login Tests =====

    #[test]
    fn test_login_round_trips_profile() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.create_account(create_test_account("max")).unwrap();

        let profile = store.login("max", "geheim").unwrap();
        assert_eq!(profile.name, "Max Mustermann");
        assert_eq!(
            profile.transport,
            Transport::Many(vec!["Car".to_string(), "Bicycle".to_string()])
        );
        assert_eq!(profile.budget, 50.0);
    }

    #[test]
    fn test_single_transport_reads_back_as_list() {
        let store = CredentialStore::open_in_memory().unwrap();
        let mut account = create_test_account("eva");
        account.profile.transport = Transport::One("Bus".to_string());
        store.create_account(account).unwrap();

        let profile = store.get_profile("eva").unwrap().unwrap();
        assert_eq!(profile.transport, Transport::Many(vec!["Bus".to_string()]));
    }

    #[test]
    fn test_login_mismatch_is_authentication_error() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.create_account(create_test_account("max")).unwrap();

        for (user, pass) in [("max", "falsch"), ("moritz", "geheim"), ("MAX", "geheim")] {
            let err = store.login(user, pass).unwrap_err();
            assert_eq!(err.to_string(), "Invalid username or password.");
        }
    }

    #[test]
    fn test_password_stored_as_given() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.create_account(create_test_account("max")).unwrap();

        let conn = store.get_conn().unwrap();
        let stored: String = conn
            .query_row("SELECT password FROM users WHERE username = 'max'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "geheim");
    }

    #[test]
    fn test_login_against_existing_users_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE users (
                    username TEXT PRIMARY KEY, password TEXT, name TEXT, city TEXT,
                    preferences TEXT, transport TEXT, age INTEGER, budget REAL
                 );
                 INSERT INTO users VALUES ('max', 'geheim', 'Max', 'Berlin', 'Bio', 'Car,Bicycle', 30, 50.0);
                 INSERT INTO users (username, password) VALUES ('eva', 'pw');",
            )
            .unwrap();

        let store = CredentialStore::open(&path).unwrap();
        let profile = store.login("max", "geheim").unwrap();
        assert_eq!(profile.city, "Berlin");
        assert_eq!(
            profile.transport,
            Transport::Many(vec!["Car".to_string(), "Bicycle".to_string()])
        );

        let sparse = store.login("eva", "pw").unwrap();
        assert_eq!(sparse, UserProfile::default());
        assert!(store.login("max", "falsch").is_err());
    }

    // ===== Persistence Tests =====

    #[test]
    fn test_accounts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");

        {
            let store = CredentialStore::open(&path).unwrap();
            store.create_account(create_test_account("max")).unwrap();
        }

        let store = CredentialStore::open(&path).unwrap();
        assert!(store.login("max", "geheim").is_ok());
        assert!(store.get_profile("nobody").unwrap().is_none());
    }
}
