use crate::sqlite_column;
use crate::sqlite_persistence::{
    read_schema_version, Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
use crate::user::{User, UserStore};
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text),
        sqlite_column!("email", &SqlType::Text),
        sqlite_column!("role", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
};

/// V 1
const USER_TABLE_V_1: Table = Table {
    name: "user",
    columns: USER_TABLE_V_0.columns,
    indices: &[("idx_user_email", "email")],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USER_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[USER_TABLE_V_1],
        migration: Some(|conn: &Connection| {
            conn.execute("CREATE INDEX idx_user_email ON user(email);", [])?;
            Ok(())
        }),
    },
];

const USER_COLUMNS: &str = "id, username, email, role";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
    })
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open user database {:?}", db_path))?
        } else {
            info!("Creating user database at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create user database {:?}", db_path))?;
            VERSIONED_SCHEMAS
                .last()
                .context("No user schema defined")?
                .create(&conn)?;
            conn
        };

        let version = read_schema_version(&conn)?;
        let schema = match VERSIONED_SCHEMAS.get(version) {
            Some(schema) => schema,
            None => bail!("Database version {} is too new", version),
        };
        schema.validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating user db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("User database connection lock poisoned"))
    }
}

impl UserStore for SqliteUserStore {
    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            USER_COLUMNS, USER_TABLE_V_1.name
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<User>, _>>()
            .context("Failed to read users")?;
        Ok(users)
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                USER_COLUMNS, USER_TABLE_V_1.name
            ),
            params![user_id],
            user_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to read user {}", user_id))
    }

    fn save_user(&self, user: User) -> Result<User> {
        let conn = self.conn()?;
        let id = match user.id {
            Some(id) => {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (id, username, email, role) VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(id) DO UPDATE SET
                            username = excluded.username,
                            email = excluded.email,
                            role = excluded.role",
                        USER_TABLE_V_1.name
                    ),
                    params![id, user.username, user.email, user.role],
                )
                .with_context(|| format!("Failed to save user {}", id))?;
                id
            }
            None => {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (username, email, role) VALUES (?1, ?2, ?3)",
                        USER_TABLE_V_1.name
                    ),
                    params![user.username, user.email, user.role],
                )
                .context("Failed to insert user")?;
                conn.last_insert_rowid()
            }
        };
        debug!("Saved user {}", id);

        Ok(User {
            id: Some(id),
            ..user
        })
    }

    fn delete_user(&self, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", USER_TABLE_V_1.name),
                params![user_id],
            )
            .with_context(|| format!("Failed to delete user {}", user_id))?;
        debug!("Deleted user {} ({} rows)", user_id, deleted);
        Ok(())
    }
}
