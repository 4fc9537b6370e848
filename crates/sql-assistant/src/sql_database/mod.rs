//! Relational database capability - schema introspection and statement execution over SQLite
pub mod result_format;
pub mod table_info;

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, warn};

use crate::error::{AssistantError, Result};
use result_format::{render_literal, render_rows, render_tuple};

/// What the pipeline needs from a database: its schema as text and a way to
/// run one statement and get the rows back as text.
pub trait SqlBackend: Send + Sync {
    /// Schema description of every table. Fails only when the connection is unusable.
    fn get_table_info(&self) -> Result<String>;

    /// Execute one statement. Engine rejections are [`AssistantError::QueryExecution`].
    fn run(&self, sql: &str) -> Result<String>;

    /// Human-readable target, for logs and the terminal surface.
    fn describe(&self) -> String;
}

/// SQLite database reached through an r2d2 pool.
pub struct SqlDatabase {
    pool: Pool<SqliteConnectionManager>,
    target: String,
    include_tables: Option<Vec<String>>,
}

/// `chinook` becomes `./chinook.db`; anything with an extension or a path
/// separator is taken as given.
pub fn resolve_database_path(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.extension().is_some() || path.components().count() > 1 {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("./{}.db", name))
    }
}

impl SqlDatabase {
    /// Bind to an existing database file. A missing file is a connection error;
    /// no empty database is created in its place.
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening database at: {}", path.display());
        if !path.is_file() {
            return Err(AssistantError::connection(format!(
                "Database file not found: {}",
                path.display()
            )));
        }

        let manager = SqliteConnectionManager::file(path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| AssistantError::connection(format!("Failed to create connection pool: {}", e)))?;

        // Fails on files that are not SQLite databases
        {
            let conn = pool.get()?;
            table_info::list_tables(&conn).map_err(|e| AssistantError::connection(e.to_string()))?;
        }

        info!("Database connected: {}", path.display());
        Ok(Self {
            pool,
            target: path.display().to_string(),
            include_tables: None,
        })
    }

    /// Private in-memory database. A single pooled connection keeps every
    /// caller on the same database.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AssistantError::connection(format!("Failed to create connection pool: {}", e)))?;
        Ok(Self {
            pool,
            target: ":memory:".to_string(),
            include_tables: None,
        })
    }

    /// Restrict schema text to the named tables.
    pub fn with_include_tables(mut self, tables: Vec<String>) -> Self {
        self.include_tables = Some(tables);
        self
    }

    /// Run a batch of statements, for seeding fixtures.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(sql)
            .map_err(|e| AssistantError::query_execution(e.to_string()))
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let tables = table_info::list_tables(&conn)
            .map_err(|e| AssistantError::connection(e.to_string()))?;
        Ok(tables.into_iter().map(|(name, _)| name).collect())
    }
}

impl SqlBackend for SqlDatabase {
    fn get_table_info(&self) -> Result<String> {
        let conn = self.pool.get()?;
        let info = table_info::render_table_info(&conn, self.include_tables.as_deref())
            .map_err(|e| AssistantError::connection(format!("Failed to read schema: {}", e)))?;
        debug!("Fetched schema text ({} bytes) from {}", info.len(), self.target);
        Ok(info)
    }

    fn run(&self, sql: &str) -> Result<String> {
        if sql.trim().is_empty() {
            warn!("Empty statement, nothing to run against {}", self.target);
            return Err(AssistantError::query_execution("empty SQL statement"));
        }
        let conn = self.pool.get()?;
        let rendered = run_statement(&conn, sql).map_err(|e| {
            warn!("Statement rejected by {}: {}", self.target, e);
            AssistantError::query_execution(e.to_string())
        })?;
        debug!("Statement returned {} bytes of result text", rendered.len());
        Ok(rendered)
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

fn run_statement(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<String> {
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        stmt.execute([])?;
        return Ok(String::new());
    }

    let mut rows = stmt.query([])?;
    let mut rendered = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            cells.push(render_literal(row.get_ref(i)?));
        }
        rendered.push(render_tuple(&cells));
    }
    Ok(render_rows(&rendered))
}
