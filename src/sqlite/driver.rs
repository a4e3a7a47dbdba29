use crate::{driver, sqlite::SqliteConnection, Error, ErrorKind, Result};
use std::ffi::CString;

/// Driver opening plain SQLite connections.
///
/// Descriptors are handed to `sqlite3_open_v2` as they are, with URI
/// filenames enabled, so `"app.db"`, `":memory:"` and
/// `"file:app.db?mode=ro"` are all accepted.
///
/// # Example
///
/// ```
/// use sqlite3_driver::{Driver, SqliteDriver};
///
/// let conn = SqliteDriver::new().open("file:example?mode=memory")?;
/// conn.close()?;
/// # sqlite3_driver::Result::<()>::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct SqliteDriver {
    write: bool,
    create: bool,
    shared_cache: bool,
}

impl SqliteDriver {
    /// Create a driver opening databases for writing, creating them if
    /// needed.
    #[inline]
    pub fn new() -> Self {
        Self {
            write: true,
            create: true,
            shared_cache: false,
        }
    }

    /// Allow writing to the database.
    ///
    /// If `false`, databases are opened in read-only mode.
    ///
    /// By default, `true`.
    #[inline]
    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Create the database if it does not already exist.
    ///
    /// Does not do anything unless [`write`](Self::write) is also `true`.
    ///
    /// By default, `true`.
    #[inline]
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Set whether shared cache will be used. Shared cache usage is
    /// discouraged by SQLite3 docs.
    ///
    /// By default, `false`.
    #[inline]
    pub fn shared_cache(mut self, shared_cache: bool) -> Self {
        self.shared_cache = shared_cache;
        self
    }

    /// Open a connection, keeping its concrete type.
    pub fn connect(&self, name: &str) -> Result<SqliteConnection> {
        let path = CString::new(name).map_err(|_| {
            Error::new(
                ErrorKind::InvalidPath,
                "descriptor must not contain NUL bytes".to_string(),
            )
        })?;

        SqliteConnection::open(&path, self.flags())
    }

    fn flags(&self) -> i32 {
        let mut x = libsqlite3_sys::SQLITE_OPEN_NOMUTEX | libsqlite3_sys::SQLITE_OPEN_URI;

        x |= if self.write && self.create {
            libsqlite3_sys::SQLITE_OPEN_CREATE | libsqlite3_sys::SQLITE_OPEN_READWRITE
        } else if self.write {
            libsqlite3_sys::SQLITE_OPEN_READWRITE
        } else {
            libsqlite3_sys::SQLITE_OPEN_READONLY
        };

        x |= if self.shared_cache {
            libsqlite3_sys::SQLITE_OPEN_SHAREDCACHE
        } else {
            libsqlite3_sys::SQLITE_OPEN_PRIVATECACHE
        };

        x
    }
}

impl Default for SqliteDriver {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl driver::Driver for SqliteDriver {
    fn open(&self, name: &str) -> Result<Box<dyn driver::Connection>> {
        Ok(Box::new(self.connect(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn flags() {
        let rw = SqliteDriver::new().flags();
        assert_ne!(rw & libsqlite3_sys::SQLITE_OPEN_CREATE, 0);
        assert_ne!(rw & libsqlite3_sys::SQLITE_OPEN_URI, 0);

        let ro = SqliteDriver::new().write(false).flags();
        assert_ne!(ro & libsqlite3_sys::SQLITE_OPEN_READONLY, 0);
        assert_eq!(ro & libsqlite3_sys::SQLITE_OPEN_CREATE, 0);
    }

    #[test]
    fn nul_in_descriptor() {
        let e = SqliteDriver::new().connect("a\0b").err().unwrap();
        assert_eq!(e.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn execute_and_query() {
        let mut conn = SqliteDriver::new().connect(":memory:").unwrap();

        let changed = conn
            .execute(
                "CREATE TABLE test (key INTEGER, value TEXT);
                 INSERT INTO test (key, value) VALUES (1, 'one'), (2, 'two');
                 -- trailing comment",
            )
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(conn.last_insert_row_id(), 2);

        let rows = conn
            .query("SELECT key, value, NULL AS empty, x'0102' AS raw FROM test ORDER BY key")
            .unwrap();
        assert_eq!(rows.columns, ["key", "value", "empty", "raw"]);
        assert_eq!(
            rows.rows,
            vec![
                vec![
                    Value::Integer(1),
                    Value::Text("one".into()),
                    Value::Null,
                    Value::Blob(vec![1, 2]),
                ],
                vec![
                    Value::Integer(2),
                    Value::Text("two".into()),
                    Value::Null,
                    Value::Blob(vec![1, 2]),
                ],
            ]
        );

        conn.close().unwrap();
    }

    #[test]
    fn empty_sql() {
        let mut conn = SqliteDriver::new().connect(":memory:").unwrap();
        assert_eq!(conn.execute("  ").unwrap(), 0);
        assert!(conn.query("").unwrap().is_empty());
    }

    #[test]
    fn nul_in_sql() {
        let mut conn = SqliteDriver::new().connect(":memory:").unwrap();

        let e = conn
            .execute("CREATE TABLE a (x INTEGER);\0CREATE TABLE b (x INTEGER);")
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Misuse);

        let e = conn.query("SELECT 1\0").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Misuse);

        let rows = conn
            .query("SELECT count(*) FROM sqlite_master WHERE type = 'table'")
            .unwrap();
        assert_eq!(rows.first_value(), Some(&Value::Integer(0)));
    }

    #[test]
    fn close_after_statements() {
        let mut conn = SqliteDriver::new().connect(":memory:").unwrap();
        conn.execute("CREATE TABLE test (value TEXT); INSERT INTO test VALUES ('a');")
            .unwrap();
        let rows = conn.query("SELECT value FROM test").unwrap();
        assert_eq!(rows.first_value().and_then(Value::as_text), Some("a"));
        assert_eq!(conn.total_changes(), 1);

        conn.close().unwrap();
    }

    #[test]
    fn syntax_error() {
        let mut conn = SqliteDriver::new().connect(":memory:").unwrap();
        let e = conn.execute("CREATE TABLE (").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Generic);
        assert!(e.message().contains("syntax error"), "{}", e.message());
    }
}
