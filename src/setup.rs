use crate::{
    driver::{Connection, Driver},
    Error, Result,
};
use std::sync::Arc;

/// Statement enabling foreign-key constraint enforcement.
pub const FOREIGN_KEYS_ON: &str = "PRAGMA foreign_keys = on;";

/// Driver adapter running a setup statement on every new connection.
///
/// The wrapped driver opens the connection with the descriptor unmodified.
/// If the connection supports [`Execer`](crate::Execer), the setup
/// statement is executed on it before it is returned. When the statement
/// fails, the connection is closed and an error of kind
/// [`SetupFailed`](crate::ErrorKind::SetupFailed) is returned, with the
/// underlying error as its source.
///
/// # Example
///
/// ```
/// use sqlite3_driver::{Driver, Queryer, SetupDriver, SqliteDriver, Value};
///
/// let driver = SetupDriver::foreign_keys(SqliteDriver::new());
/// let mut conn = driver.open(":memory:")?;
///
/// let rows = conn.as_queryer().unwrap().query("PRAGMA foreign_keys")?;
/// assert_eq!(rows.first_value(), Some(&Value::Integer(1)));
/// # sqlite3_driver::Result::<()>::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct SetupDriver<D> {
    inner: D,
    statement: Option<Arc<str>>,
}

impl<D: Driver> SetupDriver<D> {
    /// Wrap `inner`, enabling foreign-key enforcement on every connection.
    pub fn foreign_keys(inner: D) -> Self {
        Self::with_statement(inner, FOREIGN_KEYS_ON)
    }

    /// Wrap `inner` without running any statement.
    ///
    /// Connections keep SQLite's compile-time default for every setting.
    /// With the `bundled` feature that default has foreign keys enabled
    /// (`SQLITE_DEFAULT_FOREIGN_KEYS=1`), so passthrough connections still
    /// enforce them unless `inner` turns them off.
    pub fn passthrough(inner: D) -> Self {
        Self {
            inner,
            statement: None,
        }
    }

    /// Wrap `inner`, running `statement` on every connection.
    pub fn with_statement(inner: D, statement: impl Into<Arc<str>>) -> Self {
        Self {
            inner,
            statement: Some(statement.into()),
        }
    }

    /// The configured setup statement, if any.
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Driver> Driver for SetupDriver<D> {
    fn open(&self, name: &str) -> Result<Box<dyn Connection>> {
        let mut conn = self.inner.open(name)?;

        let Some(statement) = self.statement.as_deref() else {
            return Ok(conn);
        };

        let outcome = conn.as_execer().map(|execer| execer.execute(statement));
        match outcome {
            Some(Ok(_)) => {
                tracing::debug!(statement, "connection setup applied");
                Ok(conn)
            }
            Some(Err(cause)) => {
                tracing::warn!(statement, error = %cause, "connection setup failed");
                let _ = conn.close();
                Err(Error::setup_failed(cause))
            }
            None => {
                tracing::debug!(statement, "connection cannot execute statements, setup skipped");
                Ok(conn)
            }
        }
    }
}
