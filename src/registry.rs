use crate::{
    driver::{Connection, Driver},
    Error, ErrorKind, Result,
};
use rustc_hash::FxHashMap;
use std::{
    sync::{Arc, OnceLock, PoisonError, RwLock},
    thread,
};

/// Maps driver names to drivers.
///
/// Entries are never replaced or removed once registered.
#[derive(Default)]
pub struct Registry {
    drivers: RwLock<FxHashMap<String, Arc<dyn Driver>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();

        GLOBAL.get_or_init(Registry::new)
    }

    /// Register `driver` under `name`.
    ///
    /// Fails with [`ErrorKind::DriverAlreadyRegistered`] if the name is taken;
    /// the existing entry is kept.
    pub fn register(&self, name: &str, driver: impl Driver + 'static) -> Result<()> {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        if drivers.contains_key(name) {
            return Err(Error::new(
                ErrorKind::DriverAlreadyRegistered,
                format!("driver '{}' is already registered", name),
            ));
        }

        drivers.insert(name.to_owned(), Arc::new(driver));
        tracing::debug!(driver = name, "registered database driver");
        Ok(())
    }

    /// Look up a driver by name.
    pub fn driver(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::DriverNotFound,
                    format!("unknown driver '{}' (forgotten register?)", name),
                )
            })
    }

    /// Names of all registered drivers, sorted.
    pub fn drivers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    /// Open a connection through the driver registered as `driver`.
    pub fn open(&self, driver: &str, name: &str) -> Result<Box<dyn Connection>> {
        self.driver(driver)?.open(name)
    }

    /// Like [`open`](Self::open), but runs the blocking open in a background
    /// thread.
    ///
    /// # Example
    ///
    /// ```
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use sqlite3_driver::{Registry, SqliteDriver};
    ///
    /// let registry = Registry::new();
    /// registry.register("sqlite3", SqliteDriver::new())?;
    ///
    /// let conn = registry.open_async("sqlite3", ":memory:").await?;
    /// conn.close()?;
    /// # sqlite3_driver::Result::<()>::Ok(())
    /// # }).unwrap();
    /// ```
    pub async fn open_async(&self, driver: &str, name: &str) -> Result<Box<dyn Connection>> {
        let driver = self.driver(driver)?;
        let name = name.to_owned();

        let (tx, rx) = oneshot::channel();
        thread::Builder::new()
            .name("sqlite3-driver-open".to_string())
            .spawn(move || {
                let _ = tx.send(driver.open(&name));
            })
            .map_err(|e| Error::new(ErrorKind::Generic, e.to_string()))?;

        rx.await.map_err(|_| Error::background_task_failed())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SetupDriver, SqliteDriver};

    #[test]
    fn duplicate_registration() {
        let registry = Registry::new();
        registry
            .register("sqlite3", SqliteDriver::new())
            .unwrap();

        let e = registry
            .register("sqlite3", SetupDriver::passthrough(SqliteDriver::new()))
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::DriverAlreadyRegistered);
        assert_eq!(registry.drivers(), ["sqlite3"]);
    }

    #[test]
    fn unknown_driver() {
        let registry = Registry::new();
        let e = registry.open("postgres", ":memory:").err().unwrap();
        assert_eq!(e.kind(), ErrorKind::DriverNotFound);
    }

    #[test]
    fn drivers_are_sorted() {
        let registry = Registry::new();
        registry.register("b", SqliteDriver::new()).unwrap();
        registry
            .register("a", SetupDriver::foreign_keys(SqliteDriver::new()))
            .unwrap();
        assert_eq!(registry.drivers(), ["a", "b"]);
    }

    #[test]
    fn open_through_registry() {
        let registry = Registry::new();
        registry
            .register("fk", SetupDriver::foreign_keys(SqliteDriver::new()))
            .unwrap();

        let mut conn = registry.open("fk", ":memory:").unwrap();
        let rows = conn
            .as_queryer()
            .unwrap()
            .query("PRAGMA foreign_keys")
            .unwrap();
        assert_eq!(rows.first_value().and_then(|v| v.as_integer()), Some(1));
    }
}
