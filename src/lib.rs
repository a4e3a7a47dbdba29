//! # sqlite3-driver - SQLite driver registry with connection setup
//!
//! This library registers a SQLite driver under a well-known name,
//! [`DRIVER_NAME`], so that generic code can open connections by name.
//! Every connection opened through the registered driver has foreign-key
//! enforcement enabled before it is handed out.
//!
//! It wraps `libsqlite3`.
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlite3-driver = { version = "0.1.0", features = [ "bundled" ] }
//! ```
//!
//! Unless you are writing a library, you probably want to enable the `bundled`
//! feature, which automatically compiles SQLite.
//! See [Cargo features](#cargo-features) for more.
//!
//! Call [`register`] once during startup, then open connections with
//! [`open`] or through [`Registry::global`].
//!
//! # Example
//!
//! ```
//! use sqlite3_driver::ErrorKind;
//!
//! sqlite3_driver::register()?;
//!
//! let mut conn = sqlite3_driver::open("file:example.db?mode=memory")?;
//! let db = conn.as_execer().unwrap();
//! db.execute(
//!     "CREATE TABLE parent (id INTEGER PRIMARY KEY);
//!      CREATE TABLE child (parent_id INTEGER REFERENCES parent (id));",
//! )?;
//!
//! let e = db.execute("INSERT INTO child (parent_id) VALUES (1)").unwrap_err();
//! assert_eq!(e.kind(), ErrorKind::ConstraintViolation);
//! # sqlite3_driver::Result::<()>::Ok(())
//! ```
//!
//! Other setup statements, or none at all, can be configured by wrapping a
//! driver in [`SetupDriver`] and registering it in a [`Registry`].
//!
//! Without a setup statement a connection uses SQLite's compile-time
//! default. The `bundled` build enables foreign keys by default; system
//! libraries usually leave them off. To rely on one or the other, set it
//! explicitly:
//!
//! ```
//! use sqlite3_driver::{Driver, ErrorKind, SetupDriver, SqliteDriver};
//!
//! let relaxed = SetupDriver::with_statement(SqliteDriver::new(), "PRAGMA foreign_keys = off;");
//! let mut conn = relaxed.open(":memory:")?;
//! let db = conn.as_execer().unwrap();
//! db.execute(
//!     "CREATE TABLE parent (id INTEGER PRIMARY KEY);
//!      CREATE TABLE child (parent_id INTEGER REFERENCES parent (id));",
//! )?;
//! db.execute("INSERT INTO child (parent_id) VALUES (1)")?;
//!
//! let strict = SetupDriver::foreign_keys(relaxed);
//! let mut conn = strict.open(":memory:")?;
//! let db = conn.as_execer().unwrap();
//! db.execute(
//!     "CREATE TABLE parent (id INTEGER PRIMARY KEY);
//!      CREATE TABLE child (parent_id INTEGER REFERENCES parent (id));",
//! )?;
//! let e = db.execute("INSERT INTO child (parent_id) VALUES (1)").unwrap_err();
//! assert_eq!(e.kind(), ErrorKind::ConstraintViolation);
//! # sqlite3_driver::Result::<()>::Ok(())
//! ```
//!
//! # Cargo features
//!
//! * `bundled` (disabled by default): automatically compiles and statically
//!   links an up to date version of SQLite to the library. This is a very
//!   good choice for most applications.

#![warn(missing_docs, unreachable_pub)]
#![deny(unsafe_op_in_unsafe_fn)]

mod driver;
mod error;
mod registry;
mod setup;
mod sqlite;
mod value;

pub use self::{
    driver::{Connection, Driver, Execer, Queryer},
    error::{Error, ErrorKind},
    registry::Registry,
    setup::{SetupDriver, FOREIGN_KEYS_ON},
    sqlite::{SqliteConnection, SqliteDriver},
    value::{Rows, Value},
};

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Name under which [`register`] installs the driver.
pub const DRIVER_NAME: &str = "sqlite3";

/// Register the foreign-key enforcing SQLite driver as [`DRIVER_NAME`] in the
/// process-wide registry.
///
/// Call it once at startup. A second call fails with
/// [`ErrorKind::DriverAlreadyRegistered`].
pub fn register() -> Result<()> {
    Registry::global().register(DRIVER_NAME, SetupDriver::foreign_keys(SqliteDriver::new()))
}

/// Open a connection through the driver registered as [`DRIVER_NAME`].
pub fn open(name: &str) -> Result<Box<dyn Connection>> {
    Registry::global().open(DRIVER_NAME, name)
}
