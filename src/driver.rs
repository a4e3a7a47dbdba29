//! Driver abstraction.
//!
//! A [`Driver`] turns an opaque descriptor into a [`Connection`].
//! Connections expose optional capabilities through [`Connection::as_execer`]
//! and [`Connection::as_queryer`]; a connection that does not support one
//! returns `None`.

use crate::{value::Rows, Result};

/// Opens connections from a descriptor.
pub trait Driver: Send + Sync {
    /// Open a new physical connection.
    ///
    /// The descriptor is driver-specific (file path, `:memory:`, URI...).
    fn open(&self, name: &str) -> Result<Box<dyn Connection>>;
}

/// An open database connection.
pub trait Connection: Send {
    /// Single-statement execution, if supported.
    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        None
    }

    /// Row queries, if supported.
    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        None
    }

    /// Close the connection, reporting any error from the underlying
    /// library.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Executes SQL that returns no rows.
pub trait Execer {
    /// Execute every statement in `sql`.
    ///
    /// Returns the number of rows changed by the last statement.
    fn execute(&mut self, sql: &str) -> Result<u64>;
}

/// Executes SQL that returns rows.
pub trait Queryer {
    /// Run the first statement in `sql` and collect its rows.
    fn query(&mut self, sql: &str) -> Result<Rows>;
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    #[inline]
    fn open(&self, name: &str) -> Result<Box<dyn Connection>> {
        (**self).open(name)
    }
}

impl<D: Driver + ?Sized> Driver for std::sync::Arc<D> {
    #[inline]
    fn open(&self, name: &str) -> Result<Box<dyn Connection>> {
        (**self).open(name)
    }
}
