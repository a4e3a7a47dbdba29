use crate::{
    driver,
    sqlite::{Statement, Step},
    value::Rows,
    Error, ErrorKind, Result,
};
use std::{
    ffi::{c_char, CStr},
    mem::ManuallyDrop,
    ptr::{self, NonNull},
};

pub(super) struct ConnectionHandle {
    inner: NonNull<libsqlite3_sys::sqlite3>,
}

impl ConnectionHandle {
    pub(super) fn last_error(&self) -> Error {
        let error = unsafe { libsqlite3_sys::sqlite3_errcode(self.get()) };
        let error_message = unsafe { libsqlite3_sys::sqlite3_errmsg(self.get()) };

        let error_message = if !error_message.is_null() {
            Some(unsafe { CStr::from_ptr(error_message).to_string_lossy().into() })
        } else {
            None
        };
        Error::from_code(error, error_message)
    }

    fn get(&self) -> *mut libsqlite3_sys::sqlite3 {
        self.inner.as_ptr()
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        let r = unsafe { libsqlite3_sys::sqlite3_close(self.get()) };

        debug_assert_eq!(r, 0);
    }
}

/// A connection opened by [`SqliteDriver`](crate::SqliteDriver).
///
/// Supports both [`Execer`](driver::Execer) and
/// [`Queryer`](driver::Queryer).
pub struct SqliteConnection {
    handle: ConnectionHandle,
}

// Opened with `SQLITE_OPEN_NOMUTEX`: the handle may move between threads as
// long as only one thread uses it at a time, which `&mut self` guarantees.
unsafe impl Send for SqliteConnection {}

impl SqliteConnection {
    pub(super) fn open(path: &CStr, flags: i32) -> Result<Self> {
        let mut handle = ptr::null_mut();
        let result = unsafe {
            libsqlite3_sys::sqlite3_open_v2(path.as_ptr(), &mut handle, flags, ptr::null())
        };
        let handle = NonNull::new(handle).ok_or(ErrorKind::OutOfMemory)?;

        let connection = Self {
            handle: ConnectionHandle { inner: handle },
        };

        if result != libsqlite3_sys::SQLITE_OK {
            let error = connection.handle.last_error();
            return Err(error);
        }

        Ok(connection)
    }

    /// Execute every statement in `sql`, returning the number of rows
    /// changed by the last one.
    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        check_sql(sql)?;

        let mut rest = sql;
        let mut changes = 0;
        while let Some((mut statement, consumed)) = self.prepare(rest)? {
            while statement.step()? == Step::Row {}
            drop(statement);

            changes = self.changes();
            rest = rest.get(consumed..).unwrap_or_default();
        }
        Ok(changes)
    }

    /// Run the first statement in `sql` and collect all of its rows.
    pub fn query(&mut self, sql: &str) -> Result<Rows> {
        check_sql(sql)?;

        let Some((mut statement, _)) = self.prepare(sql)? else {
            return Ok(Rows::default());
        };

        let mut rows = Rows {
            columns: statement.column_names(),
            rows: Vec::new(),
        };
        while statement.step()? == Step::Row {
            rows.rows.push(statement.row()?);
        }
        Ok(rows)
    }

    /// Row id of the last successful insert.
    pub fn last_insert_row_id(&self) -> i64 {
        unsafe { libsqlite3_sys::sqlite3_last_insert_rowid(self.handle.get()) }
    }

    /// Rows changed since the connection was opened.
    pub fn total_changes(&self) -> u64 {
        unsafe {
            libsqlite3_sys::sqlite3_total_changes(self.handle.get())
                .try_into()
                .unwrap_or(0)
        }
    }

    /// Close the connection.
    ///
    /// Dropping the connection closes it too, but ignores errors.
    pub fn close(self) -> Result<()> {
        let handle = ManuallyDrop::new(self.handle);
        // Statements borrow the connection, so none is left unfinalized here.
        match unsafe { libsqlite3_sys::sqlite3_close(handle.get()) } {
            libsqlite3_sys::SQLITE_OK => Ok(()),
            _ => Err(handle.last_error()),
        }
    }

    /// Prepares the first statement of `sql`.
    ///
    /// Returns the statement and the number of bytes consumed, or `None` if
    /// `sql` holds nothing but whitespace and comments.
    fn prepare(&self, sql: &str) -> Result<Option<(Statement<'_>, usize)>> {
        let mut handle = ptr::null_mut();
        let mut sql_tail: *const c_char = ptr::null();
        match unsafe {
            libsqlite3_sys::sqlite3_prepare_v2(
                self.handle.get(),
                sql.as_ptr().cast(),
                sql.len().try_into().map_err(|_| ErrorKind::OutOfRange)?,
                &mut handle,
                &mut sql_tail,
            )
        } {
            libsqlite3_sys::SQLITE_OK => {}
            _ => return Err(self.handle.last_error()),
        }

        let Some(statement) = NonNull::new(handle) else {
            return Ok(None);
        };
        let consumed = unsafe { sql_tail.offset_from(sql.as_ptr().cast()) };
        let statement = unsafe { Statement::from(statement, &self.handle) };

        Ok(Some((statement, consumed.try_into().unwrap_or(sql.len()))))
    }

    fn changes(&self) -> u64 {
        unsafe {
            libsqlite3_sys::sqlite3_changes(self.handle.get())
                .try_into()
                .unwrap_or(0)
        }
    }
}

/// SQLite stops reading SQL at a NUL byte, which would drop the rest of the
/// string without an error.
fn check_sql(sql: &str) -> Result<()> {
    if sql.contains('\0') {
        return Err(Error::new(
            ErrorKind::Misuse,
            "sql must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

impl driver::Connection for SqliteConnection {
    #[inline]
    fn as_execer(&mut self) -> Option<&mut dyn driver::Execer> {
        Some(self)
    }

    #[inline]
    fn as_queryer(&mut self) -> Option<&mut dyn driver::Queryer> {
        Some(self)
    }

    #[inline]
    fn close(self: Box<Self>) -> Result<()> {
        SqliteConnection::close(*self)
    }
}

impl driver::Execer for SqliteConnection {
    #[inline]
    fn execute(&mut self, sql: &str) -> Result<u64> {
        SqliteConnection::execute(self, sql)
    }
}

impl driver::Queryer for SqliteConnection {
    #[inline]
    fn query(&mut self, sql: &str) -> Result<Rows> {
        SqliteConnection::query(self, sql)
    }
}
