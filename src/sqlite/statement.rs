use crate::{sqlite::ConnectionHandle, value::Value, Error, ErrorKind, Result};
use core::str;
use std::{
    ffi::{c_int, CStr},
    ptr::NonNull,
    slice,
};

pub(super) struct Statement<'c> {
    handle: NonNull<libsqlite3_sys::sqlite3_stmt>,

    connection: &'c ConnectionHandle,
}

impl<'c> Statement<'c> {
    /// # Safety
    ///
    /// `handle` must be a prepared statement of `connection`.
    pub(super) unsafe fn from(
        handle: NonNull<libsqlite3_sys::sqlite3_stmt>,
        connection: &'c ConnectionHandle,
    ) -> Self {
        Self { handle, connection }
    }

    /// Steps.
    pub(super) fn step(&mut self) -> Result<Step> {
        match unsafe { libsqlite3_sys::sqlite3_step(self.handle()) } {
            libsqlite3_sys::SQLITE_ROW => Ok(Step::Row),
            libsqlite3_sys::SQLITE_DONE => Ok(Step::Done),
            _ => Err(self.connection.last_error()),
        }
    }

    pub(super) fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .map(|idx| {
                let name = unsafe { libsqlite3_sys::sqlite3_column_name(self.handle(), idx) };
                if name.is_null() {
                    String::new()
                } else {
                    unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
                }
            })
            .collect()
    }

    /// Reads the current row. Only valid after [`Step::Row`].
    pub(super) fn row(&self) -> Result<Vec<Value>> {
        (0..self.column_count()).map(|idx| self.get(idx)).collect()
    }

    fn column_count(&self) -> c_int {
        unsafe { libsqlite3_sys::sqlite3_column_count(self.handle()) }
    }

    fn get(&self, idx: c_int) -> Result<Value> {
        match unsafe { libsqlite3_sys::sqlite3_column_type(self.handle(), idx) } {
            libsqlite3_sys::SQLITE_INTEGER => Ok(Value::Integer(unsafe {
                libsqlite3_sys::sqlite3_column_int64(self.handle(), idx)
            })),
            libsqlite3_sys::SQLITE_FLOAT => Ok(Value::Real(unsafe {
                libsqlite3_sys::sqlite3_column_double(self.handle(), idx)
            })),
            libsqlite3_sys::SQLITE_TEXT => {
                let ptr = unsafe { libsqlite3_sys::sqlite3_column_text(self.handle(), idx) };
                let bytes = unsafe { self.column_bytes(ptr, idx)? };

                // If the text is not actually UTF-8, pretend it is a blob
                match str::from_utf8(bytes) {
                    Ok(x) => Ok(Value::Text(x.to_owned())),
                    Err(_) => Ok(Value::Blob(bytes.to_vec())),
                }
            }
            libsqlite3_sys::SQLITE_BLOB => {
                let ptr = unsafe { libsqlite3_sys::sqlite3_column_blob(self.handle(), idx) };
                let bytes = unsafe { self.column_bytes(ptr.cast(), idx)? };
                Ok(Value::Blob(bytes.to_vec()))
            }
            libsqlite3_sys::SQLITE_NULL => Ok(Value::Null),
            _ => Err(Error::new(
                ErrorKind::DatatypeMismatch,
                "invalid data type".to_string(),
            )),
        }
    }

    /// # Safety
    ///
    /// `ptr` must come from `sqlite3_column_text` or `sqlite3_column_blob`
    /// for column `idx` of the current row.
    unsafe fn column_bytes(&self, ptr: *const u8, idx: c_int) -> Result<&[u8]> {
        if ptr.is_null() {
            return Ok(&[]);
        }

        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(self.handle(), idx) };
        let size = usize::try_from(size).map_err(|_| ErrorKind::OutOfRange)?;

        Ok(unsafe { slice::from_raw_parts(ptr, size) })
    }

    fn handle(&self) -> *mut libsqlite3_sys::sqlite3_stmt {
        self.handle.as_ptr()
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        // The return value repeats the last step error, which was already
        // reported.
        unsafe { libsqlite3_sys::sqlite3_finalize(self.handle()) };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) enum Step {
    Done,
    Row,
}
