use std::{fmt, io};

/// Library error.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Box<Error>>,
}

impl Error {
    pub(crate) fn from_code(code: i32, message: Option<String>) -> Self {
        Self {
            kind: ErrorKind::from_code(code),
            message: message.unwrap_or_else(|| ErrorKind::from_code(code).to_string()),
            source: None,
        }
    }

    pub(crate) fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            source: None,
        }
    }

    pub(crate) fn background_task_failed() -> Self {
        Self::new(ErrorKind::Generic, String::from("background task failed"))
    }

    /// The setup statement could not be applied to a freshly opened
    /// connection. The cause is kept as the error source.
    pub(crate) fn setup_failed(cause: Error) -> Self {
        Self {
            kind: ErrorKind::SetupFailed,
            message: format!(
                "could not enable the required session setting: {}",
                cause.message()
            ),
            source: Some(Box::new(cause)),
        }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message of the error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error that caused this one, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.source.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite error: {} ({})", self.kind(), self.message())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<Error> for io::Error {
    fn from(v: Error) -> io::Error {
        io::Error::new(v.kind.into(), v)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.to_string(),
            source: None,
        }
    }
}

macro_rules! error_kind {
    (
        $(
            $(#[doc = $doc:expr])*
            #[message = $message:expr]
            $(#[io = $error_kind:ident])?
            $variant:ident $(= $code:ident)?,
        )*
    ) => {
        /// Library error kind.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum ErrorKind {
            $(
                $(#[doc = $doc])*
                $variant,
            )*
        }

        impl ErrorKind {
            /// Converts the error kind from a SQLite error code.
            pub const fn from_code(code: i32) -> Self {
                match code & 0xFF {
                    $(
                        $(libsqlite3_sys::$code => Self::$variant,)?
                    )*
                    _ => Self::Generic,
                }
            }

            /// Converts the error kind into a SQLite error code.
            pub const fn code(self) -> Option<i32> {
                match self {
                    $(
                        $(Self::$variant => Some(libsqlite3_sys::$code),)?
                    )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $(
                        Self::$variant => f.write_str($message),
                    )*
                }
            }
        }

        impl From<ErrorKind> for io::ErrorKind {
            fn from(v: ErrorKind) -> io::ErrorKind {
                match v {
                    $(
                        $(ErrorKind::$variant => io::ErrorKind::$error_kind,)?
                    )*
                    _ => io::ErrorKind::Other,
                }
            }
        }
    };
}

error_kind! {
    /// Generic error.
    #[message = "generic error"]
    Generic = SQLITE_ERROR,

    /// Internal library error.
    #[message = "internal malfunction"]
    InternalMalfunction = SQLITE_INTERNAL,

    /// Unable to access the database.
    #[message = "permission denied"]
    #[io = PermissionDenied]
    PermissionDenied = SQLITE_PERM,

    /// The operation has been aborted.
    #[message = "operation aborted"]
    #[io = Interrupted]
    OperationAborted = SQLITE_ABORT,

    /// Database is being used concurrently by the same process.
    #[message = "database busy"]
    DatabaseBusy = SQLITE_BUSY,

    /// Database is locked, usually because another process has opened it
    /// with read-write access.
    #[message = "database locked"]
    DatabaseLocked = SQLITE_LOCKED,

    /// Out of memory.
    #[message = "out of memory"]
    #[io = OutOfMemory]
    OutOfMemory = SQLITE_NOMEM,

    /// Tried to write to a database which is read only.
    #[message = "database is read only"]
    #[io = PermissionDenied]
    ReadOnly = SQLITE_READONLY,

    /// The operation has been interrupted.
    #[message = "operation interrupted"]
    #[io = Interrupted]
    OperationInterrupted = SQLITE_INTERRUPT,

    /// System I/O error.
    #[message = "i/o error"]
    SystemIoFailure = SQLITE_IOERR,

    /// Database is corrupted.
    #[message = "corrupted database"]
    #[io = InvalidData]
    DatabaseCorrupt = SQLITE_CORRUPT,

    /// Database was not found.
    #[message = "database not found"]
    #[io = NotFound]
    NotFound = SQLITE_NOTFOUND,

    /// Disk is full.
    #[message = "disk full"]
    DiskFull = SQLITE_FULL,

    /// Cannot open the database.
    #[message = "cannot open database"]
    CannotOpen = SQLITE_CANTOPEN,

    /// Error in the file locking protocol.
    #[message = "file locking protocol error"]
    FileLockingProtocolFailed = SQLITE_PROTOCOL,

    /// Schema has changed.
    #[message = "schema has changed"]
    #[io = InvalidData]
    SchemaChanged = SQLITE_SCHEMA,

    /// String or blob is too large.
    #[message = "string or blob is too large"]
    #[io = InvalidData]
    TooLarge = SQLITE_TOOBIG,

    /// Constraint violation.
    #[message = "constraint violation"]
    #[io = InvalidData]
    ConstraintViolation = SQLITE_CONSTRAINT,

    /// Datatype mismatch.
    #[message = "datatype mismatch"]
    #[io = InvalidData]
    DatatypeMismatch = SQLITE_MISMATCH,

    /// Library has been misused.
    #[message = "library misuse"]
    #[io = InvalidInput]
    Misuse = SQLITE_MISUSE,

    /// No support for large files.
    #[message = "lfs not supported"]
    #[io = Unsupported]
    LfsUnsupported = SQLITE_NOLFS,

    /// Statement is not authorized.
    #[message = "unauthorized statement"]
    #[io = PermissionDenied]
    Unauthorized = SQLITE_AUTH,

    /// Out of range.
    #[message = "out of range"]
    #[io = InvalidInput]
    OutOfRange = SQLITE_RANGE,

    /// Not a database.
    #[message = "not a database"]
    #[io = NotFound]
    NotADatabase = SQLITE_NOTADB,

    /// Invalid path.
    #[message = "invalid database path"]
    #[io = InvalidInput]
    InvalidPath,

    /// A driver with the same name is already registered.
    #[message = "driver already registered"]
    #[io = AlreadyExists]
    DriverAlreadyRegistered,

    /// No driver is registered under the requested name.
    #[message = "unknown driver"]
    #[io = NotFound]
    DriverNotFound,

    /// The connection opened but its setup statement failed.
    #[message = "connection setup failed"]
    SetupFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn from_code_uses_primary_code() {
        let e = Error::from_code(libsqlite3_sys::SQLITE_CONSTRAINT_FOREIGNKEY, None);
        assert_eq!(e.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(e.message(), "constraint violation");
        assert!(e.source().is_none());
    }

    #[test]
    fn setup_failed_keeps_cause() {
        let cause = Error::new(ErrorKind::ReadOnly, "attempt to write a readonly database".into());
        let e = Error::setup_failed(cause);

        assert_eq!(e.kind(), ErrorKind::SetupFailed);
        assert!(e
            .message()
            .starts_with("could not enable the required session setting"));
        assert_eq!(e.cause().map(Error::kind), Some(ErrorKind::ReadOnly));

        let source = e.source().unwrap().downcast_ref::<Error>().unwrap();
        assert_eq!(source.message(), "attempt to write a readonly database");
    }

    #[test]
    fn code_round_trip() {
        assert_eq!(
            ErrorKind::ReadOnly.code(),
            Some(libsqlite3_sys::SQLITE_READONLY)
        );
        assert_eq!(
            ErrorKind::from_code(ErrorKind::ConstraintViolation.code().unwrap()),
            ErrorKind::ConstraintViolation
        );
        assert_eq!(ErrorKind::SetupFailed.code(), None);
        assert_eq!(ErrorKind::DriverNotFound.code(), None);
    }

    #[test]
    fn io_kind() {
        let e: io::Error = Error::from(ErrorKind::DriverAlreadyRegistered).into();
        assert_eq!(e.kind(), io::ErrorKind::AlreadyExists);
    }
}
