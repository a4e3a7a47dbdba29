//! Base driver over `libsqlite3`.

mod connection;
mod driver;
mod statement;

use self::{
    connection::ConnectionHandle,
    statement::{Statement, Step},
};

pub use self::{connection::SqliteConnection, driver::SqliteDriver};
