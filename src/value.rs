/// A dynamically typed SQLite value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `NULL`.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// 64-bit float.
    Real(f64),

    /// UTF-8 text.
    Text(String),

    /// Binary data.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Self::Integer(x) => Some(x),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(x) => Some(x),
            _ => None,
        }
    }
}

/// Rows returned by a query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rows {
    /// Column names, in order.
    pub columns: Vec<String>,

    /// Row values, each with one entry per column.
    pub rows: Vec<Vec<Value>>,
}

impl Rows {
    /// Value of the first column of the first row.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first()?.first()
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was returned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
