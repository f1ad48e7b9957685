//! Recognized attribute keys and data type values.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys of the public namespace.
pub mod public {
    pub const TITLE: &str = "title";
    pub const KEY_TYPE: &str = "keyType";
    pub const DATA_TYPE: &str = "dataType";
    pub const PROJECTION: &str = "projection";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";

    pub const ALL: [&str; 6] = [TITLE, KEY_TYPE, DATA_TYPE, PROJECTION, MIN, MAX];
}

/// Keys of the private namespace.
pub mod private {
    /// Connection name used to retrieve data. Never sent to clients.
    pub const CONNECTION: &str = "connection";
    pub const SQL_SCHEMA: &str = "sqlSchema";
    pub const SQL_TABLE: &str = "sqlTable";
    pub const SQL_COLUMN: &str = "sqlColumn";
    /// Query used to retrieve data. Never sent to clients.
    pub const SQL_QUERY: &str = "sqlQuery";
    /// Only flows from client to server; never stored.
    pub const SQL_PARAMS: &str = "sqlParams";
    /// Only flows from server to client; never stored.
    pub const SQL_RESULT: &str = "sqlResult";
    /// Used for geometry columns.
    pub const SQL_TABLE_PREFIX: &str = "sqlTablePrefix";
    pub const FILE_NAME: &str = "fileName";
    pub const KEY_COLUMN: &str = "keyColumn";

    pub const ALL: [&str; 10] = [
        CONNECTION,
        SQL_SCHEMA,
        SQL_TABLE,
        SQL_COLUMN,
        SQL_QUERY,
        SQL_PARAMS,
        SQL_RESULT,
        SQL_TABLE_PREFIX,
        FILE_NAME,
        KEY_COLUMN,
    ];

    /// Keys accepted on write paths but never persisted.
    pub fn is_transient(key: &str) -> bool {
        key == SQL_PARAMS || key == SQL_RESULT
    }

    /// Keys that are never exposed outside the trusted boundary.
    pub fn is_secret(key: &str) -> bool {
        key == CONNECTION || key == SQL_QUERY
    }
}

/// Values of the public `dataType` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Number,
    String,
    Geometry,
}

impl DataType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Geometry => "geometry",
        }
    }

    /// Maps a SQL column type name to the data type clients should expect.
    ///
    /// Integer, decimal and floating point types are numbers; everything
    /// else is treated as a string. Length/precision suffixes such as
    /// `DECIMAL(10,2)` are ignored.
    pub fn from_sql_type(sql_type: &str) -> Self {
        let base = sql_type
            .split(['(', ' '])
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match base.as_str() {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "DECIMAL"
            | "NUMERIC" | "FLOAT" | "DOUBLE" | "REAL" => DataType::Number,
            _ => DataType::String,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(DataType::Number),
            "string" => Ok(DataType::String),
            "geometry" => Ok(DataType::Geometry),
            other => Err(ModelError::UnknownDataType(other.to_string())),
        }
    }
}
