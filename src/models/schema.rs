use std::fmt;

use serde::{Deserialize, Serialize};

/// Destination table of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Sells,
    Products,
    Shops,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Sells => "sells",
            TableName::Products => "products",
            TableName::Shops => "shops",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: TableName,
    pub required_columns: &'static [&'static str],
}

impl TableSchema {
    /// True when every required column is present in `columns`.
    pub fn is_satisfied_by<S: AsRef<str>>(&self, columns: &[S]) -> bool {
        self.required_columns
            .iter()
            .all(|required| columns.iter().any(|column| column.as_ref() == *required))
    }
}

/// Upload targets in evaluation order. The first satisfied schema wins.
pub const TABLE_SCHEMAS: [TableSchema; 3] = [
    TableSchema {
        table_name: TableName::Sells,
        required_columns: &["Date", "ID Référence produit", "Quantité", "ID Magasin"],
    },
    TableSchema {
        table_name: TableName::Products,
        required_columns: &["ID Référence produit", "Prix"],
    },
    TableSchema {
        table_name: TableName::Shops,
        required_columns: &["ID Magasin", "Ville"],
    },
];

/// Picks the destination table for a set of column names, or `None` when no
/// schema's required columns are all present.
pub fn classify<S: AsRef<str>>(columns: &[S]) -> Option<TableName> {
    TABLE_SCHEMAS
        .iter()
        .find(|schema| schema.is_satisfied_by(columns))
        .map(|schema| schema.table_name)
}
