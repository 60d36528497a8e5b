use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::Read,
    path::Path,
};

use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Number, Value};

use crate::{
    errors::DashboardError,
    models::schema::{classify, TableName},
};

/// A single typed CSV cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            Cell::Missing
        } else if let Ok(i) = raw.parse::<i64>() {
            Cell::Integer(i)
        } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Cell::Float(f)
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Missing => Value::Null,
            Cell::Integer(i) => Value::from(*i),
            Cell::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Parsed content of an uploaded CSV file. Every row has one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Data import from a `.csv` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(DashboardError::UnsupportedFile(format!(
                "{} n'est pas un fichier .csv",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            dataset.len(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DashboardError> {
        let mut rdr = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

        let columns = unique_columns(rdr.headers()?.iter());

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(Cell::parse).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn classify(&self) -> Option<TableName> {
        classify(&self.columns)
    }

    /// One JSON object per row, keyed by column name.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(Cell::to_json))
                    .collect();
                Value::Object(record)
            })
            .collect()
    }
}

/// Header names with repeats renamed `name.1`, `name.2`, ... so that every
/// column keeps its own key in the upload records.
fn unique_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut taken: HashSet<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    headers
        .iter()
        .map(|&header| {
            if seen.insert(header) {
                return header.to_string();
            }
            let count = counts.entry(header).or_insert(0);
            let renamed = loop {
                *count += 1;
                let candidate = format!("{}.{}", header, count);
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            log::warn!("Duplicate column '{}' renamed to '{}'", header, renamed);
            taken.insert(renamed.clone());
            renamed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    const SELLS_CSV: &str = "Date,ID Référence produit,Quantité,ID Magasin\n\
                             2023-05-01,REF001,3,1\n\
                             2023-05-01,REF002, 5 ,2\n";

    #[test]
    fn test_cell_typing() {
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("42"), Cell::Integer(42));
        assert_eq!(Cell::parse("-3"), Cell::Integer(-3));
        assert_eq!(Cell::parse("12.5"), Cell::Float(12.5));
        assert_eq!(Cell::parse("REF001"), Cell::Text("REF001".to_string()));
        assert_eq!(Cell::parse("2023-05-01"), Cell::Text("2023-05-01".to_string()));
        assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".to_string()));
    }

    #[test]
    fn test_from_reader() {
        let dataset = Dataset::from_reader(SELLS_CSV.as_bytes()).unwrap();

        assert_eq!(dataset.columns().len(), 4);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[1][2], Cell::Integer(5));
        assert_eq!(dataset.classify(), Some(TableName::Sells));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let csv = "ID Magasin,Ville\n1,Paris\n2\n";
        let result = Dataset::from_reader(csv.as_bytes());
        assert!(matches!(result, Err(DashboardError::Csv(_))));
    }

    #[test]
    fn test_to_records() {
        let csv = "ID Référence produit,Prix\nREF001,12.5\nREF002,\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(
            dataset.to_records(),
            vec![
                json!({"ID Référence produit": "REF001", "Prix": 12.5}),
                json!({"ID Référence produit": "REF002", "Prix": null}),
            ]
        );
    }

    #[test]
    fn test_duplicate_columns_keep_their_values() {
        let csv = "ID Magasin,Ville,Ville,Ville.1\n1,Paris,Lyon,Nice\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.columns(), ["ID Magasin", "Ville", "Ville.2", "Ville.1"]);
        assert_eq!(
            dataset.to_records(),
            vec![json!({"ID Magasin": 1, "Ville": "Paris", "Ville.2": "Lyon", "Ville.1": "Nice"})]
        );
        assert_eq!(dataset.classify(), Some(TableName::Shops));
    }

    #[test]
    fn test_header_names_are_not_trimmed() {
        let csv = "ID Magasin, Ville\n1, Paris \n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.columns(), ["ID Magasin", " Ville"]);
        assert_eq!(dataset.rows()[0][1], Cell::Text("Paris".to_string()));
        assert_eq!(dataset.classify(), None);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".CSV").tempfile().unwrap();
        write!(file, "ID Magasin,Ville\n1,Paris\n2,Lyon\n").unwrap();

        let dataset = Dataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.classify(), Some(TableName::Shops));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_from_path_rejects_other_extensions() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = Dataset::from_path(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFile(_)));
        assert!(
            err.to_string().starts_with("Fichier non pris en charge: "),
            "{}",
            err
        );
    }

    #[test]
    fn test_missing_file() {
        let result = Dataset::from_path("/nonexistent/dir/sales.csv");
        assert!(matches!(result, Err(DashboardError::Io(_))));
    }
}
