use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Normalized form shared by all six aggregate records. Each record is decoded
/// positionally from one inner array of the endpoint's JSON answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub town: Option<String>,
    pub shop_id: Option<String>,
    pub product_reference: Option<String>,
    pub total: Option<f64>,
}

pub trait ReportRecord: DeserializeOwned + Into<AggregateRow> {
    /// Column names in wire order.
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsByShop {
    #[serde(deserialize_with = "identifier")]
    pub town: String,
    #[serde(deserialize_with = "identifier")]
    pub shop_id: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsValueByShop {
    #[serde(deserialize_with = "identifier")]
    pub town: String,
    #[serde(deserialize_with = "identifier")]
    pub shop_id: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsByProduct {
    #[serde(deserialize_with = "identifier")]
    pub product_reference: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsValueByProduct {
    #[serde(deserialize_with = "identifier")]
    pub product_reference: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsByShopByProduct {
    #[serde(deserialize_with = "identifier")]
    pub town: String,
    #[serde(deserialize_with = "identifier")]
    pub shop_id: String,
    #[serde(deserialize_with = "identifier")]
    pub product_reference: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SellsValueByShopByProduct {
    #[serde(deserialize_with = "identifier")]
    pub town: String,
    #[serde(deserialize_with = "identifier")]
    pub shop_id: String,
    #[serde(deserialize_with = "identifier")]
    pub product_reference: String,
    #[serde(deserialize_with = "lenient_total")]
    pub total_value: Option<f64>,
}

impl ReportRecord for SellsByShop {
    const COLUMNS: &'static [&'static str] = &["town", "shop_id", "total_quantity"];
}

impl ReportRecord for SellsValueByShop {
    const COLUMNS: &'static [&'static str] = &["town", "shop_id", "total_value"];
}

impl ReportRecord for SellsByProduct {
    const COLUMNS: &'static [&'static str] = &["product_reference", "total_quantity"];
}

impl ReportRecord for SellsValueByProduct {
    const COLUMNS: &'static [&'static str] = &["product_reference", "total_value"];
}

impl ReportRecord for SellsByShopByProduct {
    const COLUMNS: &'static [&'static str] =
        &["town", "shop_id", "product_reference", "total_quantity"];
}

impl ReportRecord for SellsValueByShopByProduct {
    const COLUMNS: &'static [&'static str] =
        &["town", "shop_id", "product_reference", "total_value"];
}

impl From<SellsByShop> for AggregateRow {
    fn from(row: SellsByShop) -> Self {
        AggregateRow {
            town: Some(row.town),
            shop_id: Some(row.shop_id),
            product_reference: None,
            total: row.total_quantity,
        }
    }
}

impl From<SellsValueByShop> for AggregateRow {
    fn from(row: SellsValueByShop) -> Self {
        AggregateRow {
            town: Some(row.town),
            shop_id: Some(row.shop_id),
            product_reference: None,
            total: row.total_value,
        }
    }
}

impl From<SellsByProduct> for AggregateRow {
    fn from(row: SellsByProduct) -> Self {
        AggregateRow {
            town: None,
            shop_id: None,
            product_reference: Some(row.product_reference),
            total: row.total_quantity,
        }
    }
}

impl From<SellsValueByProduct> for AggregateRow {
    fn from(row: SellsValueByProduct) -> Self {
        AggregateRow {
            town: None,
            shop_id: None,
            product_reference: Some(row.product_reference),
            total: row.total_value,
        }
    }
}

impl From<SellsByShopByProduct> for AggregateRow {
    fn from(row: SellsByShopByProduct) -> Self {
        AggregateRow {
            town: Some(row.town),
            shop_id: Some(row.shop_id),
            product_reference: Some(row.product_reference),
            total: row.total_quantity,
        }
    }
}

impl From<SellsValueByShopByProduct> for AggregateRow {
    fn from(row: SellsValueByShopByProduct) -> Self {
        AggregateRow {
            town: Some(row.town),
            shop_id: Some(row.shop_id),
            product_reference: Some(row.product_reference),
            total: row.total_value,
        }
    }
}

/// Decodes every inner array as `R`. One malformed row rejects the response.
pub fn decode_rows<R: ReportRecord>(rows: Vec<Value>) -> Result<Vec<AggregateRow>, String> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            if !row.is_array() {
                return Err(format!("ligne {}: tableau attendu, reçu {}", i, row));
            }
            serde_json::from_value::<R>(row)
                .map(Into::into)
                .map_err(|e| format!("ligne {}: {}", i, e))
        })
        .collect()
}

fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "identifiant texte ou numérique attendu, reçu {}",
            other
        ))),
    }
}

/// Numbers and numeric strings are accepted, anything else becomes `None`.
fn lenient_total<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let total = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(total.filter(|v| v.is_finite()))
}
