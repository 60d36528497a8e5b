use std::fmt;

use serde_json::Value;

use crate::{
    errors::DashboardError,
    models::reports::{
        decode_rows, AggregateRow, ReportRecord, SellsByProduct, SellsByShop,
        SellsByShopByProduct, SellsValueByProduct, SellsValueByShop, SellsValueByShopByProduct,
    },
};

/// Units sold ("Volume") or turnover in euros ("Valeur").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    Volume,
    Value,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 2] = [AnalysisMode::Volume, AnalysisMode::Value];

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Volume => "Volume",
            AnalysisMode::Value => "Valeur",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            AnalysisMode::Volume => AnalysisMode::Value,
            AnalysisMode::Value => AnalysisMode::Volume,
        }
    }

    pub fn headline_title(&self) -> &'static str {
        match self {
            AnalysisMode::Volume => "Volume Total",
            AnalysisMode::Value => "Chiffre d'Affaires Total",
        }
    }

    pub fn town_title(&self) -> &'static str {
        match self {
            AnalysisMode::Volume => "Volume Total",
            AnalysisMode::Value => "Chiffre d'Affaires",
        }
    }

    /// Total with its unit, e.g. `1,234 unités` or `1,234.50 €`.
    pub fn format_total(&self, total: f64) -> String {
        match self {
            AnalysisMode::Volume => format!("{} unités", format_grouped(total, 0)),
            AnalysisMode::Value => format!("{} €", format_grouped(total, 2)),
        }
    }

    /// Table cell for a row total; missing values render as `-`.
    pub fn format_cell(&self, total: Option<f64>) -> String {
        match (self, total) {
            (_, None) => "-".to_string(),
            (AnalysisMode::Volume, Some(v)) => format_grouped(v, 0),
            (AnalysisMode::Value, Some(v)) => format_grouped(v, 2),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    ByShop,
    ByProduct,
    ByShopByProduct,
}

/// Read endpoint for a mode and breakdown.
pub fn endpoint(mode: AnalysisMode, breakdown: Breakdown) -> &'static str {
    match (mode, breakdown) {
        (AnalysisMode::Volume, Breakdown::ByShop) => "/sellsbyshop",
        (AnalysisMode::Value, Breakdown::ByShop) => "/sellsvaluebyshop",
        (AnalysisMode::Volume, Breakdown::ByProduct) => "/sellsbyproduct",
        (AnalysisMode::Value, Breakdown::ByProduct) => "/sellsvaluebyproduct",
        (AnalysisMode::Volume, Breakdown::ByShopByProduct) => "/sellsbyshopbyproduct",
        (AnalysisMode::Value, Breakdown::ByShopByProduct) => "/sellsvaluebyshopbyproduct",
    }
}

/// Dimension used to label chart bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelBy {
    Product,
    Town,
}

/// Decoded rows of one endpoint and the figures derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub mode: AnalysisMode,
    pub breakdown: Breakdown,
    pub rows: Vec<AggregateRow>,
}

impl Report {
    pub fn decode(
        mode: AnalysisMode,
        breakdown: Breakdown,
        raw: Vec<Value>,
    ) -> Result<Self, DashboardError> {
        use AnalysisMode as M;
        use Breakdown as B;

        let rows = match (mode, breakdown) {
            (M::Volume, B::ByShop) => decode_rows::<SellsByShop>(raw),
            (M::Value, B::ByShop) => decode_rows::<SellsValueByShop>(raw),
            (M::Volume, B::ByProduct) => decode_rows::<SellsByProduct>(raw),
            (M::Value, B::ByProduct) => decode_rows::<SellsValueByProduct>(raw),
            (M::Volume, B::ByShopByProduct) => decode_rows::<SellsByShopByProduct>(raw),
            (M::Value, B::ByShopByProduct) => decode_rows::<SellsValueByShopByProduct>(raw),
        }
        .map_err(|e| DashboardError::Decode(format!("{}: {}", endpoint(mode, breakdown), e)))?;

        Ok(Self {
            mode,
            breakdown,
            rows,
        })
    }

    /// Column headers in wire order.
    pub fn columns(&self) -> &'static [&'static str] {
        use AnalysisMode as M;
        use Breakdown as B;

        match (self.mode, self.breakdown) {
            (M::Volume, B::ByShop) => SellsByShop::COLUMNS,
            (M::Value, B::ByShop) => SellsValueByShop::COLUMNS,
            (M::Volume, B::ByProduct) => SellsByProduct::COLUMNS,
            (M::Value, B::ByProduct) => SellsValueByProduct::COLUMNS,
            (M::Volume, B::ByShopByProduct) => SellsByShopByProduct::COLUMNS,
            (M::Value, B::ByShopByProduct) => SellsValueByShopByProduct::COLUMNS,
        }
    }

    /// Sum of present totals. Value totals are rounded to cents.
    pub fn total(&self) -> f64 {
        let sum: f64 = self.rows.iter().filter_map(|row| row.total).sum();
        match self.mode {
            AnalysisMode::Volume => sum,
            AnalysisMode::Value => (sum * 100.0).round() / 100.0,
        }
    }

    /// Distinct towns in first-appearance order.
    pub fn towns(&self) -> Vec<&str> {
        let mut towns: Vec<&str> = Vec::new();
        for town in self.rows.iter().filter_map(|row| row.town.as_deref()) {
            if !towns.contains(&town) {
                towns.push(town);
            }
        }
        towns
    }

    pub fn for_town(&self, town: &str) -> Report {
        Report {
            mode: self.mode,
            breakdown: self.breakdown,
            rows: self
                .rows
                .iter()
                .filter(|row| row.town.as_deref() == Some(town))
                .cloned()
                .collect(),
        }
    }

    /// Index of the row with the largest total, first one on ties.
    pub fn max_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, total) in self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.total.map(|t| (i, t)))
        {
            match best {
                Some((_, current)) if total <= current => {}
                _ => best = Some((i, total)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Totals summed per label, in first-appearance order. Rows without a
    /// total or without the label are skipped.
    pub fn series(&self, label_by: LabelBy) -> Vec<(String, f64)> {
        let mut series: Vec<(String, f64)> = Vec::new();
        for row in &self.rows {
            let label = match label_by {
                LabelBy::Product => row.product_reference.as_deref(),
                LabelBy::Town => row.town.as_deref(),
            };
            let (Some(label), Some(total)) = (label, row.total) else {
                continue;
            };
            match series.iter_mut().find(|(l, _)| l == label) {
                Some((_, sum)) => *sum += total,
                None => series.push((label.to_string(), total)),
            }
        }
        series
    }

    /// Share of the grand total per label, in percent. Empty when the grand
    /// total is not positive.
    pub fn shares(&self, label_by: LabelBy) -> Vec<(String, f64)> {
        let series = self.series(label_by);
        let grand_total: f64 = series.iter().map(|(_, v)| v).sum();
        if grand_total <= 0.0 {
            return Vec::new();
        }
        series
            .into_iter()
            .map(|(label, value)| (label, value * 100.0 / grand_total))
            .collect()
    }
}

/// Formats `value` with `decimals` places and `,` between thousands.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match decimal_part {
        Some(d) => format!("{}{}.{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}
