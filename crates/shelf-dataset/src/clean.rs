//! Dataset cleaning.
//!
//! The steps always run in the same order: deduplicate, coerce `Price`, drop
//! rows with a missing price, drop rows with a non positive price, trim
//! `Title`. Every step only removes or rewrites rows.

use std::collections::HashSet;

use csv::StringRecord;

use crate::codec::CsvConfig;
use crate::error::DatasetError;
use crate::record::{PRICE, TITLE};
use crate::store::{Store, StoreError};
use crate::table::Table;

pub const PREVIEW_ROWS: usize = 5;

/// Row counts collected while cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicates_removed: usize,
    /// Empty fields per column, after deduplication.
    pub missing_before: Vec<(String, usize)>,
    /// Same as `missing_before` once prices that don't parse count as missing.
    pub missing_after_coercion: Vec<(String, usize)>,
    pub unparseable_price_removed: usize,
    pub non_positive_price_removed: usize,
    pub blank_title_removed: usize,
    pub final_rows: usize,
    pub preview: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub report: CleaningReport,
}

pub fn clean(table: Table) -> Result<Cleaned, DatasetError> {
    let price_col = table
        .column(PRICE)
        .ok_or(DatasetError::MissingColumn(PRICE))?;
    let title_col = table
        .column(TITLE)
        .ok_or(DatasetError::MissingColumn(TITLE))?;
    let Table { headers, rows } = table;
    let input_rows = rows.len();

    // Duplicates

    let mut seen = HashSet::new();
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(row_key(row, price_col, title_col)))
        .collect::<Vec<_>>();
    let duplicates_removed = input_rows - rows.len();
    log::info!(
        "Removed {duplicates_removed} duplicate rows. New row count: {}",
        rows.len()
    );

    let missing_before = missing_counts(&headers, &rows);
    log::info!("Missing values before cleaning: {}", format_counts(&missing_before));

    // Price coercion

    let coerced = rows
        .into_iter()
        .map(|row| {
            let price = row.get(price_col).and_then(coerce_price);
            (row, price)
        })
        .collect::<Vec<_>>();

    let mut missing_after_coercion = missing_before.clone();
    if let Some((_, count)) = missing_after_coercion.get_mut(price_col) {
        *count = coerced.iter().filter(|(_, price)| price.is_none()).count();
    }
    log::info!(
        "Missing values after coercing '{PRICE}': {}",
        format_counts(&missing_after_coercion)
    );

    let before = coerced.len();
    let priced = coerced
        .into_iter()
        .filter_map(|(row, price)| price.map(|price| (row, price)))
        .collect::<Vec<_>>();
    let unparseable_price_removed = before - priced.len();
    if unparseable_price_removed > 0 {
        log::info!("Removed {unparseable_price_removed} rows due to unparseable '{PRICE}' values.");
    }

    let before = priced.len();
    let priced = priced
        .into_iter()
        .filter(|(_, price)| *price > 0.0)
        .collect::<Vec<_>>();
    let non_positive_price_removed = before - priced.len();
    log::info!(
        "Removed {non_positive_price_removed} rows with {PRICE} <= 0. New row count: {}",
        priced.len()
    );

    // Title

    let before = priced.len();
    let rows = priced
        .into_iter()
        .map(|(row, price)| rewrite(&row, price_col, price, title_col))
        .filter(|row| row.get(title_col).is_some_and(|title| !title.is_empty()))
        .collect::<Vec<_>>();
    let blank_title_removed = before - rows.len();
    log::info!("Applied text cleaning (strip whitespace) to '{TITLE}' column.");
    if blank_title_removed > 0 {
        log::info!("Removed {blank_title_removed} rows with a blank '{TITLE}'.");
    }

    let preview = rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| row.iter().map(String::from).collect())
        .collect::<Vec<Vec<String>>>();
    log::info!("Data cleaning complete. First {} rows of cleaned data:", preview.len());
    for row in &preview {
        log::info!("  {}", row.join(" | "));
    }
    log::info!("Final cleaned data rows: {}", rows.len());

    let report = CleaningReport {
        input_rows,
        duplicates_removed,
        missing_before,
        missing_after_coercion,
        unparseable_price_removed,
        non_positive_price_removed,
        blank_title_removed,
        final_rows: rows.len(),
        preview,
    };

    Ok(Cleaned {
        table: Table::new(headers, rows),
        report,
    })
}

/// Reads `source` from `store`, cleans it and writes the result to `target`,
/// overwriting whatever was there.
pub async fn clean_stored<S>(
    store: &S,
    source: &str,
    target: &str,
    config: &CsvConfig,
) -> Result<CleaningReport, DatasetError>
where
    S: Store,
{
    let data = store.get(source).await.map_err(|e| match e {
        StoreError::NotFound(location) => DatasetError::SourceNotFound(location),
        e => e.into(),
    })?;

    let table = Table::from_csv(&data, config)?;
    log::info!(
        "Successfully read {} rows from {}.",
        table.len(),
        store.locate(source)
    );

    let Cleaned { table, report } = clean(table)?;
    store.put(target, table.to_csv(config)?, "text/csv").await?;
    log::info!("Cleaned data successfully saved to {}", store.locate(target));

    Ok(report)
}

/// Parses a price field, empty and non finite values are missing.
pub fn coerce_price(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

/// Shortest representation that parses back to the same value (`12.0`, `12.99`).
pub fn format_price(price: f64) -> String {
    format!("{price:?}")
}

// Rows are compared the way later steps will write them, so a cleaned dataset
// has no duplicates left for a second pass to find.
fn row_key(row: &StringRecord, price_col: usize, title_col: usize) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, field)| match i {
            i if i == price_col => coerce_price(field)
                .map(format_price)
                .unwrap_or_else(|| field.to_string()),
            i if i == title_col => field.trim().to_string(),
            _ => field.to_string(),
        })
        .collect()
}

fn rewrite(row: &StringRecord, price_col: usize, price: f64, title_col: usize) -> StringRecord {
    row.iter()
        .enumerate()
        .map(|(i, field)| match i {
            i if i == price_col => format_price(price),
            i if i == title_col => field.trim().to_string(),
            _ => field.to_string(),
        })
        .collect()
}

fn missing_counts(headers: &StringRecord, rows: &[StringRecord]) -> Vec<(String, usize)> {
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let missing = rows
                .iter()
                .filter(|row| row.get(i).map_or(true, str::is_empty))
                .count();
            (name.to_string(), missing)
        })
        .collect()
}

fn format_counts(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{name}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_coerce_like_numbers() {
        assert_eq!(coerce_price("12.99"), Some(12.99));
        assert_eq!(coerce_price(" 7 "), Some(7.0));
        assert_eq!(coerce_price("1e2"), Some(100.0));
        assert_eq!(coerce_price(""), None);
        assert_eq!(coerce_price("oops"), None);
        assert_eq!(coerce_price("NaN"), None);
        assert_eq!(coerce_price("inf"), None);
    }

    #[test]
    fn prices_format_in_float_form() {
        assert_eq!(format_price(12.99), "12.99");
        assert_eq!(format_price(12.0), "12.0");
        assert_eq!(coerce_price(&format_price(0.1 + 0.2)), Some(0.1 + 0.2));
    }
}
