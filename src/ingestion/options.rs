//! Normalization options.
//!
//! [`NormalizeOptions`] controls how raw CSV cells are tokenized into missing markers and how
//! the datetime and numeric passes interpret them. Defaults reproduce the behavior of a
//! pandas `read_csv` + `to_datetime` + `to_numeric` loader.

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};

/// Cell tokens read as missing (pandas' default `na_values`, plus the empty string).
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Formats tried for cells carrying a time of day.
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Formats tried for date-only cells (interpreted at midnight).
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

/// What the numeric pass does with a text column in which no cell coerces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsedText {
    /// Leave the column as `Utf8` text.
    #[default]
    Keep,
    /// Degrade every cell to missing, so the column is dropped (pandas `errors='coerce'`).
    Drop,
}

/// Options controlling CSV tokenizing and column type coercion.
///
/// Use [`Default`] for common cases. Options can also be loaded from JSON; absent keys keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Exact cell contents read as missing.
    pub na_values: Vec<String>,
    /// `chrono` formats for datetime cells.
    pub datetime_formats: Vec<String>,
    /// `chrono` formats for date-only cells.
    pub date_formats: Vec<String>,
    /// Read numeric cells as nanoseconds since the Unix epoch during the datetime pass.
    pub numeric_epoch_dates: bool,
    /// Let the numeric pass reclassify datetime columns whose text is numeric.
    pub recoerce_datetime_as_numeric: bool,
    /// Treatment of text columns in which the numeric pass coerces nothing.
    pub unparsed_text: UnparsedText,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: to_owned(DEFAULT_NA_VALUES),
            datetime_formats: to_owned(DEFAULT_DATETIME_FORMATS),
            date_formats: to_owned(DEFAULT_DATE_FORMATS),
            numeric_epoch_dates: true,
            recoerce_datetime_as_numeric: true,
            unparsed_text: UnparsedText::Keep,
        }
    }
}

impl NormalizeOptions {
    /// Load options from a JSON document.
    ///
    /// ```
    /// use transaction_insights::ingestion::{NormalizeOptions, UnparsedText};
    ///
    /// let opts = NormalizeOptions::from_json_str(r#"{"delimiter": 59, "unparsed_text": "drop"}"#)?;
    /// assert_eq!(opts.delimiter, b';');
    /// assert_eq!(opts.unparsed_text, UnparsedText::Drop);
    /// assert!(opts.numeric_epoch_dates);
    /// # Ok::<(), transaction_insights::IngestionError>(())
    /// ```
    pub fn from_json_str(json: &str) -> IngestionResult<Self> {
        serde_json::from_str(json).map_err(|e| IngestionError::Config {
            message: e.to_string(),
        })
    }

    /// Whether a raw cell is a missing marker.
    pub fn is_na(&self, raw: &str) -> bool {
        raw.is_empty() || self.na_values.iter().any(|na| na == raw)
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
