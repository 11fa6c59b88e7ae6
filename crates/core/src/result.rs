//! Result type definition for tagsync operations.

use crate::error::Error;

/// The standard Result type for tagsync core operations.
///
/// Use the `?` operator, `match`, or combinator methods to handle results.
///
/// # Examples
///
/// ```ignore
/// fn load(path: &Path) -> Result<Inventory> {
///     let text = std::fs::read_to_string(path)
///         .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
///     serde_json::from_str(&text).map_err(|e| Error::json_parse_failed(e.to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
