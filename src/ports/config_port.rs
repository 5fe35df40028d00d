//! Configuration access port trait.

use crate::domain::error::QuantdashError;

/// Typed lookups over a sectioned key/value store.
///
/// Numeric getters return `Ok(None)` for a missing key and
/// [`QuantdashError::ConfigInvalid`] for a value that is present but does not
/// parse as a finite number.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, QuantdashError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, QuantdashError>;
}
