//! Text input errors.

use crate::compute::NetworkError;
use crate::schema::ConfigError;

/// Error while reading one of the text input formats.
///
/// Every variant that comes from a specific line carries its 1-based number.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: `{value}` is not a valid {what}")]
    Number {
        line: usize,
        what: &'static str,
        value: String,
    },
    #[error("line {line}: {source}")]
    OutOfRange {
        line: usize,
        #[source]
        source: ConfigError,
    },
    #[error("line {line}: {source}")]
    Network {
        line: usize,
        #[source]
        source: NetworkError,
    },
    #[error("line {line}: {what} is missing")]
    Missing { line: usize, what: &'static str },
}

/// Parse one whitespace or comma separated field.
pub(crate) fn parse_field<T: std::str::FromStr>(
    value: &str,
    line: usize,
    what: &'static str,
) -> Result<T, InputError> {
    value.trim().parse().map_err(|_| InputError::Number {
        line,
        what,
        value: value.trim().to_string(),
    })
}

/// Lines that carry data start with a digit. Everything else is a label.
pub(crate) fn is_data_line(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}
