//! Syntactic check for Kubernetes resource quantities
//!
//! Accepts `<signedNumber><suffix>` where the suffix is a binary SI unit
//! (`Ki`..`Ei`), a decimal SI unit (`n u m k M G T P E`), a decimal exponent
//! (`e3`, `E-2`) or nothing.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const BINARY_SI: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SI: [&str; 9] = ["n", "u", "m", "k", "M", "G", "T", "P", "E"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("quantity '{0}' does not start with a number")]
    MissingNumber(String),

    #[error("quantity '{quantity}' has unknown suffix '{suffix}'")]
    UnknownSuffix { quantity: String, suffix: String },
}

/// Parse a storage size such as "10Gi" into a `Quantity`.
///
/// The original string is kept as-is; only its syntax is checked.
pub fn parse_quantity(value: &str) -> Result<Quantity, QuantityError> {
    if value.is_empty() {
        return Err(QuantityError::Empty);
    }

    let suffix = strip_signed_number(value)
        .ok_or_else(|| QuantityError::MissingNumber(value.to_string()))?;

    if is_valid_suffix(suffix) {
        Ok(Quantity(value.to_string()))
    } else {
        Err(QuantityError::UnknownSuffix {
            quantity: value.to_string(),
            suffix: suffix.to_string(),
        })
    }
}

/// Strip `[+-]digits[.digits]` from the front, returning the remainder.
/// Either side of the decimal point may be empty but not both.
fn strip_signed_number(value: &str) -> Option<&str> {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);

    let (whole, rest) = split_digits(unsigned);
    let (fraction, rest) = match rest.strip_prefix('.') {
        Some(after_point) => split_digits(after_point),
        None => ("", rest),
    };

    if whole.is_empty() && fraction.is_empty() {
        None
    } else {
        Some(rest)
    }
}

fn split_digits(value: &str) -> (&str, &str) {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value.split_at(end)
}

fn is_valid_suffix(suffix: &str) -> bool {
    if suffix.is_empty() || BINARY_SI.contains(&suffix) || DECIMAL_SI.contains(&suffix) {
        return true;
    }

    // "E" alone is exa; "E" followed by an integer is an exponent
    suffix
        .strip_prefix(['e', 'E'])
        .map(|exponent| exponent.strip_prefix(['+', '-']).unwrap_or(exponent))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
