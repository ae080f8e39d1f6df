//! Record identifiers and customer codes.

use thiserror::Error;

/// Highest assignable customer code number.
pub const MAX_CUSTOMER_CODE: u32 = 9999;

/// Customer code errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Customer codes exhausted: C9999 already assigned")]
    Exhausted,
}

/// Generate a random (v4) UUID string.
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse the number out of a well-formed code (`C` + exactly four ASCII digits).
pub fn parse_customer_code(code: &str) -> Option<u32> {
    let digits = code.strip_prefix('C')?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next customer code after the highest well-formed code in `existing`.
///
/// Malformed codes are ignored; an empty list (or one with no well-formed
/// codes) starts at `C0001`.
pub fn generate_customer_code<S: AsRef<str>>(existing: &[S]) -> Result<String, CodeError> {
    let max = existing
        .iter()
        .filter_map(|code| parse_customer_code(code.as_ref()))
        .max()
        .unwrap_or(0);

    let next = max + 1;
    if next > MAX_CUSTOMER_CODE {
        return Err(CodeError::Exhausted);
    }
    Ok(format!("C{:04}", next))
}
