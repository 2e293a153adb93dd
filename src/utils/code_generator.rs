//! Short code generation and validation.
//!
//! Random codes come from the OS CSPRNG and use an alphabet without the
//! characters people misread when retyping a link (`0/O`, `1/l/I`).

use crate::error::AppError;
use serde_json::json;

/// Characters usable in generated codes. 31 symbols, all unambiguous.
const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Length of generated codes.
pub const CODE_LENGTH: usize = 8;

/// Reserved codes that cannot be used as short links.
///
/// These collide with routing paths served by the application itself.
const RESERVED_CODES: &[&str] = &["api", "health", "access", "analytics", "links", "shorten"];

/// Generates a random 8-character short code.
///
/// Bytes from `getrandom` are masked to 5 bits and rejection-sampled against
/// the alphabet, so every symbol is equally likely.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_code() -> String {
    let mut code = String::with_capacity(CODE_LENGTH);
    let mut buffer = [0u8; 16];

    while code.len() < CODE_LENGTH {
        getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

        for &byte in &buffer {
            let index = (byte & 0x1f) as usize;
            if index < ALPHABET.len() {
                code.push(ALPHABET[index] as char);
                if code.len() == CODE_LENGTH {
                    break;
                }
            }
        }
    }

    code
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved system path
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < 4 || code.len() > 32 {
        return Err(AppError::bad_request(
            "Custom code must be 4-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::bad_request(
            "Custom code can only contain lowercase letters, digits, and hyphens",
            json!({ "code": code }),
        ));
    }

    if code.starts_with('-') || code.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom code cannot start or end with a hyphen",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
