//! ISBN-13 validation
//!
//! Lookup and store paths both gate on this check so that malformed input
//! is rejected before any provider call or database write.

/// Validate an ISBN-13 string.
///
/// A valid ISBN-13:
/// 1. Is exactly 13 characters long
/// 2. Starts with the `978` or `979` bookland prefix
/// 3. Contains only ASCII digits
/// 4. Satisfies the alternating 1,3 weighted checksum (sum of all 13
///    weighted digits is a multiple of 10)
pub fn is_valid_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 {
        return false;
    }

    if !isbn.starts_with("978") && !isbn.starts_with("979") {
        return false;
    }

    let mut sum: u32 = 0;
    for (i, c) in isbn.chars().enumerate() {
        let digit = match c.to_digit(10) {
            Some(d) => d,
            None => return false,
        };
        let weight = if i % 2 == 0 { 1 } else { 3 };
        sum += digit * weight;
    }

    sum % 10 == 0
}
