//! Width/height query parameter validation.
//!
//! Both dimensions must be present, base-10 integers, and in
//! `1..=`[`MAX_DIMENSION`]. The upper bound caps the memory and CPU a single
//! request can make the resize engine spend. Validation runs before any
//! store I/O, so a rejected request never touches the filesystem.

use thiserror::Error;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 4000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename is required")]
    MissingFilename,
    #[error("Invalid filename")]
    InvalidFilename,
    #[error("Width and height parameters are required")]
    MissingDimensions,
    #[error("Invalid width or height parameters")]
    InvalidDimensions,
}

/// Validated output size. Both fields are in `1..=MAX_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

/// Parse raw `width`/`height` query values.
///
/// Surrounding whitespace is trimmed; anything else that isn't a plain
/// integer (`"12px"`, `"1.5"`, `"0x10"`) is rejected.
pub fn parse_dimensions(
    width: Option<&str>,
    height: Option<&str>,
) -> Result<TargetSize, ValidationError> {
    let (Some(width), Some(height)) = (width, height) else {
        return Err(ValidationError::MissingDimensions);
    };
    if width.trim().is_empty() || height.trim().is_empty() {
        return Err(ValidationError::MissingDimensions);
    }
    Ok(TargetSize {
        width: parse_one(width)?,
        height: parse_one(height)?,
    })
}

fn parse_one(raw: &str) -> Result<u32, ValidationError> {
    // i64 so "-5" parses and is rejected by the range check rather than as garbage
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidDimensions)?;
    if (1..=i64::from(MAX_DIMENSION)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ValidationError::InvalidDimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_pair() {
        assert_eq!(
            parse_dimensions(Some("300"), Some("200")),
            Ok(TargetSize {
                width: 300,
                height: 200
            })
        );
    }

    #[test]
    fn accepts_bounds() {
        let s = parse_dimensions(Some("1"), Some("4000")).unwrap();
        assert_eq!((s.width, s.height), (1, 4000));
    }

    #[test]
    fn trims_whitespace() {
        let s = parse_dimensions(Some(" 10 "), Some("20\n")).unwrap();
        assert_eq!((s.width, s.height), (10, 20));
    }

    #[test]
    fn missing_width_or_height() {
        assert_eq!(
            parse_dimensions(None, Some("10")),
            Err(ValidationError::MissingDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("10"), None),
            Err(ValidationError::MissingDimensions)
        );
        assert_eq!(
            parse_dimensions(Some(""), Some("10")),
            Err(ValidationError::MissingDimensions)
        );
    }

    #[test]
    fn rejects_above_max() {
        assert_eq!(
            parse_dimensions(Some("5000"), Some("200")),
            Err(ValidationError::InvalidDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("200"), Some("4001")),
            Err(ValidationError::InvalidDimensions)
        );
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert_eq!(
            parse_dimensions(Some("0"), Some("10")),
            Err(ValidationError::InvalidDimensions)
        );
        assert_eq!(
            parse_dimensions(Some("10"), Some("-5")),
            Err(ValidationError::InvalidDimensions)
        );
    }

    #[test]
    fn rejects_non_numeric() {
        for bad in ["abc", "12px", "1.5", "0x10", "1e3"] {
            assert_eq!(
                parse_dimensions(Some(bad), Some("10")),
                Err(ValidationError::InvalidDimensions),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_huge_numbers_without_overflow() {
        assert_eq!(
            parse_dimensions(Some("99999999999999999999999"), Some("10")),
            Err(ValidationError::InvalidDimensions)
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ValidationError::MissingDimensions.to_string(),
            "Width and height parameters are required"
        );
        assert_eq!(
            ValidationError::InvalidDimensions.to_string(),
            "Invalid width or height parameters"
        );
    }
}
