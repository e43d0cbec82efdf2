use std::fmt;

/// Stable, ABI-style error codes returned across the public surface.
///
/// Any non-negative return value (including reply IDs) is also success -
/// callers that only care about failure can test `code >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    EventBufferFull = -1,
    InvalidParameter = -2,
    NoMem = -3,
    NotFound = -4,
    Property = -5,
    PropertyUnavailable = -6,
    Uninitialized = -7,
}

impl ErrorCode {
    /// Human-readable description, matching the original `mpv_error_string` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::EventBufferFull => "request buffer full",
            Self::InvalidParameter => "invalid parameter",
            Self::NoMem => "memory allocation failed",
            Self::NotFound => "not found",
            Self::Property => "error accessing property",
            Self::PropertyUnavailable => "property unavailable",
            Self::Uninitialized => "core not initialized",
        }
    }

    /// Looks up the description for a raw numeric code, including codes this
    /// version of the crate does not define (returns `"unknown error"`).
    #[must_use]
    pub fn describe(code: i32) -> &'static str {
        match code {
            0 => Self::Success.as_str(),
            -1 => Self::EventBufferFull.as_str(),
            -2 => Self::InvalidParameter.as_str(),
            -3 => Self::NoMem.as_str(),
            -4 => Self::NotFound.as_str(),
            -5 => Self::Property.as_str(),
            -6 => Self::PropertyUnavailable.as_str(),
            -7 => Self::Uninitialized.as_str(),
            _ => "unknown error",
        }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the (external, here minimally-stubbed) property database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("generic property error")]
    Error,
    #[error("property unavailable")]
    Unavailable,
    #[error("property not implemented")]
    NotImplemented,
    #[error("unknown property: {0}")]
    Unknown(String),
}

/// Translates a property-layer error into the public `ErrorCode`, matching
/// `translate_property_error` in the original implementation. Unknown
/// property-layer failures fall back to `ErrorCode::Property`.
#[must_use]
pub fn translate_property_error(err: &PropertyError) -> ErrorCode {
    match err {
        PropertyError::Error | PropertyError::NotImplemented => ErrorCode::Property,
        PropertyError::Unavailable => ErrorCode::PropertyUnavailable,
        PropertyError::Unknown(_) => ErrorCode::NotFound,
    }
}

/// Errors from the (external, here minimally-stubbed) option database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("missing parameter for option {0}")]
    MissingParam(String),
    #[error("invalid value for option {0}")]
    Invalid(String),
    #[error("value out of range for option {0}")]
    OutOfRange(String),
    #[error("unknown option: {0}")]
    Unknown(String),
}

/// Translates an option-store error into the public `ErrorCode`.
#[must_use]
pub fn translate_option_error(err: &OptionError) -> ErrorCode {
    match err {
        OptionError::MissingParam(_) | OptionError::Invalid(_) | OptionError::OutOfRange(_) => {
            ErrorCode::InvalidParameter
        }
        OptionError::Unknown(_) => ErrorCode::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_original_table() {
        assert_eq!(ErrorCode::describe(0), "success");
        assert_eq!(ErrorCode::describe(-7), "core not initialized");
        assert_eq!(ErrorCode::describe(-999), "unknown error");
    }

    #[test]
    fn property_translation_table() {
        assert_eq!(translate_property_error(&PropertyError::Error), ErrorCode::Property);
        assert_eq!(
            translate_property_error(&PropertyError::NotImplemented),
            ErrorCode::Property
        );
        assert_eq!(
            translate_property_error(&PropertyError::Unavailable),
            ErrorCode::PropertyUnavailable
        );
        assert_eq!(
            translate_property_error(&PropertyError::Unknown("x".into())),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn option_translation_table() {
        assert_eq!(
            translate_option_error(&OptionError::MissingParam("x".into())),
            ErrorCode::InvalidParameter
        );
        assert_eq!(
            translate_option_error(&OptionError::Unknown("x".into())),
            ErrorCode::NotFound
        );
    }
}
