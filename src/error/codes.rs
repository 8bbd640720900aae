//! Error code constants.
//!
//! Error codes are organized by category:
//! - 1xxx: Configuration errors
//! - 3xxx: Validation errors
//! - 5xxx: Counter/Internal errors

/// Error code type with semantic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    // ===== Configuration Errors (1xxx) =====

    /// No configuration registered for the type.
    pub const CONFIG_NOT_FOUND: Self = Self(1001);

    /// Type registered twice.
    pub const CONFIG_EXISTS: Self = Self(1002);

    /// Invalid type configuration.
    pub const INVALID_CONFIG: Self = Self(1003);

    // ===== Validation Errors (3xxx) =====

    /// Bad request / invalid parameters.
    pub const BAD_REQUEST: Self = Self(3001);

    // ===== Counter/Internal Errors (5xxx) =====

    /// Counter service unreachable or timed out.
    pub const COUNTER_UNAVAILABLE: Self = Self(5001);

    /// Counter service returned a malformed value.
    pub const COUNTER_PROTOCOL: Self = Self(5002);

    /// Internal error.
    pub const INTERNAL_ERROR: Self = Self(5003);

    /// Get the error code as an i32.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}
