//! Fixed vocabularies matched case-insensitively.

use crate::config::ConfigError;

use super::FieldPath;

/// An enumerated option value with a canonical lowercase token.
///
/// Implementors list every variant in [`Token::ALL`]; parsing compares the
/// user's text against each canonical token ignoring ASCII case, so
/// `"Normal"`, `"normal"` and `"NORMAL"` all select the same variant.
pub trait Token: Copy + Sized + 'static {
    /// Every accepted variant, in the order shown in error messages.
    const ALL: &'static [Self];

    /// Canonical lowercase token of this variant.
    fn token(self) -> &'static str;

    /// Parses `raw` into a variant.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::SchemaViolation`] listing the accepted tokens.
    fn parse_token(path: &FieldPath, raw: &str) -> Result<Self, ConfigError> {
        let wanted = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.token().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let expected: Vec<_> = Self::ALL.iter().map(|v| v.token()).collect();
                ConfigError::violation(
                    path,
                    format!(
                        "unknown value '{raw}', expected one of: {}",
                        expected.join(", ")
                    ),
                )
            })
    }
}
