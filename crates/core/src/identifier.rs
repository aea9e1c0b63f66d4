use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Maximum identifier length accepted by Redshift, in bytes.
pub const IDENTIFIER_MAX_LENGTH: usize = 127;

/// A SQL identifier restricted to `[A-Za-z_][A-Za-z0-9_$]*`.
///
/// Identifiers cannot be bound as statement parameters, so every user, group,
/// schema and table name passes through this type before it reaches SQL text.
/// Names read back from the catalog may fall outside the pattern; see
/// [`Identifier::from_catalog`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Creates a validated identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let mut chars = value.chars();

        let Some(first) = chars.next() else {
            return Err(AppError::Validation(
                "identifier must not be empty".to_owned(),
            ));
        };

        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(AppError::Validation(format!(
                "identifier '{value}' must start with a letter or underscore"
            )));
        }

        if let Some(invalid) = chars.find(|character| !is_identifier_character(*character)) {
            return Err(AppError::Validation(format!(
                "identifier '{value}' contains invalid character '{invalid}'"
            )));
        }

        if value.len() > IDENTIFIER_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "identifier '{value}' must not exceed {IDENTIFIER_MAX_LENGTH} bytes"
            )));
        }

        Ok(Self(value))
    }

    /// Wraps a name the catalog already holds, such as a group created
    /// elsewhere as `"data-team"`.
    ///
    /// Only emptiness, length and NUL bytes are checked. [`Identifier::quoted`]
    /// doubles embedded quotes, so the name still renders as one identifier.
    pub fn from_catalog(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() || value.contains('\0') {
            return Err(AppError::Validation(format!(
                "catalog name '{}' cannot be used as an identifier",
                value.escape_debug()
            )));
        }

        if value.len() > IDENTIFIER_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "catalog name '{value}' must not exceed {IDENTIFIER_MAX_LENGTH} bytes"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the identifier double-quoted for statement text.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

fn is_identifier_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '$')
}

impl TryFrom<String> for Identifier {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl Display for Identifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
