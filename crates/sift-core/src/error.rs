use thiserror::Error as ThisError;

///
/// Error
///
/// Structured failures surfaced by the value layer. Every variant carries
/// enough context (offending path, tag, or key) for callers to map it into
/// their own taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    /// The canonical codec encountered a malformed input: a zero-key or
    /// multi-key variant object, or an unknown tag with no alias match.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// A reflective get/set or path step saw a value whose runtime shape
    /// does not match the expected field type.
    #[error("incompatible record at `{path}`: expected {expected}, found {found}")]
    IncompatibleRecord {
        expected: String,
        found: String,
        path: String,
    },

    /// `ModifyByKey` referenced a key absent from the map.
    #[error("missing key for map modification: {key}")]
    MissingKey { key: String },

    /// A translator or evaluator does not support the named variant.
    #[error("unsupported variant: {variant}")]
    Unsupported { variant: String },

    /// A virtual serializer hit a generic placeholder; the caller must
    /// supply the concrete type argument.
    #[error("generic type parameter {index} has no concrete argument")]
    GenericPlaceholder { index: usize },
}

impl Error {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn incompatible(
        expected: impl Into<String>,
        found: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::IncompatibleRecord {
            expected: expected.into(),
            found: found.into(),
            path: path.into(),
        }
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    pub fn unsupported(variant: impl Into<String>) -> Self {
        Self::Unsupported {
            variant: variant.into(),
        }
    }

    /// Prepend a path segment to an `IncompatibleRecord` error.
    ///
    /// Other variants pass through unchanged.
    #[must_use]
    pub fn with_segment(self, segment: &str) -> Self {
        match self {
            Self::IncompatibleRecord {
                expected,
                found,
                path,
            } => {
                let path = if path == "this" || path.is_empty() {
                    segment.to_string()
                } else {
                    format!("{segment}.{path}")
                };
                Self::IncompatibleRecord {
                    expected,
                    found,
                    path,
                }
            }
            other => other,
        }
    }
}
