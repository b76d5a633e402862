// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Row index outside `[0, len)`. The operation was aborted.
    Index { index: usize, len: usize },
    Format(FormatError),
    /// Layer data cannot satisfy the request (e.g. degenerate intensity window).
    State(String),
    Io(String),
    Config(String),
}

/// Failures raised by the file codecs.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Path has no extension to pick a codec from
    MissingExtension,

    /// No codec is registered for this extension key
    UnsupportedExtension(String),

    /// File exists but could not be decoded
    Decode(String),

    /// Layer could not be encoded
    Encode(String),

    /// Codec exists but does not handle this layer kind or operation
    Unsupported {
        layer_kind: &'static str,
        operation: &'static str,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingExtension => write!(f, "File has no extension"),
            FormatError::UnsupportedExtension(ext) => {
                write!(f, "Unsupported file extension: {}", ext)
            }
            FormatError::Decode(msg) => write!(f, "Decoding failed: {}", msg),
            FormatError::Encode(msg) => write!(f, "Encoding failed: {}", msg),
            FormatError::Unsupported {
                layer_kind,
                operation,
            } => write!(f, "Cannot {} a {} layer with this format", operation, layer_kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index { index, len } => {
                write!(f, "Index Error: {} is out of range (len {})", index, len)
            }
            Error::Format(e) => write!(f, "Format Error: {}", e),
            Error::State(e) => write!(f, "State Error: {}", e),
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        match err {
            image_rs::ImageError::IoError(io) => Error::Io(io.to_string()),
            image_rs::ImageError::Unsupported(e) => {
                Error::Format(FormatError::Decode(e.to_string()))
            }
            other => Error::Format(FormatError::Decode(other.to_string())),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Format(FormatError::Decode(err.to_string()))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Format(FormatError::Decode(err.to_string()))
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(err: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Format(FormatError::Decode(err.to_string()))
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Format(FormatError::Encode(err.to_string()))
    }
}

impl Error {
    /// Returns true for out-of-range index failures.
    #[must_use]
    pub fn is_index(&self) -> bool {
        matches!(self, Error::Index { .. })
    }

    /// Returns true when the failure comes from a codec.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn index_error_mentions_index_and_len() {
        let err = Error::Index { index: 7, len: 3 };
        let text = format!("{}", err);
        assert!(text.contains('7'));
        assert!(text.contains("len 3"));
        assert!(err.is_index());
    }

    #[test]
    fn format_error_wraps_into_error() {
        let err: Error = FormatError::UnsupportedExtension("shp".into()).into();
        assert!(err.is_format());
        assert_eq!(
            format!("{}", err),
            "Format Error: Unsupported file extension: shp"
        );
    }

    #[test]
    fn unsupported_operation_display() {
        let err = FormatError::Unsupported {
            layer_kind: "vector",
            operation: "save",
        };
        assert_eq!(
            format!("{}", err),
            "Cannot save a vector layer with this format"
        );
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }
}
