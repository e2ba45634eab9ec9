//! Unified error type for all store operations.

/// Things that can go wrong when using the store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// File system problem (read, write, rename).
    Io(String),
    /// Failed to turn the document (or a record) into JSON.
    Serialize(String),
    /// File contents, or a queried record, didn't have the expected shape.
    Deserialize(String),
    /// Bad builder configuration (empty path, empty key field).
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::Deserialize(msg) => write!(f, "deserialization error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Io => Error::Io(err.to_string()),
            Category::Syntax | Category::Eof | Category::Data => {
                Error::Deserialize(err.to_string())
            }
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_syntax_error_maps_to_deserialize() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        assert!(matches!(Error::from(err), Error::Deserialize(_)));
    }

    #[test]
    fn json_shape_error_maps_to_deserialize() {
        let err = serde_json::from_str::<Vec<u8>>("{\"a\": 1}").unwrap_err();
        assert!(matches!(Error::from(err), Error::Deserialize(_)));
    }

    #[test]
    fn display_prefixes_kind() {
        assert_eq!(Error::Config("x".into()).to_string(), "config error: x");
        assert_eq!(Error::Io("disk".into()).to_string(), "i/o error: disk");
    }
}
