use std::path::PathBuf;

/// Fatal-tier adapter failures. Any of these aborts the whole merge:
/// no partial output is ever written.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Input file missing or unreadable
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML unrecoverably malformed (after the one repair attempt, for GPX)
    #[error("malformed XML in {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// A TCX timestamp that does not match the fixed fractional-seconds
    /// UTC format
    #[error("bad timestamp {value:?} in {}: {source}", .path.display())]
    Timestamp {
        path: PathBuf,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A file with an extension no adapter handles reached the engine
    #[error("unsupported file extension: {}", .path.display())]
    UnsupportedExtension { path: PathBuf },
}
