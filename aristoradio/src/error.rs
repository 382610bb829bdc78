//! Error types for the Radio Aristocrats client

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single fetch: the value, or a classified [`Error`]
pub type FetchResult<T> = Result<T>;

/// Coarse classification of an [`Error`]
///
/// Callers branch on the kind rather than on individual variants: transport
/// and shape failures are alert-worthy, "no track info" is the ordinary idle
/// state of a channel, artwork failures fall back to the default image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The feed or API could not be reached
    NetworkRequest,
    /// The response bytes could not be decoded as text, XML, JSON or image
    DataTransformation,
    /// The feed parsed but says no song is on air
    FailedToObtainTrackInfo,
    /// Artist metadata has no image of the wanted size
    FailedToObtainArtworkUrl,
    /// The payload decoded but misses expected fields or reports an API error
    NetworkDataInconsistency,
    /// Configuration could not be read
    Config,
}

/// Errors that can occur when using the Radio Aristocrats clients
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed at the transport level
    #[error("Network request failed: {0}")]
    NetworkRequest(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Body could not be turned into the expected text or XML
    #[error("Data transformation failed: {0}")]
    DataTransformation(String),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Image bytes could not be decoded
    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// A required XML attribute is absent from the feed
    #[error("Missing attribute `{attribute}` on {element}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The artwork API answered with an error object
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Decodable payload without the expected fields
    #[error("Inconsistent data: {0}")]
    NetworkDataInconsistency(String),

    /// The feed is reachable and parseable but announces no song
    #[error("No track information: {0}")]
    FailedToObtainTrackInfo(String),

    /// No image of the wanted size for this artist
    #[error("No artwork URL for artist {0}")]
    FailedToObtainArtworkUrl(String),

    /// Configuration error (from aristoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Create a data transformation error
    pub fn data_transformation(msg: impl Into<String>) -> Self {
        Self::DataTransformation(msg.into())
    }

    /// Create a data inconsistency error
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Self::NetworkDataInconsistency(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkRequest(_) | Self::HttpStatus { .. } | Self::InvalidUrl(_) => {
                ErrorKind::NetworkRequest
            }
            Self::DataTransformation(_) | Self::Json(_) | Self::Image(_) => {
                ErrorKind::DataTransformation
            }
            Self::MissingAttribute { .. } | Self::Api { .. } | Self::NetworkDataInconsistency(_) => {
                ErrorKind::NetworkDataInconsistency
            }
            Self::FailedToObtainTrackInfo(_) => ErrorKind::FailedToObtainTrackInfo,
            Self::FailedToObtainArtworkUrl(_) => ErrorKind::FailedToObtainArtworkUrl,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the error should block the user with an alert
    ///
    /// Only transport and payload-shape failures qualify; the "no song on
    /// air" case is rendered inline and artwork problems stay silent.
    pub fn is_alert_worthy(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkRequest
                | ErrorKind::DataTransformation
                | ErrorKind::NetworkDataInconsistency
        )
    }

    /// The broadcast message carried by a "no track info" failure
    pub fn announcement(&self) -> Option<&str> {
        match self {
            Self::FailedToObtainTrackInfo(message) => Some(message),
            _ => None,
        }
    }
}
