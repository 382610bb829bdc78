use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Playback engine error: {0}")]
    Engine(String),
    #[error("Stream {0} failed to load: {1}")]
    StreamFailed(String, String),
    #[error("Cannot resolve stream: {0}")]
    Source(#[from] aristoradio::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl PlayerError {
    pub fn engine(msg: impl Into<String>) -> Self {
        PlayerError::Engine(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
