use jotter_api_client::ApiError;
use jotter_core::auth::CallbackError;
use jotter_core::session::SessionError;
use jotter_core::validation::ValidationError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Api(#[from] ApiError),

    #[error("{}", .0)]
    Session(#[from] SessionError),

    #[error("{}", .0)]
    Callback(#[from] CallbackError),

    #[error("{}", .0)]
    Validation(#[from] ValidationError),

    #[error("Invalid URL: {}", .0)]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
