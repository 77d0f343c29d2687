use log::{error, warn};
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::{json, Json, Value},
    Request,
};
use thiserror::Error;

use crate::logging::RequestId;
use crate::model::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Duplicate entry found")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A store failure while listing. The cause is logged but never sent.
    #[error("Error fetching questions")]
    Listing(#[source] StoreError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a string")]
    NotAString(&'static str),
}

impl Error {
    fn status_and_body(&self) -> (Status, Value) {
        match self {
            Self::Conflict | Self::Store(StoreError::DuplicateKey { .. }) => (
                Status::Conflict,
                json!({ "message": Self::Conflict.to_string() }),
            ),
            Self::Listing(_) => (
                Status::InternalServerError,
                json!({ "message": self.to_string() }),
            ),
            Self::Store(_) | Self::MissingField(_) | Self::NotAString(_) => (
                Status::InternalServerError,
                json!({ "error": self.to_string() }),
            ),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let id = RequestId::of(req);
        let (status, body) = self.status_and_body();
        match &self {
            Self::Listing(cause) => error!("req{id}: {self}: {cause}"),
            _ if status == Status::Conflict => warn!("req{id}: {self}"),
            _ => error!("req{id}: {self}"),
        }
        (status, Json(body)).respond_to(req)
    }
}
