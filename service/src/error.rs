use rocket::{
    http::Status,
    request::Request,
    response::{Responder, Result},
    serde::json::Json,
};
use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid input. Expected \"urls\" array.")]
    InvalidInput,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> Result<'o> {
        let status = match self {
            Self::InvalidInput => Status::BadRequest,
        };

        (status, Json(ErrorBody::new(self.to_string()))).respond_to(req)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("Missing config")]
    MissingConfig,
    #[error("Resolver error")]
    Resolver(#[from] lr_resolver::Error),
}
