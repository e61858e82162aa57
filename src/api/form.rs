// Request field extraction
//
// GET/HEAD read the query string; every other method expects an
// application/x-www-form-urlencoded body. Anything unparseable becomes an
// empty field map so validation reports it the usual way.

use crate::schema::RawFields;
use axum::async_trait;
use axum::extract::{Form, FromRequest, Request};
use std::convert::Infallible;
use tracing::warn;

#[derive(Debug, Default)]
pub struct RequestFields(pub RawFields);

#[async_trait]
impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<RawFields>::from_request(req, state).await {
            Ok(Form(fields)) => Ok(RequestFields(fields)),
            Err(rejection) => {
                warn!(error = %rejection, "could not parse request fields");
                Ok(RequestFields::default())
            }
        }
    }
}
