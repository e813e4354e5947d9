use crate::{server::ServerError, views::authoring::FormRequest};
use axum::{
    Json as AxumJson,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::ContentType;
use serde::Serialize;
use std::convert::Infallible;
use yatube_common::model::form::PostForm;

/// JSON response body. Serialization failures become a logged 500.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(json) => (TypedHeader(ContentType::json()), json).into_response(),
            Err(err) => ServerError::JsonResponse(err).into_response(),
        }
    }
}

/// A submitted post form. Never rejects: a body that is not a readable
/// post form is passed on as [`FormRequest::Unreadable`] and shown back to
/// the user as a form error.
#[derive(Debug, Clone)]
pub struct PostSubmission(pub FormRequest);

impl<S> FromRequest<S> for PostSubmission
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request = match AxumJson::<PostForm>::from_request(request, state).await {
            Ok(AxumJson(form)) => FormRequest::Submit(form),
            Err(rejection) => FormRequest::Unreadable(rejection.body_text()),
        };

        Ok(Self(request))
    }
}
