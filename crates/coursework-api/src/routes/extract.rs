//! Request extractors

use axum::{
    Json,
    extract::{FromRef, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use coursework_auth::authenticate_header;
use coursework_db::User;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for the user named by `Authorization: Basic` credentials
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let user = authenticate_header(&app_state.db, header).await?;

        debug!("Authenticated user: {} ({})", user.email, user.id);
        Ok(RequireAuth(user))
    }
}

/// JSON body whose rejections use the API error format
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonPayload(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
