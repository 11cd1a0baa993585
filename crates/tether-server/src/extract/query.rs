use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Tracing target for query extraction.
const TRACING_TARGET: &str = "tether_server::extract::query";

/// Query parameter extractor whose rejections name the offending parameter.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the wrapper and returns the inner query parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(enhance_query_error(rejection)),
        }
    }
}

fn enhance_query_error(rejection: QueryRejection) -> Error<'static> {
    tracing::debug!(
        target: TRACING_TARGET,
        error = %rejection,
        "Query parameter parsing failed"
    );

    let QueryRejection::FailedToDeserializeQueryString(err) = rejection else {
        return ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context("The query string could not be parsed");
    };

    let error_message = err.to_string();
    if error_message.contains("missing field") {
        let field_name = extract_field_name_from_error(&error_message);
        ErrorKind::BadRequest
            .with_message("Missing required query parameter")
            .with_context(format!(
                "The query parameter '{}' is required but was not provided",
                field_name.unwrap_or("unknown")
            ))
    } else if error_message.contains("unknown variant") {
        ErrorKind::BadRequest
            .with_message("Invalid query parameter value")
            .with_context(error_message)
    } else {
        ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_context(format!("Failed to parse query string: {}", error_message))
    }
}

/// Extracts the field name from a serde error message.
fn extract_field_name_from_error(error_message: &str) -> Option<&str> {
    let start = error_message.find('`')?;
    let end = error_message[start + 1..].find('`')?;
    Some(&error_message[start + 1..start + 1 + end])
}
