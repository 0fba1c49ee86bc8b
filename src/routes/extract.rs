//! Request body and query extractors that reject with [`AppError`].
//!
//! axum's own rejections answer in plain text, mostly with 422; these wrappers
//! turn every malformed or invalid input into a 400 with the usual JSON
//! `{"message": ...}` body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use axum_valid::Valid;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body without field-level validation.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// JSON body checked against its `validator` rules.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Valid(Json(value)) = Valid::<Json<T>>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string checked against its `validator` rules.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Valid(Query(value)) = Valid::<Query<T>>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{self, header::CONTENT_TYPE},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, max = 4))]
        name: String,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn status_of(err: AppError) -> u16 {
        err.into_response().status().as_u16()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let ValidJson(named) =
            ValidJson::<Named>::from_request(json_request(r#"{"name":"ann"}"#), &())
                .await
                .unwrap();
        assert_eq!(named.name, "ann");
    }

    #[tokio::test]
    async fn wrong_field_type_and_broken_syntax_are_bad_requests() {
        let err = JsonBody::<Named>::from_request(json_request(r#"{"name":7}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = JsonBody::<Named>::from_request(json_request("{"), &())
            .await
            .unwrap_err();
        assert_eq!(status_of(err), 400);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"ann"}"#))
            .unwrap();
        let err = JsonBody::<Named>::from_request(request, &()).await.unwrap_err();
        assert_eq!(status_of(err), 400);
    }

    #[tokio::test]
    async fn failed_rule_is_a_bad_request() {
        let err =
            ValidJson::<Named>::from_request(json_request(r#"{"name":"too long"}"#), &())
                .await
                .unwrap_err();
        let AppError::BadRequest(message) = err else {
            panic!("expected a bad request");
        };
        assert!(message.contains("name"));
    }

    #[tokio::test]
    async fn query_rules_and_parse_errors_are_bad_requests() {
        let (mut parts, _) = http::Request::builder()
            .uri("/?name=abcdef")
            .body(())
            .unwrap()
            .into_parts();
        let err = ValidQuery::<Named>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let (mut parts, _) = http::Request::builder().uri("/").body(()).unwrap().into_parts();
        let err = ValidQuery::<Named>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status_of(err), 400);
    }
}
