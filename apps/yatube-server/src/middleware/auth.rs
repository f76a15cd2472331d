//! Authentication: identity extraction, the login-required gate and the
//! author-only guard.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use yatube_core::domain::Post;
use yatube_core::ports::{AuthError, TokenClaims};
use yatube_shared::ErrorResponse;

use crate::handlers::{paths, redirect};
use crate::state::AppState;

/// Cookie holding the access token of a logged-in browser.
pub const SESSION_COOKIE: &str = "yatube_token";

/// Authenticated user identity.
///
/// Use this in handlers that sit behind [`LoginRequired`]:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Resolve the caller from a Bearer token or, failing that, the session cookie.
pub fn resolve_identity(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer
        .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    state.tokens.validate_token(&token).map(Identity::from)
}

/// Error type for authentication failures of the [`Identity`] extractor.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::HashingError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your session has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
            _ => ErrorResponse::unauthorized(),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Already resolved by LoginRequired.
        if let Some(identity) = req.extensions().get::<Identity>() {
            return ready(Ok(identity.clone()));
        }

        ready(resolve_identity(req).map_err(AuthenticationError))
    }
}

/// Gate that lets only authenticated requests reach the wrapped service.
///
/// Anonymous requests are answered with a redirect to the login page carrying
/// the requested path as `next`; the wrapped handler never runs.
pub struct LoginRequired;

impl<S, B> Transform<S, ServiceRequest> for LoginRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = LoginRequiredService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRequiredService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoginRequiredService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoginRequiredService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match resolve_identity(req.request()) {
            Ok(identity) => {
                tracing::debug!(user = %identity.username, "Authenticated request");
                req.extensions_mut().insert(identity);

                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(e) => {
                tracing::debug!(path = %req.path(), reason = %e, "Login required, redirecting");

                let response = redirect(&paths::login(Some(req.path())));
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

/// Author-only guard: anyone but the post's author is sent back to the post.
pub fn author_only(post: &Post, identity: &Identity) -> Result<(), HttpResponse> {
    if post.is_authored_by(identity.user_id) {
        Ok(())
    } else {
        tracing::info!(
            post_id = %post.id,
            user = %identity.username,
            "Edit attempt by non-author, redirecting to post"
        );
        Err(redirect(&paths::post_detail(post.id)))
    }
}
