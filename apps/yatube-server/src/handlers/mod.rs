//! HTTP handlers and route configuration.

mod about;
mod auth;
mod posts;

use actix_web::error::InternalError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::header, web};
use serde::Serialize;
use yatube_shared::Rendered;

use crate::middleware::auth::LoginRequired;
use crate::middleware::error::AppError;

/// Largest accepted form body. Post text has no length limit of its own.
pub const FORM_LIMIT: usize = 2 * 1024 * 1024;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_LIMIT)
            .error_handler(|err, _req| rejected(err)),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| rejected(err)))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        let response = AppError::NotFound(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    }));

    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        // Login-required routes
        .service(
            web::resource("/create/")
                .wrap(LoginRequired)
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .wrap(LoginRequired)
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .service(
            web::scope("/auth")
                .route("/signup/", web::get().to(auth::signup_form))
                .route("/signup/", web::post().to(auth::signup))
                .route("/login/", web::get().to(auth::login_form))
                .route("/login/", web::post().to(auth::login))
                .route("/logout/", web::get().to(auth::logout))
                .route("/logout/", web::post().to(auth::logout)),
        )
        .default_service(web::to(not_found));
}

/// Turn an extractor failure into a problem response with the same status.
fn rejected<E>(err: E) -> actix_web::Error
where
    E: ResponseError + 'static,
{
    let response = AppError::rejected(&err).error_response();
    InternalError::from_response(err, response).into()
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("No page at {}", req.path())))
}

/// 200 response carrying the template name and its context.
pub fn render<C: Serialize>(template: &str, context: C) -> HttpResponse {
    HttpResponse::Ok().json(Rendered::new(template, context))
}

/// 302 redirect to a local path.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// URLs of the pages handlers redirect to.
pub mod paths {
    use uuid::Uuid;

    pub const INDEX: &str = "/";

    pub fn profile(username: &str) -> String {
        format!("/profile/{username}/")
    }

    pub fn post_detail(post_id: Uuid) -> String {
        format!("/posts/{post_id}/")
    }

    /// Login page, optionally returning to `next` afterwards.
    pub fn login(next: Option<&str>) -> String {
        match next {
            Some(next) => format!("/auth/login/?next={}", encode_query_value(next)),
            None => "/auth/login/".to_string(),
        }
    }

    /// `next` if it is a path on this site, the index otherwise.
    pub fn local_or_index(next: Option<&str>) -> &str {
        match next {
            Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
                next
            }
            _ => INDEX,
        }
    }

    /// Escape the characters of a request path that are significant inside a
    /// query value. The path itself is already percent-encoded by the client.
    fn encode_query_value(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '%' => out.push_str("%25"),
                '&' => out.push_str("%26"),
                '+' => out.push_str("%2B"),
                '#' => out.push_str("%23"),
                '=' => out.push_str("%3D"),
                ' ' => out.push_str("%20"),
                _ => out.push(c),
            }
        }
        out
    }

}
