//! Static "about" pages.

use actix_web::HttpResponse;
use serde::Serialize;

use crate::handlers::render;

#[derive(Serialize)]
struct AboutContext {
    title: &'static str,
    text: &'static str,
}

/// GET /about/author/
pub async fn author() -> HttpResponse {
    render(
        "about/author.html",
        AboutContext {
            title: "About the author",
            text: "Yatube is written and maintained by its authors for the community of its readers.",
        },
    )
}

/// GET /about/tech/
pub async fn tech() -> HttpResponse {
    render(
        "about/tech.html",
        AboutContext {
            title: "Technologies",
            text: "Rust, actix-web, SeaORM and PostgreSQL.",
        },
    )
}
