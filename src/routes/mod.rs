// Route exports
pub mod recommend;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommend::configure),
    )
    // Path the original web client posts to
    .route("/recommend", web::post().to(recommend::recommend));
}
