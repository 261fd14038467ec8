// Route exports
pub mod surveys;

use actix_web::web;

pub use surveys::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(surveys::configure);
}
