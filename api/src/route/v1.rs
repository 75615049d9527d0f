use axum::Router;
use registry::AppRegistry;

use super::{
    health::build_health_check_routers, office::build_office_routers,
    reservation::build_reservation_routers, tag::build_tag_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_office_routers())
        .merge(build_reservation_routers())
        .merge(build_tag_routers());

    Router::new().nest("/api/v1", router)
}
