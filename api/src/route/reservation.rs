use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    make_reservation, show_host_reservation_list, show_reservation_list,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservations_routers = Router::new()
        .route("/", post(make_reservation))
        .route("/", get(show_reservation_list));
    let host_routers = Router::new().route("/reservations", get(show_host_reservation_list));

    Router::new()
        .nest("/reservations", reservations_routers)
        .nest("/host", host_routers)
}
