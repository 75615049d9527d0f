use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::office::{
    delete_office, register_office, show_office, show_office_list, update_office,
};

pub fn build_office_routers() -> Router<AppRegistry> {
    let offices_routers = Router::new()
        .route("/", post(register_office))
        .route("/", get(show_office_list))
        .route("/:office_id", get(show_office))
        .route("/:office_id", put(update_office))
        .route("/:office_id", delete(delete_office));

    Router::new().nest("/offices", offices_routers)
}
