use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::tag::show_tag_list;

pub fn build_tag_routers() -> Router<AppRegistry> {
    Router::new().route("/tags", get(show_tag_list))
}
