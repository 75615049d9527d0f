use axum::{extract::State, Json};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::model::tag::TagsResponse;

pub async fn show_tag_list(State(registry): State<AppRegistry>) -> AppResult<Json<TagsResponse>> {
    registry
        .tag_repository()
        .find_all()
        .await
        .map(TagsResponse::from)
        .map(Json)
}
