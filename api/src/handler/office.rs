use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use garde::Validate;
use kernel::model::{
    id::OfficeId,
    office::{event::DeleteOffice, Office},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        office::{
            CreateOfficeRequest, OfficeListQuery, OfficeResponse, UpdateOfficeRequest,
            UpdateOfficeRequestWithIds,
        },
        pagination::Paginated,
    },
};

pub async fn show_office_list(
    user: Option<AuthorizedUser>,
    Query(query): Query<OfficeListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Paginated<OfficeResponse>>> {
    query.validate(&())?;

    let options = query.into_options(user.map(|u| u.id()));
    registry
        .office_repository()
        .find_all(options)
        .await
        .map(|list| Paginated::new(list, "/api/v1/offices"))
        .map(Json)
}

pub async fn show_office(
    Path(office_id): Path<OfficeId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<OfficeResponse>> {
    registry
        .office_repository()
        .find_by_id(office_id)
        .await
        .and_then(|office| match office {
            Some(office) => Ok(Json(office.into())),
            None => Err(AppError::EntityNotFound("the office was not found".into())),
        })
}

pub async fn register_office(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateOfficeRequest>,
) -> AppResult<(StatusCode, Json<OfficeResponse>)> {
    req.validate(&())?;

    let office_id = registry
        .office_repository()
        .create(req.into(), user.id())
        .await?;
    let office = reload_office(&registry, office_id).await?;

    notify_admins_of_pending_office(&registry, office.clone());

    Ok((StatusCode::CREATED, Json(office.into())))
}

pub async fn update_office(
    user: AuthorizedUser,
    Path(office_id): Path<OfficeId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateOfficeRequest>,
) -> AppResult<Json<OfficeResponse>> {
    req.validate(&())?;

    let update_office = UpdateOfficeRequestWithIds::new(office_id, user.id(), req);
    let requires_review = registry
        .office_repository()
        .update(update_office.into())
        .await?;
    let office = reload_office(&registry, office_id).await?;

    if requires_review {
        notify_admins_of_pending_office(&registry, office.clone());
    }

    Ok(Json(office.into()))
}

pub async fn delete_office(
    user: AuthorizedUser,
    Path(office_id): Path<OfficeId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let delete_office = DeleteOffice {
        office_id,
        requested_user: user.id(),
    };
    registry
        .office_repository()
        .delete(delete_office)
        .await
        .map(|_| StatusCode::OK)
}

async fn reload_office(registry: &AppRegistry, office_id: OfficeId) -> AppResult<Office> {
    registry
        .office_repository()
        .find_by_id(office_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("the office was not found".into()))
}

/// Fire-and-forget: approval is gated on humans, not on this delivery, so
/// the request must not fail or wait on it.
fn notify_admins_of_pending_office(registry: &AppRegistry, office: Office) {
    let user_repository = registry.user_repository();
    let notifier = registry.notifier();
    tokio::spawn(async move {
        let admins = match user_repository.find_admins().await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load admins for the approval notification");
                return;
            }
        };
        for admin in admins {
            if let Err(e) = notifier.office_pending_approval(&admin, &office).await {
                tracing::warn!(
                    error = %e,
                    admin = %admin.user_id,
                    "failed to deliver the office approval notification"
                );
            }
        }
    });
}
