use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Query;
use garde::Validate;
use kernel::model::{
    office::ApprovalStatus,
    reservation::{event::CreateReservation, Reservation},
    user::User,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        pagination::Paginated,
        reservation::{CreateReservationRequest, ReservationListQuery, ReservationResponse},
    },
};

pub async fn show_reservation_list(
    user: AuthorizedUser,
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Paginated<ReservationResponse>>> {
    query.validate(&())?;
    validate_date_range(&query)?;

    registry
        .reservation_repository()
        .find_for_user(user.id(), query.into_options(false))
        .await
        .map(|list| Paginated::new(list, "/api/v1/reservations"))
        .map(Json)
}

pub async fn show_host_reservation_list(
    user: AuthorizedUser,
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Paginated<ReservationResponse>>> {
    query.validate(&())?;
    validate_date_range(&query)?;

    registry
        .reservation_repository()
        .find_for_host(user.id(), query.into_options(true))
        .await
        .map(|list| Paginated::new(list, "/api/v1/host/reservations"))
        .map(Json)
}

pub async fn make_reservation(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate(&())?;
    if req.end_date <= req.start_date {
        return Err(AppError::FieldValidationError {
            field: "end_date",
            message: "The end date must be a date after start date.".into(),
        });
    }

    let office = registry
        .office_repository()
        .find_by_id(req.office_id)
        .await?
        .ok_or(AppError::FieldValidationError {
            field: "office_id",
            message: "Invalid office ID".into(),
        })?;
    if office.owner.owner_id == user.id() {
        return Err(AppError::FieldValidationError {
            field: "office_id",
            message: "You cannot make a reservation on your own office!".into(),
        });
    }
    if office.hidden || office.approval_status == ApprovalStatus::Pending {
        return Err(AppError::FieldValidationError {
            field: "office_id",
            message: "You cannot make a reservation on a hidden office!".into(),
        });
    }

    let reservation = registry
        .reservation_repository()
        .create(CreateReservation::new(
            req.office_id,
            user.id(),
            req.start_date,
            req.end_date,
        ))
        .await?;

    // Booked and committed; confirmations ride along best-effort.
    let host = registry
        .user_repository()
        .find_by_id(office.owner.owner_id)
        .await
        .ok()
        .flatten();
    notify_reservation_made(&registry, user.user.clone(), host, reservation.clone());

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

fn validate_date_range(query: &ReservationListQuery) -> AppResult<()> {
    match (query.from_date, query.to_date) {
        (Some(_), None) => Err(AppError::FieldValidationError {
            field: "to_date",
            message: "The to date field is required when from date is present.".into(),
        }),
        (None, Some(_)) => Err(AppError::FieldValidationError {
            field: "from_date",
            message: "The from date field is required when to date is present.".into(),
        }),
        (Some(from), Some(to)) if to <= from => Err(AppError::FieldValidationError {
            field: "to_date",
            message: "The to date must be a date after from date.".into(),
        }),
        _ => Ok(()),
    }
}

fn notify_reservation_made(
    registry: &AppRegistry,
    visitor: User,
    host: Option<User>,
    reservation: Reservation,
) {
    let notifier = registry.notifier();
    tokio::spawn(async move {
        if let Err(e) = notifier.reservation_made(&visitor, &reservation).await {
            tracing::warn!(error = %e, "failed to deliver the reservation confirmation");
        }
        match host {
            Some(host) => {
                if let Err(e) = notifier.host_reservation_made(&host, &reservation).await {
                    tracing::warn!(error = %e, "failed to deliver the host reservation notice");
                }
            }
            None => tracing::warn!(
                office_id = %reservation.office.office_id,
                "office owner not found, skipping the host reservation notice"
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn query(from: Option<&str>, to: Option<&str>) -> ReservationListQuery {
        let parse = |s: &str| s.parse::<NaiveDate>().unwrap();
        ReservationListQuery {
            page: 1,
            office_id: None,
            user_id: None,
            status: None,
            from_date: from.map(parse),
            to_date: to.map(parse),
        }
    }

    #[test]
    fn the_date_bounds_are_required_together() {
        assert!(validate_date_range(&query(Some("2030-03-03"), None)).is_err());
        assert!(validate_date_range(&query(None, Some("2030-04-04"))).is_err());
        assert!(validate_date_range(&query(None, None)).is_ok());
    }

    #[test]
    fn the_range_must_run_forward() {
        assert!(validate_date_range(&query(Some("2030-04-04"), Some("2030-03-03"))).is_err());
        assert!(validate_date_range(&query(Some("2030-03-03"), Some("2030-03-03"))).is_err());
        assert!(validate_date_range(&query(Some("2030-03-03"), Some("2030-04-04"))).is_ok());
    }
}
