use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use kernel::model::{office::Office, reservation::Reservation, user::User};
use kernel::notifier::Notifier;
use shared::{
    config::MailConfig,
    error::{AppError, AppResult},
};

/// Delivers notifications through an HTTP mail gateway that accepts a
/// base64-encoded RFC 822 message. Without a configured endpoint every
/// send is a logged no-op, which keeps local and test setups quiet.
pub struct MailNotifier {
    client: reqwest::Client,
    config: Option<MailConfig>,
}

impl MailNotifier {
    pub fn new(config: Option<MailConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let Some(config) = &self.config else {
            tracing::debug!(%to, %subject, "mail delivery disabled, skipping notification");
            return Ok(());
        };

        let message = format!(
            "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{body}"
        );
        let raw = general_purpose::URL_SAFE_NO_PAD.encode(message.as_bytes());

        let res = self
            .client
            .post(&config.endpoint)
            .bearer_auth(&config.token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("mail gateway error: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "mail gateway returned {}",
                res.status()
            )));
        }

        tracing::info!(%to, %subject, "notification mail delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn office_pending_approval(&self, recipient: &User, office: &Office) -> AppResult<()> {
        let subject = "Office pending approval";
        let body = format!(
            "{},\n\nThe office \"{}\" at {} is awaiting approval.",
            recipient.name, office.title, office.address_line1
        );
        self.send(&recipient.email, subject, &body).await
    }

    async fn reservation_made(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()> {
        let subject = "Reservation confirmed";
        let body = format!(
            "{},\n\nYour reservation at \"{}\" from {} to {} is confirmed.\nTotal price: {}.",
            recipient.name,
            reservation.office.title,
            reservation.start_date,
            reservation.end_date,
            reservation.price
        );
        self.send(&recipient.email, subject, &body).await
    }

    async fn host_reservation_made(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()> {
        let subject = "New reservation on your office";
        let body = format!(
            "{},\n\nYour office \"{}\" was booked from {} to {}.",
            recipient.name,
            reservation.office.title,
            reservation.start_date,
            reservation.end_date
        );
        self.send(&recipient.email, subject, &body).await
    }

    async fn reservation_starting(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()> {
        let subject = "Your reservation starts today";
        let body = format!(
            "{},\n\nYour reservation at \"{}\" starts today and runs until {}.",
            recipient.name, reservation.office.title, reservation.end_date
        );
        self.send(&recipient.email, subject, &body).await
    }

    async fn host_reservation_starting(
        &self,
        recipient: &User,
        reservation: &Reservation,
    ) -> AppResult<()> {
        let subject = "A reservation on your office starts today";
        let body = format!(
            "{},\n\nA reservation on \"{}\" starts today and runs until {}.",
            recipient.name, reservation.office.title, reservation.end_date
        );
        self.send(&recipient.email, subject, &body).await
    }
}
