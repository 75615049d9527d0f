use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::notifier::MailNotifier;
use adapter::redis::RedisClient;
use adapter::repository::{
    auth::AuthRepositoryImpl, health::HealthCheckRepositoryImpl, office::OfficeRepositoryImpl,
    reservation::ReservationRepositoryImpl, tag::TagRepositoryImpl, user::UserRepositoryImpl,
};
use kernel::notifier::Notifier;
use kernel::repository::{
    auth::AuthRepository, health::HealthCheckRepository, office::OfficeRepository,
    reservation::ReservationRepository, tag::TagRepository, user::UserRepository,
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    user_repository: Arc<dyn UserRepository>,
    tag_repository: Arc<dyn TagRepository>,
    office_repository: Arc<dyn OfficeRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    notifier: Arc<dyn Notifier>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(redis_client.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let tag_repository = Arc::new(TagRepositoryImpl::new(pool.clone()));
        let office_repository = Arc::new(OfficeRepositoryImpl::new(pool.clone()));
        let reservation_repository =
            Arc::new(ReservationRepositoryImpl::new(pool.clone(), redis_client));
        let notifier = Arc::new(MailNotifier::new(app_config.mail));
        Self {
            health_check_repository,
            auth_repository,
            user_repository,
            tag_repository,
            office_repository,
            reservation_repository,
            notifier,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn tag_repository(&self) -> Arc<dyn TagRepository> {
        self.tag_repository.clone()
    }

    pub fn office_repository(&self) -> Arc<dyn OfficeRepository> {
        self.office_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }
}
