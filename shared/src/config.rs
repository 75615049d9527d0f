use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: std::env::var("REDIS_HOST")?,
            port: std::env::var("REDIS_PORT")?.parse()?,
        };
        // Mail delivery is optional; without an endpoint the notifier no-ops.
        let mail = match std::env::var("MAIL_ENDPOINT") {
            Ok(endpoint) => Some(MailConfig {
                endpoint,
                token: std::env::var("MAIL_TOKEN")?,
            }),
            Err(_) => None,
        };
        Ok(Self {
            database,
            redis,
            mail,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct MailConfig {
    pub endpoint: String,
    pub token: String,
}
