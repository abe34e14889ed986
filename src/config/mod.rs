use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub membership: MembershipConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default = "default_reset_ttl")]
    pub password_reset_ttl_minutes: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_reset_ttl() -> i64 {
    60
}

/// Fees are in the smallest currency unit.
#[derive(Debug, Deserialize, Clone)]
pub struct MembershipConfig {
    pub currency: String,
    pub regular_fee_cents: i64,
    pub vip_fee_cents: i64,
    pub upgrade_fee_cents: i64,
    pub minimum_age: u32,
    pub clubs: Vec<String>,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            currency: "eur".to_string(),
            regular_fee_cents: 2500,
            vip_fee_cents: 5000,
            upgrade_fee_cents: 2500,
            minimum_age: 21,
            clubs: vec!["El Jardin Verde".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Accounts with these emails get the admin surface even without the
    /// admin flag on their member record.
    #[serde(default)]
    pub emails: Vec<String>,
}

impl AdminConfig {
    pub fn is_allowed(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub uploads_dir: String,
    pub max_image_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: "uploads".to_string(),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EmailConfig {
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://clubpass.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("stripe.enabled", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with CLUBPASS__ prefix, double underscore separates levels)
            .add_source(
                Environment::with_prefix("CLUBPASS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.emails")
                    .with_list_parse_key("membership.clubs")
                    .try_parsing(true),
            )

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://clubpass.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                password_reset_ttl_minutes: default_reset_ttl(),
                secure_cookies: false,
            },
            membership: MembershipConfig::default(),
            admin: AdminConfig::default(),
            storage: StorageConfig::default(),
            stripe: StripeConfig {
                secret_key: None,
                enabled: false,
            },
            email: EmailConfig { smtp: None },
        }
    }
}
