use std::env;

use chrono::Duration;
use log::*;
use redsys_tools::RedsysConfig;

const DEFAULT_ASP_HOST: &str = "127.0.0.1";
const DEFAULT_ASP_PORT: u16 = 8480;
const DEFAULT_PENDING_TIMEOUT: Duration = Duration::hours(2);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The email address the auth proxy must present (in `X-Auth-Email`) to reach the `/api` admin routes.
    /// An empty value locks the admin surface down entirely.
    pub admin_email: String,
    /// The time before an unpaid `Pending` hold is considered abandoned and its slots are released.
    pub pending_timeout: Duration,
    /// The public base URL of this server. The gateway callback and the customer return pages are built from it.
    pub base_url: String,
    /// Redsys gateway credentials and endpoint.
    pub redsys: RedsysConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ASP_HOST.to_string(),
            port: DEFAULT_ASP_PORT,
            database_url: String::default(),
            admin_email: String::default(),
            pending_timeout: DEFAULT_PENDING_TIMEOUT,
            base_url: format!("http://{DEFAULT_ASP_HOST}:{DEFAULT_ASP_PORT}"),
            redsys: RedsysConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ASP_HOST").ok().unwrap_or_else(|| DEFAULT_ASP_HOST.into());
        let port = env::var("ASP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for ASP_PORT. {e} Using the default, {DEFAULT_ASP_PORT}, instead."
                    );
                    DEFAULT_ASP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_ASP_PORT);
        let database_url = env::var("ASP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ ASP_DATABASE_URL is not set. Please set it to the URL for the bookings database.");
            String::default()
        });
        let admin_email = env::var("ASP_ADMIN_EMAIL").ok().unwrap_or_else(|| {
            warn!("🪛️ ASP_ADMIN_EMAIL is not set. The /api admin endpoints will reject every request.");
            String::default()
        });
        let pending_timeout = configure_pending_timeout();
        let base_url = env::var("ASP_BASE_URL").unwrap_or_else(|_| {
            let url = format!("http://{host}:{port}");
            warn!(
                "🪛️ ASP_BASE_URL is not set. Falling back to {url}. The gateway will not be able to reach the \
                 notification endpoint unless this is a publicly routable address."
            );
            url
        });
        let redsys = RedsysConfig::new_from_env_or_default();
        Self { host, port, database_url, admin_email, pending_timeout, base_url, redsys }
    }
}

fn configure_pending_timeout() -> Duration {
    env::var("ASP_PENDING_TIMEOUT_HOURS")
        .map_err(|_| {
            info!(
                "🪛️ ASP_PENDING_TIMEOUT_HOURS is not set. Using the default value of {} hrs.",
                DEFAULT_PENDING_TIMEOUT.num_hours()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for ASP_PENDING_TIMEOUT_HOURS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_PENDING_TIMEOUT)
}
