use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use eyre::WrapErr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use guia_core::models::page::Margins;
use guia_export::pdf::ChromeOptions;
use guia_export::styles::PrintLayout;

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`. Permissive; restrict in production.
    Any,
    List(Vec<String>),
}

impl FromStr for CorsOrigins {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Ok(CorsOrigins::Any)
        } else {
            Ok(CorsOrigins::List(origins))
        }
    }
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: CorsOrigins,
    /// Brand logo. Missing files fall back to the text wordmark.
    pub logo_path: PathBuf,
    /// Export requests allowed per client per window.
    pub rate_limit: u32,
    pub rate_window: Duration,
    /// Overall deadline for one render (launch + load + print).
    pub render_timeout: Duration,
    /// Bound on the network-quiescence wait.
    pub settle_timeout: Duration,
    pub chrome_path: Option<PathBuf>,
    pub chrome_no_sandbox: bool,
    pub margins: Margins,
    pub print_scale: f64,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8001,
            cors_origins: CorsOrigins::Any,
            logo_path: PathBuf::from("assets/logo.png"),
            rate_limit: 5,
            rate_window: Duration::from_secs(60),
            render_timeout: Duration::from_secs(60),
            settle_timeout: Duration::from_secs(30),
            chrome_path: None,
            chrome_no_sandbox: false,
            margins: Margins::default(),
            print_scale: 0.9,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GUIA_HOST") {
            config.host = parse("GUIA_HOST", &v)?;
        }
        if let Some(v) = get("GUIA_PORT") {
            config.port = parse("GUIA_PORT", &v)?;
        }
        if let Some(v) = get("GUIA_CORS_ORIGINS") {
            config.cors_origins = parse("GUIA_CORS_ORIGINS", &v)?;
        }
        if let Some(v) = get("GUIA_LOGO_PATH") {
            config.logo_path = PathBuf::from(v);
        }
        if let Some(v) = get("GUIA_RATE_LIMIT") {
            config.rate_limit = parse("GUIA_RATE_LIMIT", &v)?;
        }
        if let Some(v) = get("GUIA_RATE_WINDOW_SECS") {
            config.rate_window = Duration::from_secs(parse("GUIA_RATE_WINDOW_SECS", &v)?);
        }
        if let Some(v) = get("GUIA_RENDER_TIMEOUT_SECS") {
            config.render_timeout = Duration::from_secs(parse("GUIA_RENDER_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("GUIA_SETTLE_TIMEOUT_SECS") {
            config.settle_timeout = Duration::from_secs(parse("GUIA_SETTLE_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("CHROME_PATH") {
            config.chrome_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("GUIA_CHROME_NO_SANDBOX") {
            config.chrome_no_sandbox = parse_flag("GUIA_CHROME_NO_SANDBOX", &v)?;
        }
        if let Some(v) = get("GUIA_PAGE_MARGINS_MM") {
            config.margins = parse("GUIA_PAGE_MARGINS_MM", &v)?;
        }
        if let Some(v) = get("GUIA_PRINT_SCALE") {
            let scale: f64 = parse("GUIA_PRINT_SCALE", &v)?;
            // Chromium rejects scales outside this range.
            if !(0.1..=2.0).contains(&scale) {
                return Err(eyre::eyre!("GUIA_PRINT_SCALE must be between 0.1 and 2.0, got {scale}"));
            }
            config.print_scale = scale;
        }
        if let Some(v) = get("GUIA_MAX_BODY_BYTES") {
            config.max_body_bytes = parse("GUIA_MAX_BODY_BYTES", &v)?;
        }

        if config.rate_limit == 0 {
            return Err(eyre::eyre!("GUIA_RATE_LIMIT must be at least 1"));
        }
        if config.rate_window.is_zero() {
            return Err(eyre::eyre!("GUIA_RATE_WINDOW_SECS must be at least 1"));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn print_layout(&self) -> PrintLayout {
        PrintLayout {
            margins: self.margins,
            scale: self.print_scale,
            ..PrintLayout::default()
        }
    }

    pub fn chrome_options(&self) -> ChromeOptions {
        ChromeOptions {
            executable: self.chrome_path.clone(),
            no_sandbox: self.chrome_no_sandbox,
            settle_timeout: self.settle_timeout,
        }
    }

    /// CORS policy. The attachment filename header is exposed so browser
    /// clients can read it.
    pub fn cors_layer(&self) -> eyre::Result<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers([header::CONTENT_DISPOSITION]);

        let layer = match &self.cors_origins {
            CorsOrigins::Any => layer.allow_origin(Any),
            CorsOrigins::List(origins) => {
                let values = origins
                    .iter()
                    .map(|o| {
                        HeaderValue::from_str(o)
                            .wrap_err_with(|| format!("invalid CORS origin: {o}"))
                    })
                    .collect::<eyre::Result<Vec<_>>>()?;
                layer.allow_origin(AllowOrigin::list(values))
            }
        };
        Ok(layer)
    }
}

fn parse<T>(key: &str, value: &str) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .wrap_err_with(|| format!("invalid value for {key}: {value:?}"))
}

fn parse_flag(key: &str, value: &str) -> eyre::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(eyre::eyre!("invalid value for {key}: {value:?}")),
    }
}
