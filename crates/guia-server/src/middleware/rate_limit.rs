//! Per-client request ceiling for the export route.
//!
//! Fixed-window counting keyed by client IP address. Excess requests are
//! rejected with `429 Too Many Requests` rather than queued, which bounds
//! how many browser instances a single client can make us launch.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, client: IpAddr) -> Decision {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.window);

        let entry = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if entry.count >= self.limit {
            let elapsed = now.saturating_duration_since(entry.started);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }
        entry.count += 1;
        Decision::Allowed {
            remaining: self.limit - entry.count,
        }
    }

    /// Human-readable limit, e.g. `5 per 1 minute`.
    pub fn describe(&self) -> String {
        let secs = self.window.as_secs();
        let (amount, unit) = if secs > 0 && secs % 3600 == 0 {
            (secs / 3600, "hour")
        } else if secs > 0 && secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };
        let plural = if amount == 1 { "" } else { "s" };
        format!("{} per {amount} {unit}{plural}", self.limit)
    }

    /// Number of clients with an open window.
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Requests without connection info (e.g. in-process calls) share one bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_ip(&req);
    match limiter.check(client) {
        Decision::Allowed { remaining } => {
            tracing::debug!(%client, remaining, "rate limit check passed");
            next.run(req).await
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(%client, retry_after_secs = retry_after.as_secs(), "rate limit exceeded");
            ApiError::RateLimited {
                description: limiter.describe(),
                retry_after,
            }
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn sixth_request_in_window_is_limited() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();
        for expected_remaining in (0..5).rev() {
            assert_eq!(
                limiter.check_at(CLIENT, now),
                Decision::Allowed {
                    remaining: expected_remaining
                }
            );
        }
        let later = now + Duration::from_secs(20);
        assert_eq!(
            limiter.check_at(CLIENT, later),
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(matches!(limiter.check_at(CLIENT, now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check_at(OTHER, now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check_at(CLIENT, now), Decision::Limited { .. }));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(matches!(limiter.check_at(CLIENT, now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check_at(CLIENT, now), Decision::Limited { .. }));
        let next_window = now + Duration::from_secs(60);
        assert!(matches!(limiter.check_at(CLIENT, next_window), Decision::Allowed { .. }));
    }

    #[test]
    fn expired_windows_are_pruned() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();
        limiter.check_at(CLIENT, now);
        limiter.check_at(OTHER, now);
        assert_eq!(limiter.tracked_clients(), 2);
        limiter.check_at(CLIENT, now + Duration::from_secs(61));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn describe_uses_largest_whole_unit() {
        assert_eq!(RateLimiter::new(5, Duration::from_secs(60)).describe(), "5 per 1 minute");
        assert_eq!(RateLimiter::new(10, Duration::from_secs(7200)).describe(), "10 per 2 hours");
        assert_eq!(RateLimiter::new(3, Duration::from_secs(45)).describe(), "3 per 45 seconds");
    }
}
