use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use reqwest::Response;

/// Tracks GitHub's `x-ratelimit-*` headers and optionally caps requests per minute.
///
/// The code search API allows 30 requests per minute for authenticated
/// users, far below the core limit, so search calls go through their own
/// limiter with a soft cap.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
    per_minute: Option<u32>,
}

struct RateLimitState {
    remaining: u32,
    reset_at: Option<Instant>,
    requests_this_minute: u32,
    minute_start: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_cap(None)
    }

    pub fn per_minute(cap: u32) -> Self {
        Self::with_cap(Some(cap))
    }

    fn with_cap(per_minute: Option<u32>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState {
                remaining: u32::MAX,
                reset_at: None,
                requests_this_minute: 0,
                minute_start: Instant::now(),
            })),
            per_minute,
        }
    }

    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        if state.remaining == 0 {
            if let Some(reset_at) = state.reset_at {
                let now = Instant::now();
                if reset_at > now {
                    let wait_duration = reset_at - now;
                    drop(state);
                    tracing::info!("GitHub rate limit exhausted, waiting {:?}", wait_duration);
                    sleep(wait_duration).await;
                    state = self.state.lock().await;
                }
            }
            state.remaining = u32::MAX;
            state.reset_at = None;
        }

        if let Some(cap) = self.per_minute {
            // Re-check after every sleep: other waiters may have used the new window.
            loop {
                let minute_elapsed = state.minute_start.elapsed();
                if minute_elapsed >= Duration::from_secs(60) {
                    state.requests_this_minute = 0;
                    state.minute_start = Instant::now();
                }
                if state.requests_this_minute < cap {
                    break;
                }

                let wait_time = Duration::from_secs(60).saturating_sub(state.minute_start.elapsed());
                drop(state);
                tracing::debug!("Soft rate limiting, waiting {:?}", wait_time);
                sleep(wait_time).await;
                state = self.state.lock().await;
            }
        }

        state.requests_this_minute += 1;
    }

    pub async fn update_from_response(&self, response: &Response) {
        let headers = response.headers();
        let Some(remaining) = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
        else {
            return;
        };

        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let mut state = self.state.lock().await;
        state.remaining = remaining;
        if let Some(reset_timestamp) = reset {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            if reset_timestamp > now {
                state.reset_at = Some(Instant::now() + Duration::from_secs(reset_timestamp - now));
            }
        }
    }

    pub async fn requests_this_minute(&self) -> u32 {
        self.state.lock().await.requests_this_minute
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
