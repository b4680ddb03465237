pub mod client;
pub mod event;
pub mod rate_limiter;
pub mod paginator;

pub use client::{GitHubClient, InlineComment, ReviewPayload};
pub use event::load_event_context;
pub use rate_limiter::RateLimiter;
pub use paginator::Paginator;
