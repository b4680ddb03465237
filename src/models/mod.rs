pub mod pull_request;
pub mod review;

pub use pull_request::*;
pub use review::*;
