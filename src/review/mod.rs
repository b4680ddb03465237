pub mod collector;
pub mod dispatcher;
pub mod pipeline;
pub mod publisher;

pub use collector::{select_files, CollectedFiles, DiffCollector};
pub use dispatcher::ReviewerDispatcher;
pub use pipeline::ReviewPipeline;
pub use publisher::{build_review, CommentPublisher, PublishOutcome};
