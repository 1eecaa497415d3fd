pub mod filter;
pub mod dedupe;
pub mod history;
pub mod subscriber;
pub mod notify;
pub mod pipeline;
pub mod executor;

pub use filter::{passes, rejection, Rejection, Thresholds};
pub use dedupe::is_duplicate;
pub use history::{History, HistoryStore};
pub use subscriber::{SubscribeOutcome, Subscriber};
pub use notify::compose;
pub use pipeline::{CategoryPlan, RunConfig, RunReport, SkipCounts, TrendPipeline};
pub use executor::{RunError, RunExecutor, Trigger};
