pub mod traits;
pub mod error;
pub mod http;
pub mod paginate;
pub mod factory;
pub mod tmdb;
pub mod ranking;
pub mod host;

pub use traits::{MediaRecognizer, NotificationSink, SubscriptionService, TrendSource};
pub use error::SourceError;
pub use paginate::{paginate, PageSettings};
pub use factory::{SourceFactory, SourceProvider};
pub use host::HostClient;
