pub mod category;
pub mod trend_item;
pub mod history;
pub mod subscription;
pub mod notification;

pub use category::{Category, MediaKind};
pub use trend_item::{TrendItem, ANIMATION_GENRE_ID};
pub use history::{AddedItem, HistoryRecord};
pub use subscription::{RecognizedMedia, SubscriptionRequest};
pub use notification::Notification;
