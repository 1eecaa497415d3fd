use media_trend_models::{AddedItem, Notification};

/// One message for the whole run, `None` when nothing was added
pub fn compose(added: &[AddedItem]) -> Option<Notification> {
    if added.is_empty() {
        return None;
    }
    let text = added
        .iter()
        .map(|item| format!("• [{}] {} ({:.1})", item.category, item.title, item.rating))
        .collect::<Vec<_>>()
        .join("\n");
    Some(Notification {
        title: format!("Trendwatch added {} subscription{}", added.len(), if added.len() == 1 { "" } else { "s" }),
        text,
    })
}
