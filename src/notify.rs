use serde::{Deserialize, Serialize};

/// Emitter event name every catalog notification is published under.
pub const NOTIFICATION_EVENT: &str = "library.notification";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    TitleAdded,
    CopiesAdded,
    WaitlistServed,
    TitleRemoved,
}

/// Fire-and-forget event handed to the notification collaborator after a
/// mutation has persisted. Subscriber failures never reach the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub author: String,
    /// Set only for waitlist service events.
    pub requester: Option<String>,
    pub message: String,
}

impl Notification {
    pub fn title_added(title: &str, author: &str) -> Self {
        Notification {
            kind: NotificationKind::TitleAdded,
            title: title.to_string(),
            author: author.to_string(),
            requester: None,
            message: format!("New book added: '{}' by {}", title, author),
        }
    }

    pub fn copies_added(title: &str, author: &str, added: u32) -> Self {
        Notification {
            kind: NotificationKind::CopiesAdded,
            title: title.to_string(),
            author: author.to_string(),
            requester: None,
            message: format!(
                "{} additional copies of '{}' by {} are now available.",
                added, title, author
            ),
        }
    }

    pub fn waitlist_served(title: &str, author: &str, requester: &str) -> Self {
        Notification {
            kind: NotificationKind::WaitlistServed,
            title: title.to_string(),
            author: author.to_string(),
            requester: Some(requester.to_string()),
            message: format!("Book '{}' is now available.", title),
        }
    }

    pub fn title_removed(title: &str, author: &str) -> Self {
        Notification {
            kind: NotificationKind::TitleRemoved,
            title: title.to_string(),
            author: author.to_string(),
            requester: None,
            message: format!("Book '{}' by {} has been removed.", title, author),
        }
    }
}
