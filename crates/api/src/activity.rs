use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Entries kept before the oldest is dropped.
pub const ACTIVITY_CAPACITY: usize = 50;

/// Bounded, timestamped feed of connection and bot events shown on the dashboard.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: RwLock<VecDeque<String>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: impl AsRef<str>) {
        let line = format!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            message.as_ref()
        );
        let mut entries = self.entries.write().await;
        entries.push_back(line);
        while entries.len() > ACTIVITY_CAPACITY {
            entries.pop_front();
        }
    }

    /// Oldest first.
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.iter().cloned().collect()
    }
}
