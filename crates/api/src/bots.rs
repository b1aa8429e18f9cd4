use crate::error::ApiError;
use sniper_core::{BotConfig, BotRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    /// id → (creation sequence, record)
    bots: HashMap<Uuid, (u64, BotRecord)>,
}

/// In-memory set of bot records keyed by id.
///
/// Each operation touches a single record under the write lock, so
/// concurrent toggles resolve as last-write-wins.
#[derive(Debug, Default)]
pub struct BotRegistry {
    inner: RwLock<Inner>,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(id.to_string()))
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, config: BotConfig) -> BotRecord {
        let mut inner = self.inner.write().await;
        let mut record = BotRecord::new(config);
        while inner.bots.contains_key(&record.id) {
            record.id = Uuid::new_v4();
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.bots.insert(record.id, (seq, record.clone()));
        record
    }

    /// All records in creation order.
    pub async fn list_all(&self) -> Vec<BotRecord> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&(u64, BotRecord)> = inner.bots.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, bot)| bot.clone()).collect()
    }

    pub async fn get(&self, id: &str) -> Result<BotRecord, ApiError> {
        let key = parse_id(id)?;
        self.inner
            .read()
            .await
            .bots
            .get(&key)
            .map(|(_, bot)| bot.clone())
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<BotRecord, ApiError> {
        self.update(id, |bot| bot.is_active = active).await
    }

    pub async fn toggle(&self, id: &str) -> Result<BotRecord, ApiError> {
        self.update(id, |bot| bot.is_active = !bot.is_active).await
    }

    pub async fn delete(&self, id: &str) -> Result<BotRecord, ApiError> {
        let key = parse_id(id)?;
        self.inner
            .write()
            .await
            .bots
            .remove(&key)
            .map(|(_, bot)| bot)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.bots.len()
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<BotRecord, ApiError>
    where
        F: FnOnce(&mut BotRecord),
    {
        let key = parse_id(id)?;
        let mut inner = self.inner.write().await;
        let (_, bot) = inner
            .bots
            .get_mut(&key)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        apply(bot);
        Ok(bot.clone())
    }
}
