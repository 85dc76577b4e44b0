use crate::models::{BreedCount, BreedRecord, BreedStat};
use crate::services::store::{StatsStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-process store with the same semantics as the PostgreSQL tables
///
/// Used by tests.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<(Uuid, BreedRecord)>>,
    stats: Mutex<HashMap<(String, String), i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<BreedRecord> {
        self.records
            .lock()
            .await
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    async fn totals_by<F>(&self, key: F) -> Vec<BreedCount>
    where
        F: Fn(&(String, String)) -> &String,
    {
        let stats = self.stats.lock().await;
        let mut totals: HashMap<&String, i64> = HashMap::new();
        for (pair, count) in stats.iter() {
            *totals.entry(key(pair)).or_insert(0) += count;
        }

        let mut counts: Vec<BreedCount> = totals
            .into_iter()
            .map(|(id, count)| BreedCount { id: id.clone(), count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
        counts
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn insert_record(&self, record: &BreedRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.records.lock().await.push((id, record.clone()));
        Ok(id)
    }

    async fn increment_stat(&self, breed: &str, breed_group: &str) -> Result<BreedStat, StoreError> {
        let mut stats = self.stats.lock().await;
        let count = stats
            .entry((breed.to_string(), breed_group.to_string()))
            .or_insert(0);
        *count += 1;

        Ok(BreedStat {
            breed: breed.to_string(),
            breed_group: breed_group.to_string(),
            count: *count,
        })
    }

    async fn list_stats(&self) -> Result<Vec<BreedStat>, StoreError> {
        let stats = self.stats.lock().await;
        let mut list: Vec<BreedStat> = stats
            .iter()
            .map(|((breed, breed_group), count)| BreedStat {
                breed: breed.clone(),
                breed_group: breed_group.clone(),
                count: *count,
            })
            .collect();
        list.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.breed.cmp(&b.breed))
                .then_with(|| a.breed_group.cmp(&b.breed_group))
        });
        Ok(list)
    }

    async fn totals_by_breed(&self) -> Result<Vec<BreedCount>, StoreError> {
        Ok(self.totals_by(|(breed, _)| breed).await)
    }

    async fn totals_by_group(&self) -> Result<Vec<BreedCount>, StoreError> {
        Ok(self.totals_by(|(_, group)| group).await)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_creates_then_increments() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_stat("Pug", "Toy").await.unwrap().count, 1);
        assert_eq!(store.increment_stat("Pug", "Toy").await.unwrap().count, 2);
        assert_eq!(store.increment_stat("Pug", "Companion").await.unwrap().count, 1);

        let stats = store.list_stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].breed_group, "Toy");
    }

    #[tokio::test]
    async fn test_totals_are_summed_and_sorted() {
        let store = MemoryStore::new();
        store.increment_stat("Pug", "Toy").await.unwrap();
        store.increment_stat("Chihuahua", "Toy").await.unwrap();
        store.increment_stat("Beagle", "Hound").await.unwrap();
        store.increment_stat("Beagle", "Hound").await.unwrap();
        store.increment_stat("Beagle", "Scent").await.unwrap();

        let by_breed = store.totals_by_breed().await.unwrap();
        assert_eq!(by_breed[0], BreedCount { id: "Beagle".into(), count: 3 });
        assert_eq!(by_breed.len(), 3);

        let by_group = store.totals_by_group().await.unwrap();
        assert_eq!(by_group[0].count, 2);
        assert_eq!(by_group[0].id, "Hound");
        assert_eq!(by_group[1].id, "Toy");
        assert_eq!(by_group[2], BreedCount { id: "Scent".into(), count: 1 });
    }
}
