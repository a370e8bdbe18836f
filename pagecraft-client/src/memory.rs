use dashmap::DashMap;
use log::debug;
use pagecraft_sections::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::store::{ContentStore, Resource, SettingsDoc};

/// In-process [`ContentStore`] for tests and offline previews.
///
/// Records are kept as JSON exactly as written, so round trips behave like
/// the real API. New records get sequential numeric ids. Failures can be
/// queued with [`fail_next`](MemoryStore::fail_next) to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<Resource, Vec<Value>>,
    settings: DashMap<SettingsDoc, Value>,
    next_id: AtomicI64,
    failures: Mutex<Vec<ClientError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection, replacing what was there
    pub fn seed<T: Serialize>(&self, resource: Resource, records: &[T]) -> ClientResult<()> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        for value in &values {
            if let Some(n) = value.get("id").and_then(Value::as_i64) {
                self.next_id.fetch_max(n, Ordering::SeqCst);
            }
        }
        self.records.insert(resource, values);
        Ok(())
    }

    /// Make the next store call fail with `error`
    pub fn fail_next(&self, error: ClientError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(error);
        }
    }

    /// Number of records currently in `resource`
    pub fn count(&self, resource: Resource) -> usize {
        self.records.get(&resource).map(|r| r.len()).unwrap_or(0)
    }

    /// Raw stored JSON, for asserting on exactly what was written
    pub fn raw(&self, resource: Resource) -> Vec<Value> {
        self.records.get(&resource).map(|r| r.clone()).unwrap_or_default()
    }

    fn take_failure(&self) -> ClientResult<()> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| ClientError::Transport("memory store poisoned".to_string()))?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.remove(0))
        }
    }

    fn fresh_id(&self) -> RecordId {
        RecordId::Number(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn find(&self, resource: Resource, key: &str) -> ClientResult<Value> {
        let found = self
            .records
            .get(&resource)
            .and_then(|records| records.iter().find(|record| matches_key(record, key)).cloned());
        found.ok_or_else(|| ClientError::NotFound(format!("{}/{}", resource.path(), key)))
    }
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn matches_key(record: &Value, key: &str) -> bool {
    record_id(record).as_deref() == Some(key) || record.get("slug").and_then(Value::as_str) == Some(key)
}

impl ContentStore for MemoryStore {
    async fn list<T>(&self, resource: Resource) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.take_failure()?;
        let values = self.raw(resource);
        debug!("memory store: list {} ({} records)", resource.path(), values.len());
        Ok(serde_json::from_value(Value::Array(values))?)
    }

    async fn get<T>(&self, resource: Resource, key: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        self.take_failure()?;
        Ok(serde_json::from_value(self.find(resource, key)?)?)
    }

    async fn create<T>(&self, resource: Resource, record: &T) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.take_failure()?;
        let mut value = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut value {
            if matches!(map.get("id"), None | Some(Value::Null)) {
                map.insert("id".to_string(), serde_json::to_value(self.fresh_id())?);
            }
        }
        self.records.entry(resource).or_default().push(value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update<T>(&self, resource: Resource, id: &RecordId, record: &T) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.take_failure()?;
        let key = id.to_string();
        let mut value = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), serde_json::to_value(id)?);
        }
        {
            let mut records = self.records.entry(resource).or_default();
            let slot = records
                .iter_mut()
                .find(|record| record_id(record).as_deref() == Some(key.as_str()))
                .ok_or_else(|| ClientError::NotFound(format!("{}/{}", resource.path(), key)))?;
            *slot = value.clone();
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn delete(&self, resource: Resource, id: &RecordId) -> ClientResult<()> {
        self.take_failure()?;
        let key = id.to_string();
        let mut records = self.records.entry(resource).or_default();
        let before = records.len();
        records.retain(|record| record_id(record).as_deref() != Some(key.as_str()));
        if records.len() == before {
            return Err(ClientError::NotFound(format!("{}/{}", resource.path(), key)));
        }
        Ok(())
    }

    async fn settings(&self, doc: SettingsDoc) -> ClientResult<Value> {
        self.take_failure()?;
        Ok(self
            .settings
            .get(&doc)
            .map(|v| v.clone())
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn put_settings(&self, doc: SettingsDoc, value: &Value) -> ClientResult<Value> {
        self.take_failure()?;
        self.settings.insert(doc, value.clone());
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_sections::{Page, Service};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_ids_and_get_accepts_slug() {
        let store = MemoryStore::new();
        let created: Page = store.create(Resource::Pages, &Page::new("Home", "home")).await.unwrap();
        assert_eq!(created.id, Some(RecordId::Number(1)));

        let by_slug: Page = store.get(Resource::Pages, "home").await.unwrap();
        let by_id: Page = store.get(Resource::Pages, "1").await.unwrap();
        assert_eq!(by_slug, created);
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn seeded_ids_are_not_reused() {
        let store = MemoryStore::new();
        store
            .seed(Resource::Services, &[json!({ "id": 7, "slug": "web", "title": "Web" })])
            .unwrap();
        let created: Service = store.create(Resource::Services, &Service::default()).await.unwrap();
        assert_eq!(created.id, Some(RecordId::Number(8)));
        assert_eq!(store.services().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn queued_failure_hits_next_call_only() {
        let store = MemoryStore::new();
        store.fail_next(ClientError::Unauthorized);
        assert_eq!(store.pages().await, Err(ClientError::Unauthorized));
        assert_eq!(store.pages().await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn update_and_delete_missing_records() {
        let store = MemoryStore::new();
        let missing = RecordId::Number(3);
        let result: ClientResult<Page> = store.update(Resource::Pages, &missing, &Page::default()).await;
        assert!(matches!(result, Err(ClientError::NotFound(_))));
        assert!(matches!(
            store.delete(Resource::Pages, &missing).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn settings_documents_are_independent() {
        let store = MemoryStore::new();
        store
            .put_settings(SettingsDoc::Header, &json!({ "logo": "/logo.svg" }))
            .await
            .unwrap();
        assert_eq!(store.settings(SettingsDoc::Header).await.unwrap(), json!({ "logo": "/logo.svg" }));
        assert_eq!(store.settings(SettingsDoc::About).await.unwrap(), json!({}));
    }
}
