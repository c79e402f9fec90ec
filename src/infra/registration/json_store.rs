use crate::core::registration::{
    normalize_ign, record_key, CanonicalIgn, PlayerClass, RegistrationRecord, RegistrationStore,
    RegistrationTable, StoreError,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// JSON-file registration store. The whole table lives in one document:
/// { normalized_ign: RegistrationRecord }
///
/// Nothing is cached; every call reads the file, and every write rewrites it.
/// A missing, empty or unparsable file (or one that isn't a JSON object)
/// reads as an empty table. Entries that don't decode as records are hidden
/// from reads but written back untouched.
pub struct JsonRegistrationStore {
    path: PathBuf,
    // Held across read-modify-write so writes from this process never interleave.
    io_lock: Mutex<()>,
}

impl JsonRegistrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty `{}` document if missing.
    async fn ensure_store(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if fs::metadata(&self.path).await.is_err() {
            fs::write(&self.path, "{}").await?;
        }

        Ok(())
    }

    async fn load(&self) -> Result<Document, StoreError> {
        self.ensure_store().await?;

        let raw = fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(Document::default());
        }

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Registration file is not a JSON object, treating it as empty"
                );
                return Ok(Document::default());
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Registration file is not valid JSON, treating it as empty: {}",
                    e
                );
                return Ok(Document::default());
            }
        };

        Ok(Document::from_entries(entries, &self.path))
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        self.ensure_store().await?;
        let text = serde_json::to_string_pretty(&document.to_entries()?)?;
        fs::write(&self.path, text).await?;
        Ok(())
    }
}

/// Decoded file contents.
#[derive(Debug, Default)]
struct Document {
    records: RegistrationTable,
    // Raw entries that failed to decode, kept so a save doesn't drop them.
    unreadable: Map<String, Value>,
}

impl Document {
    fn from_entries(entries: Map<String, Value>, path: &Path) -> Self {
        let mut document = Document::default();

        for (key, value) in entries {
            match serde_json::from_value::<RegistrationRecord>(value.clone()) {
                Ok(record) => {
                    document.records.insert(key, record);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        key = %key,
                        "Skipping unreadable registration entry: {}",
                        e
                    );
                    document.unreadable.insert(key, value);
                }
            }
        }

        document
    }

    fn to_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let mut entries = self.unreadable.clone();
        for (key, record) in &self.records {
            entries.insert(key.clone(), serde_json::to_value(record)?);
        }
        Ok(entries)
    }
}

#[async_trait]
impl RegistrationStore for JsonRegistrationStore {
    async fn get(&self, name: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.load().await?;
        Ok(document.records.remove(&normalize_ign(name)))
    }

    async fn set(
        &self,
        ign: &CanonicalIgn,
        user_id: &str,
        class: PlayerClass,
    ) -> Result<RegistrationRecord, StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.load().await?;

        let record = RegistrationRecord {
            ign: ign.as_str().to_string(),
            user_id: user_id.to_string(),
            class_name: class.label().to_string(),
            updated_at: chrono::Utc::now(),
        };
        document.unreadable.remove(ign.key());
        document.records.insert(ign.key().to_string(), record.clone());

        self.save(&document).await?;
        Ok(record)
    }

    async fn restore(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.load().await?;
        let key = record_key(&record);
        document.unreadable.remove(&key);
        document.records.insert(key, record);
        self.save(&document).await
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.load().await?;
        let key = normalize_ign(name);

        // An unreadable entry can still be cleared by name.
        let removed_record = document.records.remove(&key).is_some();
        let removed_raw = document.unreadable.remove(&key).is_some();
        if !removed_record && !removed_raw {
            return Ok(false);
        }

        self.save(&document).await?;
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<RegistrationRecord>, StoreError> {
        let _guard = self.io_lock.lock().await;
        Ok(self.load().await?.records.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registration::AllowList;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonRegistrationStore {
        JsonRegistrationStore::new(dir.path().join("data").join("registrations.json"))
    }

    #[tokio::test]
    async fn creates_an_empty_document_on_first_access() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.list_all().await.unwrap().is_empty());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{}");
    }

    #[tokio::test]
    async fn set_then_get_survives_a_reload() {
        let dir = TempDir::new().unwrap();
        let allow_list = AllowList::default();
        let ign = allow_list.canonical_of("XMADS ").unwrap();

        let store = store_in(&dir);
        store.set(&ign, "user1", PlayerClass::Berserker).await.unwrap();

        let reopened = store_in(&dir);
        let record = reopened.get("xmads").await.unwrap().unwrap();
        assert_eq!(record.ign, "xMads");
        assert_eq!(record.user_id, "user1");
        assert_eq!(record.class_name, "Berserker");

        assert!(!reopened.is_available("xmads", "user2").await.unwrap());
        assert!(reopened.is_available("xmads", "user1").await.unwrap());
        assert!(reopened.is_available("fize", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn document_layout_is_keyed_by_normalized_name() {
        let dir = TempDir::new().unwrap();
        let allow_list = AllowList::default();
        let store = store_in(&dir);
        store
            .set(&allow_list.canonical_of("TESTEROSSAA").unwrap(), "9", PlayerClass::Skald)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value["testerossaa"];
        assert_eq!(entry["ign"], "TESTEROSSAA");
        assert_eq!(entry["userId"], "9");
        assert_eq!(entry["className"], "Skald");
        assert!(entry["updatedAt"].as_str().is_some());
    }

    #[tokio::test]
    async fn malformed_document_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        for garbage in ["{not json", "[1, 2, 3]", "   ", "null"] {
            std::fs::write(store.path(), garbage).unwrap();
            assert!(store.list_all().await.unwrap().is_empty());
            assert!(store.get("xmads").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn remove_missing_key_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let allow_list = AllowList::default();
        let store = store_in(&dir);
        store
            .set(&allow_list.canonical_of("Fize").unwrap(), "1", PlayerClass::Archer)
            .await
            .unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        assert!(!store.remove("nobody").await.unwrap());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);

        assert!(store.remove("FIZE").await.unwrap());
        assert!(store.get("fize").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_puts_a_snapshot_back() {
        let dir = TempDir::new().unwrap();
        let allow_list = AllowList::default();
        let store = store_in(&dir);
        let ign = allow_list.canonical_of("Spades").unwrap();

        let original = store.set(&ign, "1", PlayerClass::Archer).await.unwrap();
        store.set(&ign, "1", PlayerClass::Warlord).await.unwrap();
        store.restore(original.clone()).await.unwrap();

        assert_eq!(store.get("spades").await.unwrap(), Some(original));
    }

    fn write_mixed_document(store: &JsonRegistrationStore) {
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let raw = r#"{
            "xmads": {"ign": "xMads", "userId": "user1", "className": "Berserker", "updatedAt": "2024-05-01T12:00:00Z"},
            "fize": {"ign": "Fize", "userId": "user2", "className": "Skald"}
        }"#;
        std::fs::write(store.path(), raw).unwrap();
    }

    #[tokio::test]
    async fn one_bad_entry_does_not_hide_the_rest() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        write_mixed_document(&store);

        let record = store.get("xmads").await.unwrap().unwrap();
        assert_eq!(record.user_id, "user1");
        assert!(!store.is_available("xmads", "user3").await.unwrap());
        assert!(store.get("fize").await.unwrap().is_none());
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn writes_keep_good_and_bad_entries() {
        let dir = TempDir::new().unwrap();
        let allow_list = AllowList::default();
        let store = store_in(&dir);
        write_mixed_document(&store);

        store
            .set(&allow_list.canonical_of("Venzo").unwrap(), "user3", PlayerClass::Archer)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["xmads"]["userId"], "user1");
        assert_eq!(value["fize"]["userId"], "user2");
        assert!(value["fize"].get("updatedAt").is_none());
        assert_eq!(value["venzo"]["userId"], "user3");

        // Officers can still clear the broken entry by name.
        assert!(store.remove("Fize").await.unwrap());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("fize").is_none());
        assert_eq!(value["xmads"]["userId"], "user1");
    }
}
