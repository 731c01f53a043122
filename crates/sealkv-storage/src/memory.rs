//! In-memory map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{PersistentMap, Result};

/// In-memory map. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryMap {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistentMap for MemoryMap {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|k| (k.clone(), entries.get(k).cloned()))
            .collect())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for (k, v) in pairs {
            entries.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for k in keys {
            entries.remove(k);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_ops() {
        let map = MemoryMap::new();
        assert_eq!(map.get("a").await.unwrap(), None);
        map.set("a", "1").await.unwrap();
        assert_eq!(map.get("a").await.unwrap().as_deref(), Some("1"));
        map.remove("a").await.unwrap();
        map.remove("a").await.unwrap();
        assert_eq!(map.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_ops() {
        let map = MemoryMap::new();
        map.multi_set(&[("b".into(), "2".into()), ("a".into(), "1".into())])
            .await
            .unwrap();
        assert_eq!(map.get_all_keys().await.unwrap(), vec!["a", "b"]);

        let got = map
            .multi_get(&["b".into(), "zz".into(), "a".into()])
            .await
            .unwrap();
        assert_eq!(
            got,
            vec![
                ("b".to_string(), Some("2".to_string())),
                ("zz".to_string(), None),
                ("a".to_string(), Some("1".to_string())),
            ]
        );

        map.multi_remove(&["a".into(), "missing".into()]).await.unwrap();
        assert_eq!(map.get_all_keys().await.unwrap(), vec!["b"]);
    }
}
