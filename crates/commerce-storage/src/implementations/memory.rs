//! In-memory storage backend implementation.
//!
//! This module provides a memory-based implementation of the
//! StorageInterface trait, useful for testing and development scenarios
//! where persistence is not required.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use commerce_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// Stores data in a HashMap behind a read-write lock, providing fast
/// access but no persistence across restarts. The write lock makes the
/// insert-only and counter operations atomic.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn set_bytes_if_absent(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		if store.contains_key(key) {
			return Err(StorageError::Duplicate(key.to_string()));
		}
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	async fn increment(&self, key: &str) -> Result<u64, StorageError> {
		// The write lock is held across the read-modify-write, so
		// concurrent callers always observe distinct values.
		let mut store = self.store.write().await;
		let current = match store.get(key) {
			Some(bytes) => std::str::from_utf8(bytes)
				.ok()
				.and_then(|s| s.parse::<u64>().ok())
				.ok_or_else(|| {
					StorageError::Backend(format!("Counter {} holds a non-numeric value", key))
				})?,
			None => 0,
		};
		let next = current + 1;
		store.insert(key.to_string(), next.to_string().into_bytes());
		Ok(next)
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.keys()
			.filter(|k| k.starts_with(prefix))
			.cloned()
			.collect())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry entry for the memory backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;
	Ok(Box::new(MemoryStorage::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		let key = "test_key";
		let value = b"test_value".to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);

		assert!(storage.exists(key).await.unwrap());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());

		let result = storage.get_bytes(key).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_insert_only_rejects_existing_key() {
		let storage = MemoryStorage::new();

		storage
			.set_bytes_if_absent("claimed", b"first".to_vec())
			.await
			.unwrap();

		let result = storage
			.set_bytes_if_absent("claimed", b"second".to_vec())
			.await;
		assert!(matches!(result, Err(StorageError::Duplicate(k)) if k == "claimed"));

		// Losing writer must not have clobbered the value
		assert_eq!(storage.get_bytes("claimed").await.unwrap(), b"first");
	}

	#[tokio::test]
	async fn test_increment_is_sequential() {
		let storage = MemoryStorage::new();

		assert_eq!(storage.increment("seq").await.unwrap(), 1);
		assert_eq!(storage.increment("seq").await.unwrap(), 2);
		assert_eq!(storage.increment("seq").await.unwrap(), 3);
		// Independent counters do not interfere
		assert_eq!(storage.increment("other").await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_concurrent_increments_yield_distinct_values() {
		let storage = Arc::new(MemoryStorage::new());

		let mut handles = Vec::new();
		for _ in 0..20 {
			let storage = Arc::clone(&storage);
			handles.push(tokio::spawn(
				async move { storage.increment("seq").await },
			));
		}

		let mut seen = Vec::new();
		for handle in handles {
			seen.push(handle.await.unwrap().unwrap());
		}
		seen.sort_unstable();
		let expected: Vec<u64> = (1..=20).collect();
		assert_eq!(seen, expected);
	}

	#[tokio::test]
	async fn test_list_keys_filters_by_prefix() {
		let storage = MemoryStorage::new();

		storage.set_bytes("orders:a", vec![1]).await.unwrap();
		storage.set_bytes("orders:b", vec![2]).await.unwrap();
		storage.set_bytes("tickets:c", vec![3]).await.unwrap();

		let mut keys = storage.list_keys("orders:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:a", "orders:b"]);
	}
}
