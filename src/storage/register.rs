use crate::errors::Result;
use crate::storage::Storage;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedStorageFuture = Pin<Box<dyn Future<Output = Result<Box<dyn Storage>>> + Send>>;
pub type StorageConstructor = Arc<dyn Fn() -> BoxedStorageFuture + Send + Sync>;

async fn build_sea_orm_storage() -> Result<Box<dyn Storage>> {
    let storage = super::sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Box::new(storage))
}

async fn build_memory_storage() -> Result<Box<dyn Storage>> {
    Ok(Box::new(super::memory_storage::MemoryStorage::new()))
}

static STORAGE_REGISTRY: Lazy<RwLock<HashMap<String, StorageConstructor>>> = Lazy::new(|| {
    let mut builtin: HashMap<String, StorageConstructor> = HashMap::new();
    builtin.insert(
        "sea_orm".to_string(),
        Arc::new(|| -> BoxedStorageFuture { Box::pin(build_sea_orm_storage()) }),
    );
    builtin.insert(
        "memory".to_string(),
        Arc::new(|| -> BoxedStorageFuture { Box::pin(build_memory_storage()) }),
    );
    RwLock::new(builtin)
});

pub fn register_storage_plugin<S: Into<String>>(name: S, constructor: StorageConstructor) {
    let name = name.into();
    let mut registry = STORAGE_REGISTRY
        .write()
        .expect("Storage registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_storage_plugin(name: &str) -> Option<StorageConstructor> {
    STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_storage_registry() {
    let registry = STORAGE_REGISTRY
        .read()
        .expect("Storage registry lock poisoned");
    tracing::debug!("Registered storage plugins:");
    for key in registry.keys() {
        tracing::debug!(" - {}", key);
    }
}
