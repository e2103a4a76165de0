use crate::cache::ObjectCache;
use crate::errors::Result;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static OBJECT_CACHE_REGISTRY: Lazy<RwLock<HashMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    let name = name.into();
    let mut registry = OBJECT_CACHE_REGISTRY
        .write()
        .expect("Cache registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    OBJECT_CACHE_REGISTRY
        .read()
        .expect("Cache registry lock poisoned")
        .get(name)
        .cloned()
}

/// 按配置创建缓存实例，找不到或创建失败时回退到 moka
pub async fn create_object_cache(name: &str) -> Result<Box<dyn ObjectCache>> {
    if let Some(constructor) = get_object_cache_plugin(name) {
        match constructor().await {
            Ok(cache) => return Ok(cache),
            Err(e) => tracing::error!("Cache backend '{}' unavailable: {}", name, e),
        }
    } else {
        tracing::warn!("Unknown cache backend '{}'", name);
    }

    let fallback = get_object_cache_plugin("moka").ok_or_else(|| {
        crate::errors::EscolaError::cache_plugin_not_found("moka cache plugin missing")
    })?;
    tracing::warn!("Falling back to in-memory moka cache");
    fallback().await
}

pub fn debug_object_cache_registry() {
    let registry = OBJECT_CACHE_REGISTRY
        .read()
        .expect("Cache registry lock poisoned");
    if registry.is_empty() {
        tracing::debug!("No object cache plugins registered.");
    } else {
        tracing::debug!("Registered object cache plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_plugins_registered() {
        assert!(get_object_cache_plugin("moka").is_some());
        assert!(get_object_cache_plugin("redis").is_some());
        assert!(get_object_cache_plugin("memcached").is_none());
    }

    #[actix_web::test]
    async fn test_unknown_backend_falls_back_to_moka() {
        let cache = create_object_cache("memcached").await.expect("fallback");
        cache.insert_raw("k".into(), "v".into(), 0).await;
        assert_eq!(
            cache.get_raw("k").await,
            crate::cache::CacheResult::Found("v".to_string())
        );
    }
}
