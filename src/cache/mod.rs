//! 对象缓存层
//!
//! 后端（moka / redis）以插件形式在加载期注册，启动时按 `cache.type` 选择。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端故障或值无法读取
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为秒，0 表示使用默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 在 `ObjectCache` 之上的 JSON 读写
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> CacheResult<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
            Ok(value) => CacheResult::Found(value),
            Err(e) => {
                tracing::debug!("Dropping undecodable cache entry {}: {}", key, e);
                cache.remove(key).await;
                CacheResult::NotFound
            }
        },
        CacheResult::NotFound => CacheResult::NotFound,
        CacheResult::ExistsButNoValue => CacheResult::ExistsButNoValue,
    }
}

pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: String, value: &T, ttl: u64) {
    match serde_json::to_string(value) {
        Ok(json) => cache.insert_raw(key, json, ttl).await,
        Err(e) => tracing::error!("Failed to serialize cache entry {}: {}", key, e),
    }
}

/// 声明并在加载期注册一个缓存插件
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::EscolaError::cache_connection)?;
                        Ok::<Box<dyn $crate::cache::ObjectCache>, $crate::errors::EscolaError>(
                            Box::new(cache),
                        )
                    }) as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;

    #[actix_web::test]
    async fn test_json_helpers_round_trip() {
        let cache = MokaCacheWrapper::new().expect("moka cache");
        insert_json(&cache, "school_of:7".to_string(), &Some(3_i64), 0).await;
        let got: CacheResult<Option<i64>> = get_json(&cache, "school_of:7").await;
        assert_eq!(got, CacheResult::Found(Some(3)));

        cache.remove("school_of:7").await;
        let gone: CacheResult<Option<i64>> = get_json(&cache, "school_of:7").await;
        assert_eq!(gone, CacheResult::NotFound);
    }

    #[actix_web::test]
    async fn test_undecodable_entry_is_dropped() {
        let cache = MokaCacheWrapper::new().expect("moka cache");
        cache
            .insert_raw("pwreset:abc".to_string(), "not json".to_string(), 0)
            .await;
        let got: CacheResult<i64> = get_json(&cache, "pwreset:abc").await;
        assert_eq!(got, CacheResult::NotFound);
        assert_eq!(cache.get_raw("pwreset:abc").await, CacheResult::NotFound);
    }
}
