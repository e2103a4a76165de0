use crate::cache::{ObjectCache, register::create_object_cache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::avatars::requests::CreateAvatarRequest;
use crate::models::profiles::entities::{ProfileStatus, UserType};
use crate::models::profiles::requests::NewProfile;
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";

// 名称、图片、解锁经验
const DEFAULT_AVATARS: &[(&str, &str, i64)] = &[
    ("Explorador", "/avatars/explorador.png", 0),
    ("Cientista", "/avatars/cientista.png", 100),
    ("Astronauta", "/avatars/astronauta.png", 500),
    ("Inventor", "/avatars/inventor.png", 1500),
];

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 数据库中没有任何账户时创建默认管理员
async fn seed_admin(storage: &dyn Storage) {
    match storage.count_profiles().await {
        Ok(count) if count > 0 => {
            debug!("Database already has {} profile(s), skipping admin seed", count);
            return;
        }
        Ok(_) => info!("No profiles found, creating default admin account..."),
        Err(e) => {
            warn!("Failed to count profiles: {}, skipping admin seed", e);
            return;
        }
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin = NewProfile {
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password_hash,
        full_name: "Administrator".to_string(),
        user_type: UserType::Admin,
        status: ProfileStatus::Active,
        school_id: None,
        avatar_url: None,
    };

    match storage.create_profile(admin).await {
        Ok(profile) => info!(
            "Default admin account created (ID: {}, email: {})",
            profile.id, profile.email
        ),
        Err(e) => warn!("Failed to create admin account: {}", e),
    }
}

/// 头像目录为空时写入默认头像
async fn seed_avatars(storage: &dyn Storage) {
    match storage.count_avatars().await {
        Ok(0) => {}
        Ok(count) => {
            debug!("Database already has {} avatar(s), skipping avatar seed", count);
            return;
        }
        Err(e) => {
            warn!("Failed to count avatars: {}, skipping avatar seed", e);
            return;
        }
    }

    for (name, image_url, required_xp) in DEFAULT_AVATARS {
        let request = CreateAvatarRequest {
            name: name.to_string(),
            image_url: image_url.to_string(),
            required_xp: *required_xp,
            active: true,
        };
        if let Err(e) = storage.create_avatar(request).await {
            warn!("Failed to seed avatar '{}': {}", name, e);
        }
    }
    info!("Seeded {} default avatars", DEFAULT_AVATARS.len());
}

/// 准备服务器启动的上下文：存储、初始数据与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 进程内只需安装一次，重复安装返回 Err 可忽略
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_async().await?);
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&*storage).await;
    seed_avatars(&*storage).await;

    let cache_type = &AppConfig::get().cache.cache_type;
    let cache: Arc<dyn ObjectCache> = Arc::from(create_object_cache(cache_type).await?);
    warn!("Cache backend initialized ({})", cache_type);

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_seed_is_idempotent() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));

        seed_admin(&*storage).await;
        seed_admin(&*storage).await;
        assert_eq!(storage.count_profiles().await.expect("count"), 1);

        seed_avatars(&*storage).await;
        seed_avatars(&*storage).await;
        assert_eq!(
            storage.count_avatars().await.expect("count") as usize,
            DEFAULT_AVATARS.len()
        );
    }
}
