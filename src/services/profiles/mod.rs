pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::profiles::requests::{
    CreateProfileRequest, ProfileListParams, UpdateProfileRequest,
};

define_service!(
    /// 账户管理（仅管理员）
    ProfileService
);

impl ProfileService {
    pub async fn list_profiles(
        &self,
        query: ProfileListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_profiles(self, query, request).await
    }

    pub async fn create_profile(
        &self,
        profile_data: CreateProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_profile(self, profile_data, request).await
    }

    pub async fn get_profile(
        &self,
        profile_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_profile(self, profile_id, request).await
    }

    pub async fn update_profile(
        &self,
        profile_id: i64,
        update_data: UpdateProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_profile(self, profile_id, update_data, request).await
    }

    pub async fn delete_profile(
        &self,
        profile_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_profile(self, profile_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{CacheResult, ObjectCache};
    use crate::middlewares::require_jwt::profile_cache_key;
    use crate::models::profiles::entities::{Profile, UserType};
    use crate::routes::profiles::configure_profile_routes;
    use crate::services::tenancy::resolve_cached;
    use crate::storage::{
        Storage,
        sea_orm_storage::{SeaOrmStorage, test_support},
    };
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, http::StatusCode, test, web};
    use std::sync::Arc;

    fn bearer(profile: &Profile) -> (&'static str, String) {
        let token =
            JwtUtils::generate_access_token(profile.id, &profile.user_type.to_string()).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_admin_changes_reach_cached_sessions() {
        let db = SeaOrmStorage::in_memory().await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(db.clone());
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());

        let first = test_support::school(&db, "Escola Primeira").await;
        let second = test_support::school(&db, "Escola Segunda").await;
        let admin = test_support::profile(&db, "admin@escola.test", UserType::Admin, None).await;
        let gestor =
            test_support::profile(&db, "gestor@escola.test", UserType::School, Some(first.id))
                .await;
        let leaving =
            test_support::profile(&db, "saindo@escola.test", UserType::Teacher, None).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .configure(configure_profile_routes),
        )
        .await;

        // 认证通过后因角色被拒，账户此时已进入缓存
        for profile in [&gestor, &leaving] {
            let resp = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/api/v1/profiles")
                    .insert_header(bearer(profile))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            assert!(matches!(
                cache.get_raw(&profile_cache_key(profile.id)).await,
                CacheResult::Found(_)
            ));
        }
        let resolved = resolve_cached(storage.as_ref(), cache.as_ref(), &gestor)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.school_id, first.id);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/profiles/{}", gestor.id))
                .insert_header(bearer(&admin))
                .set_json(serde_json::json!({"school_id": second.id, "status": "suspended"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        assert!(matches!(
            cache.get_raw(&profile_cache_key(gestor.id)).await,
            CacheResult::NotFound
        ));
        let resolved = resolve_cached(storage.as_ref(), cache.as_ref(), &gestor)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.school_id, second.id);

        // 停用立即生效，不再等待缓存过期
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profiles")
                .insert_header(bearer(&gestor))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/profiles/{}", leaving.id))
                .insert_header(bearer(&admin))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profiles")
                .insert_header(bearer(&leaving))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_school_is_bad_request() {
        let db = SeaOrmStorage::in_memory().await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(db.clone());
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());
        let admin = test_support::profile(&db, "admin@escola.test", UserType::Admin, None).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache))
                .configure(configure_profile_routes),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/profiles")
                .insert_header(bearer(&admin))
                .set_json(serde_json::json!({
                    "email": "orfao@escola.test",
                    "password": "Senha1234",
                    "full_name": "Sem Escola",
                    "user_type": "escola",
                    "school_id": 999_999,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(
            storage
                .get_profile_by_email("orfao@escola.test")
                .await
                .unwrap()
                .is_none()
        );
    }
}
