pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use crate::models::{
    ErrorCode,
    profiles::entities::{Profile, UserType},
    schools::requests::{CreateSchoolRequest, SchoolListParams, UpdateSchoolRequest},
};
use crate::services::{error_response, tenancy};

define_service!(SchoolService);

impl SchoolService {
    pub async fn list_schools(
        &self,
        query: SchoolListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_schools(self, query, request).await
    }

    pub async fn create_school(
        &self,
        school_data: CreateSchoolRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_school(self, school_data, request).await
    }

    pub async fn get_school(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_school(self, school_id, request).await
    }

    pub async fn current_school(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::current_school(self, request).await
    }

    pub async fn update_school(
        &self,
        school_id: i64,
        update_data: UpdateSchoolRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_school(self, school_id, update_data, request).await
    }

    pub async fn delete_school(
        &self,
        school_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_school(self, school_id, request).await
    }
}

/// 非管理员只能访问自己解析出的学校，其他学校一律按不存在处理
pub(crate) async fn ensure_own_school(
    request: &HttpRequest,
    profile: &Profile,
    school_id: i64,
) -> ActixResult<Option<HttpResponse>> {
    if profile.user_type == UserType::Admin {
        return Ok(None);
    }
    let own = tenancy::caller_school(request, profile).await?;
    if own == Some(school_id) {
        Ok(None)
    } else {
        Ok(Some(school_not_found()))
    }
}

pub(crate) fn school_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::SchoolNotFound,
        "School not found",
    )
}

#[cfg(test)]
mod tests {
    use crate::cache::ObjectCache;
    use crate::models::{
        profiles::entities::{Profile, UserType},
        schools::{entities::ResolutionSource, requests::UpdateSchoolRequest},
    };
    use crate::routes::schools::configure_school_routes;
    use crate::services::tenancy::resolve_cached;
    use crate::storage::{
        SchoolStorage, Storage,
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
    async fn test_director_change_drops_cached_resolutions() {
        let db = SeaOrmStorage::in_memory().await.unwrap();
        let storage: Arc<dyn Storage> = Arc::new(db.clone());
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());

        let admin = test_support::profile(&db, "admin@escola.test", UserType::Admin, None).await;
        let outgoing =
            test_support::profile(&db, "antigo@escola.test", UserType::School, None).await;
        let incoming = test_support::profile(&db, "novo@escola.test", UserType::School, None).await;
        let school = test_support::school(&db, "Escola Aurora").await;
        db.update_school(
            school.id,
            UpdateSchoolRequest {
                director_id: Some(outgoing.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        // 两个账户的解析结果都进入缓存
        let before = resolve_cached(storage.as_ref(), cache.as_ref(), &outgoing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.school_id, school.id);
        assert_eq!(before.source, ResolutionSource::Director);
        assert!(
            resolve_cached(storage.as_ref(), cache.as_ref(), &incoming)
                .await
                .unwrap()
                .is_none()
        );

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .configure(configure_school_routes),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/schools/{}", school.id))
                .insert_header(bearer(&admin))
                .set_json(serde_json::json!({"director_id": incoming.id}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        assert!(
            resolve_cached(storage.as_ref(), cache.as_ref(), &outgoing)
                .await
                .unwrap()
                .is_none()
        );
        let after = resolve_cached(storage.as_ref(), cache.as_ref(), &incoming)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.school_id, school.id);
        assert_eq!(after.source, ResolutionSource::Director);
    }
}
