use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::profiles::entities::UserType;
use crate::models::profiles::requests::{
    CreateProfileRequest, ProfileListParams, UpdateProfileRequest,
};
use crate::services::ProfileService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ProfileService 实例
static PROFILE_SERVICE: Lazy<ProfileService> = Lazy::new(ProfileService::new_lazy);

pub async fn list_profiles(
    req: HttpRequest,
    query: web::Query<ProfileListParams>,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE
        .list_profiles(query.into_inner(), &req)
        .await
}

pub async fn create_profile(
    req: HttpRequest,
    profile_data: web::Json<CreateProfileRequest>,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE
        .create_profile(profile_data.into_inner(), &req)
        .await
}

pub async fn get_profile(req: HttpRequest, profile_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE.get_profile(profile_id.0, &req).await
}

pub async fn update_profile(
    req: HttpRequest,
    profile_id: SafeIDI64,
    update_data: web::Json<UpdateProfileRequest>,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE
        .update_profile(profile_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_profile(req: HttpRequest, profile_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE.delete_profile(profile_id.0, &req).await
}

// 配置路由
pub fn configure_profile_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/profiles")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserType::admin_roles()))
                    .route("", web::get().to(list_profiles))
                    .route("", web::post().to(create_profile))
                    .route("/{id}", web::get().to(get_profile))
                    .route("/{id}", web::put().to(update_profile))
                    .route("/{id}", web::delete().to(delete_profile)),
            ),
    );
}
