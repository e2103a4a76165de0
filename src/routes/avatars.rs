use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::avatars::requests::{CreateAvatarRequest, UpdateAvatarRequest};
use crate::models::profiles::entities::UserType;
use crate::services::AvatarService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AvatarService 实例
static AVATAR_SERVICE: Lazy<AvatarService> = Lazy::new(AvatarService::new_lazy);

pub async fn list_avatars(req: HttpRequest) -> ActixResult<HttpResponse> {
    AVATAR_SERVICE.list_avatars(&req).await
}

pub async fn create_avatar(
    req: HttpRequest,
    body: web::Json<CreateAvatarRequest>,
) -> ActixResult<HttpResponse> {
    AVATAR_SERVICE.create_avatar(body.into_inner(), &req).await
}

pub async fn update_avatar(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateAvatarRequest>,
) -> ActixResult<HttpResponse> {
    AVATAR_SERVICE
        .update_avatar(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_avatar(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    AVATAR_SERVICE.delete_avatar(id.0, &req).await
}

pub async fn equip_avatar(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    AVATAR_SERVICE.equip_avatar(id.0, &req).await
}

// 配置路由
pub fn configure_avatar_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/avatars")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_avatars))
                    .route(
                        web::post()
                            .to(create_avatar)
                            .wrap(RequireRole::new_any(UserType::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::put().to(update_avatar))
                    .route(web::delete().to(delete_avatar))
                    .wrap(RequireRole::new_any(UserType::admin_roles())),
            )
            .service(
                web::resource("/{id}/equip").route(
                    web::post()
                        .to(equip_avatar)
                        .wrap(RequireRole::new(UserType::Student)),
                ),
            ),
    );
}
