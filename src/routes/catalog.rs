use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::catalog::requests::{
    CatalogListParams, CreateClassRequest, CreateCourseRequest, CreateSubjectRequest,
    UpdateClassRequest, UpdateCourseRequest, UpdateSubjectRequest,
};
use crate::models::profiles::entities::UserType;
use crate::services::CatalogService;
use crate::utils::SafeIDI64;

// 懒加载的全局 CatalogService 实例
static CATALOG_SERVICE: Lazy<CatalogService> = Lazy::new(CatalogService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CatalogListParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.get_course(id.0, &req).await
}

pub async fn update_course(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE
        .update_course(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.delete_course(id.0, &req).await
}

pub async fn list_subjects(
    req: HttpRequest,
    query: web::Query<CatalogListParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.list_subjects(query.into_inner(), &req).await
}

pub async fn create_subject(
    req: HttpRequest,
    body: web::Json<CreateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.create_subject(body.into_inner(), &req).await
}

pub async fn get_subject(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.get_subject(id.0, &req).await
}

pub async fn update_subject(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE
        .update_subject(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_subject(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.delete_subject(id.0, &req).await
}

pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<CatalogListParams>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.list_classes(query.into_inner(), &req).await
}

pub async fn create_class(
    req: HttpRequest,
    body: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.create_class(body.into_inner(), &req).await
}

pub async fn get_class(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.get_class(id.0, &req).await
}

pub async fn update_class(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE
        .update_class(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_class(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    CATALOG_SERVICE.delete_class(id.0, &req).await
}

// 配置路由：课程、科目、班级，读对本校所有成员开放
pub fn configure_catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(
                        web::post()
                            .to(create_course)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_course))
                    .route(
                        web::put()
                            .to(update_course)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_course)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/subjects")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_subjects))
                    .route(
                        web::post()
                            .to(create_subject)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_subject))
                    .route(
                        web::put()
                            .to(update_subject)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_subject)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_classes))
                    .route(
                        web::post()
                            .to(create_class)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_class))
                    .route(
                        web::put()
                            .to(update_class)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_class)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
}
