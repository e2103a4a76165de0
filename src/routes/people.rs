use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::people::requests::{
    CreateGuardianRequest, CreateStudentRequest, CreateTeacherRequest, PeopleListParams,
    UpdateGuardianRequest, UpdateStudentRequest, UpdateTeacherRequest,
};
use crate::models::profiles::entities::UserType;
use crate::services::PeopleService;
use crate::utils::SafeIDI64;

// 懒加载的全局 PeopleService 实例
static PEOPLE_SERVICE: Lazy<PeopleService> = Lazy::new(PeopleService::new_lazy);

/// 教职工加学生本人（业务层限制学生只能看自己）
const STUDENT_READERS: &[UserType] = &[
    UserType::Admin,
    UserType::School,
    UserType::Teacher,
    UserType::Student,
];

pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<PeopleListParams>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.list_teachers(query.into_inner(), &req).await
}

pub async fn create_teacher(
    req: HttpRequest,
    body: web::Json<CreateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.create_teacher(body.into_inner(), &req).await
}

pub async fn get_teacher(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.get_teacher(id.0, &req).await
}

pub async fn update_teacher(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE
        .update_teacher(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_teacher(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.delete_teacher(id.0, &req).await
}

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<PeopleListParams>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.list_students(query.into_inner(), &req).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.create_student(body.into_inner(), &req).await
}

pub async fn get_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.get_student(id.0, &req).await
}

pub async fn update_student(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE
        .update_student(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.delete_student(id.0, &req).await
}

pub async fn list_guardians(
    req: HttpRequest,
    query: web::Query<PeopleListParams>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.list_guardians(query.into_inner(), &req).await
}

pub async fn create_guardian(
    req: HttpRequest,
    body: web::Json<CreateGuardianRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.create_guardian(body.into_inner(), &req).await
}

pub async fn get_guardian(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.get_guardian(id.0, &req).await
}

pub async fn update_guardian(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateGuardianRequest>,
) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE
        .update_guardian(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_guardian(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.delete_guardian(id.0, &req).await
}

pub async fn list_my_students(req: HttpRequest) -> ActixResult<HttpResponse> {
    PEOPLE_SERVICE.list_my_students(&req).await
}

// 配置路由
pub fn configure_people_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teachers")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_teachers)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_teacher)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_teacher)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_teacher)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_teacher)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_students)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_student)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_student)
                            .wrap(RequireRole::new_any(STUDENT_READERS)),
                    )
                    .route(
                        web::put()
                            .to(update_student)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_student)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
    cfg.service(
        web::scope("/api/v1/guardians")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_guardians)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_guardian)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/me/students").route(
                    web::get()
                        .to(list_my_students)
                        .wrap(RequireRole::new_any(UserType::guardian_roles())),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_guardian)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_guardian)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_guardian)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );
}
