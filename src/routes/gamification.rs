use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::gamification::requests::{
    AdjustAtomsRequest, AtomTransactionParams, AwardXpRequest, CreateXpRuleRequest,
    SchoolScopedParams, UpdateEconomyRequest, UpdateXpRuleRequest,
};
use crate::models::profiles::entities::UserType;
use crate::services::GamificationService;
use crate::utils::SafeIDI64;

// 懒加载的全局 GamificationService 实例
static GAMIFICATION_SERVICE: Lazy<GamificationService> =
    Lazy::new(GamificationService::new_lazy);

pub async fn list_xp_rules(
    req: HttpRequest,
    query: web::Query<SchoolScopedParams>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .list_xp_rules(query.into_inner(), &req)
        .await
}

pub async fn create_xp_rule(
    req: HttpRequest,
    body: web::Json<CreateXpRuleRequest>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .create_xp_rule(body.into_inner(), &req)
        .await
}

pub async fn get_xp_rule(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE.get_xp_rule(id.0, &req).await
}

pub async fn update_xp_rule(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateXpRuleRequest>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .update_xp_rule(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_xp_rule(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE.delete_xp_rule(id.0, &req).await
}

pub async fn award_xp(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<AwardXpRequest>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .award_xp(id.0, body.into_inner(), &req)
        .await
}

pub async fn get_economy(
    req: HttpRequest,
    query: web::Query<SchoolScopedParams>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .get_economy(query.into_inner(), &req)
        .await
}

pub async fn update_economy(
    req: HttpRequest,
    body: web::Json<UpdateEconomyRequest>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .update_economy(body.into_inner(), &req)
        .await
}

pub async fn list_atom_transactions(
    req: HttpRequest,
    query: web::Query<AtomTransactionParams>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .list_atom_transactions(query.into_inner(), &req)
        .await
}

pub async fn adjust_atoms(
    req: HttpRequest,
    body: web::Json<AdjustAtomsRequest>,
) -> ActixResult<HttpResponse> {
    GAMIFICATION_SERVICE
        .adjust_atoms(body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_gamification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/xp-rules")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_xp_rules)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_xp_rule)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_xp_rule)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_xp_rule)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_xp_rule)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            // 教师也可以按规则发放
            .service(
                web::resource("/{id}/award").route(
                    web::post()
                        .to(award_xp)
                        .wrap(RequireRole::new_any(UserType::staff_roles())),
                ),
            ),
    );

    cfg.service(
        web::scope("/api/v1/economy")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(get_economy)
                            .wrap(RequireRole::new_any(UserType::staff_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_economy)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            ),
    );

    cfg.service(
        web::scope("/api/v1/atoms")
            .wrap(middlewares::RequireJWT)
            // 学生、监护人与教职工的可见范围在业务层判断
            .route("/transactions", web::get().to(list_atom_transactions))
            .service(
                web::resource("/adjust").route(
                    web::post()
                        .to(adjust_atoms)
                        .wrap(RequireRole::new_any(UserType::manager_roles())),
                ),
            ),
    );
}
