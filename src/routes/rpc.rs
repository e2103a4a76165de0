use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::services::RpcService;
use crate::utils::SafeProcedureName;

// 懒加载的全局 RpcService 实例
static RPC_SERVICE: Lazy<RpcService> = Lazy::new(RpcService::new_lazy);

pub async fn call_procedure(
    req: HttpRequest,
    procedure: SafeProcedureName,
    args: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    RPC_SERVICE
        .call(&procedure.0, args.into_inner(), &req)
        .await
}

// 配置路由：角色校验在过程登记表中
pub fn configure_rpc_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/rpc")
            .wrap(RateLimit::rpc())
            .wrap(middlewares::RequireJWT)
            .route("/{procedure}", web::post().to(call_procedure)),
    );
}
