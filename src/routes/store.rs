use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::profiles::entities::UserType;
use crate::models::store::requests::{
    CreateProductRequest, DeliverOrderRequest, OrderListParams, PlaceOrderRequest,
    ProductListParams, UpdateProductRequest,
};
use crate::services::StoreService;
use crate::utils::SafeIDI64;

// 懒加载的全局 StoreService 实例
static STORE_SERVICE: Lazy<StoreService> = Lazy::new(StoreService::new_lazy);

/// 教职工与学生（学生只能取消自己的订单）
const CANCELLERS: &[UserType] = &[
    UserType::Admin,
    UserType::School,
    UserType::Teacher,
    UserType::Student,
];

pub async fn list_products(
    req: HttpRequest,
    query: web::Query<ProductListParams>,
) -> ActixResult<HttpResponse> {
    STORE_SERVICE.list_products(query.into_inner(), &req).await
}

pub async fn create_product(
    req: HttpRequest,
    body: web::Json<CreateProductRequest>,
) -> ActixResult<HttpResponse> {
    STORE_SERVICE.create_product(body.into_inner(), &req).await
}

pub async fn get_product(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STORE_SERVICE.get_product(id.0, &req).await
}

pub async fn update_product(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateProductRequest>,
) -> ActixResult<HttpResponse> {
    STORE_SERVICE
        .update_product(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_product(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STORE_SERVICE.delete_product(id.0, &req).await
}

pub async fn place_order(
    req: HttpRequest,
    body: web::Json<PlaceOrderRequest>,
) -> ActixResult<HttpResponse> {
    STORE_SERVICE.place_order(body.into_inner(), &req).await
}

pub async fn list_orders(
    req: HttpRequest,
    query: web::Query<OrderListParams>,
) -> ActixResult<HttpResponse> {
    STORE_SERVICE.list_orders(query.into_inner(), &req).await
}

pub async fn get_order(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STORE_SERVICE.get_order(id.0, &req).await
}

pub async fn deliver_order(
    req: HttpRequest,
    id: SafeIDI64,
    body: Option<web::Json<DeliverOrderRequest>>,
) -> ActixResult<HttpResponse> {
    let delivery = body.map(|b| b.into_inner()).unwrap_or_default();
    STORE_SERVICE.deliver_order(id.0, delivery, &req).await
}

pub async fn cancel_order(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STORE_SERVICE.cancel_order(id.0, &req).await
}

// 配置路由
pub fn configure_store_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/store")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/products")
                    // 学生与监护人只看到上架商品（业务层过滤）
                    .route(web::get().to(list_products))
                    .route(
                        web::post()
                            .to(create_product)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/products/{id}")
                    .route(web::get().to(get_product))
                    .route(
                        web::put()
                            .to(update_product)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_product)
                            .wrap(RequireRole::new_any(UserType::manager_roles())),
                    ),
            )
            .service(
                web::resource("/orders")
                    .route(web::get().to(list_orders))
                    .route(
                        web::post()
                            .to(place_order)
                            .wrap(RequireRole::new_any(UserType::student_roles())),
                    ),
            )
            .service(web::resource("/orders/{id}").route(web::get().to(get_order)))
            .service(
                web::resource("/orders/{id}/deliver").route(
                    web::post()
                        .to(deliver_order)
                        .wrap(RequireRole::new_any(UserType::staff_roles())),
                ),
            )
            .service(
                web::resource("/orders/{id}/cancel").route(
                    web::post()
                        .to(cancel_order)
                        .wrap(RequireRole::new_any(CANCELLERS)),
                ),
            ),
    );
}
