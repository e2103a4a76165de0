use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::StoreService;
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::entities::{Profile, UserType},
    store::{
        entities::OrderDetail,
        requests::{DeliverOrderRequest, OrderListParams, OrderListQuery, PlaceOrderRequest},
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    people::{own_student, student_visible_to},
    rejection_response,
    tenancy::{Access, request_scope},
};
use crate::storage::Storage;

fn order_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::OrderNotFound,
        "Order not found",
    )
}

/// 订单对调用者可见：教职工看本校，学生看自己，监护人看孩子
async fn visible_order(
    storage: &dyn Storage,
    request: &HttpRequest,
    profile: &Profile,
    id: i64,
) -> ActixResult<Option<OrderDetail>> {
    let order = or_internal(
        "Failed to retrieve order",
        storage.get_order_by_id(id).await,
    )?;
    let Some(order) = order else {
        return Ok(None);
    };
    if profile.user_type == UserType::Admin {
        return Ok(Some(order));
    }
    let visible = student_visible_to(storage, request, profile, order.order.student_id)
        .await?
        .is_some_and(|s| s.school_id == order.order.school_id);
    Ok(visible.then_some(order))
}

impl StoreService {
    pub async fn place_order(
        &self,
        order: PlaceOrderRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;
        let student = own_student(&*storage, &profile).await?;

        match storage.place_order(student.id, &order.items).await {
            Ok(Ok(detail)) => {
                info!(
                    "Order {} placed by student {}: {} atoms",
                    detail.order.id, student.id, detail.order.total_atoms
                );
                Ok(HttpResponse::Created().json(ApiResponse::success(detail, "Order placed")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Order placement failed", e)),
        }
    }

    pub async fn list_orders(
        &self,
        query: OrderListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;
        let (page, size) = query.pagination.normalized();

        let (school_id, student_ids) = match profile.user_type {
            UserType::Student => {
                let student = own_student(&*storage, &profile).await?;
                (None, Some(vec![student.id]))
            }
            UserType::Guardian => {
                let guardian = or_internal(
                    "Failed to retrieve guardian",
                    storage.get_guardian_by_profile_id(profile.id).await,
                )?;
                let children = match guardian {
                    Some(g) => or_internal(
                        "Failed to retrieve students",
                        storage.list_students_by_guardian(g.id).await,
                    )?,
                    None => Vec::new(),
                };
                (None, Some(children.into_iter().map(|s| s.id).collect()))
            }
            _ => {
                let scope =
                    request_scope(request, &profile, query.school_id, Access::Read).await?;
                (scope.school_id(), query.student_id.map(|id| vec![id]))
            }
        };

        let list_query = OrderListQuery {
            page,
            size,
            school_id,
            status: query.status,
            student_ids,
        };
        match storage.list_orders(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Order list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve order list", e)),
        }
    }

    pub async fn get_order(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        match visible_order(&*storage, request, &profile, id).await? {
            Some(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                order,
                "Order retrieved successfully",
            ))),
            None => Ok(order_not_found()),
        }
    }

    pub async fn deliver_order(
        &self,
        id: i64,
        delivery: DeliverOrderRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        if visible_order(&*storage, request, &profile, id)
            .await?
            .is_none()
        {
            return Ok(order_not_found());
        }

        match storage.deliver_order(id, profile.id, delivery.notes).await {
            Ok(Ok(detail)) => {
                info!("Order {} delivered by {}", id, profile.id);
                Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "Order delivered")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Order delivery failed", e)),
        }
    }

    /// 教职工或下单学生本人可以取消，退款与回补库存在同一事务内
    pub async fn cancel_order(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        if profile.user_type == UserType::Guardian {
            return Ok(error_response(
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "Guardians cannot cancel orders",
            ));
        }
        if visible_order(&*storage, request, &profile, id)
            .await?
            .is_none()
        {
            return Ok(order_not_found());
        }

        match storage.cancel_order(id, profile.id).await {
            Ok(Ok(detail)) => {
                info!("Order {} cancelled by {}", id, profile.id);
                Ok(HttpResponse::Ok().json(ApiResponse::success(detail, "Order cancelled")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Order cancellation failed", e)),
        }
    }
}
