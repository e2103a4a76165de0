use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};

use super::StoreService;
use crate::models::{
    ApiResponse, ErrorCode,
    profiles::entities::{Profile, UserType},
    store::{
        entities::Product,
        requests::{CreateProductRequest, ProductListParams, ProductListQuery, UpdateProductRequest},
    },
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal, rejection_response,
    tenancy::{Access, SchoolScope, request_scope, write_school},
};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

fn product_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::ProductNotFound,
        "Product not found",
    )
}

/// 学生与监护人只看到上架商品
fn shoppers_only_see_active(profile: &Profile) -> bool {
    !UserType::staff_roles().contains(&profile.user_type)
}

fn check_product_fields(
    name: Option<&String>,
    price_atoms: Option<i64>,
    stock: Option<i64>,
) -> Option<HttpResponse> {
    let msg = if let Some(Err(msg)) = name.map(|n| validate_name(n)) {
        msg
    } else if price_atoms.is_some_and(|p| p <= 0) {
        "price_atoms must be greater than 0"
    } else if stock.is_some_and(|s| s < 0) {
        "stock cannot be negative"
    } else {
        return None;
    };
    Some(error_response(
        StatusCode::BAD_REQUEST,
        ErrorCode::BadRequest,
        msg,
    ))
}

async fn product_in_scope(
    storage: &dyn Storage,
    id: i64,
    scope: SchoolScope,
) -> ActixResult<Option<Product>> {
    let product = or_internal(
        "Failed to retrieve product",
        storage.get_product_by_id(id).await,
    )?;
    Ok(product.filter(|p| scope.permits(p.school_id)))
}

impl StoreService {
    pub async fn list_products(
        &self,
        query: ProductListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let (page, size) = query.pagination.normalized();
        let list_query = ProductListQuery {
            page,
            size,
            school_id: scope.school_id(),
            search: query.search,
            active_only: shoppers_only_see_active(&profile),
        };
        match storage.list_products(list_query).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Product list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve product list", e)),
        }
    }

    pub async fn create_product(
        &self,
        product: CreateProductRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let school_id = write_school(request, &profile, product.school_id).await?;
        if let Some(resp) = check_product_fields(
            Some(&product.name),
            Some(product.price_atoms),
            Some(product.stock),
        ) {
            return Ok(resp);
        }

        let storage = self.get_storage(request)?;
        match storage.create_product(school_id, product).await {
            Ok(product) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(product, "Product created")))
            }
            Err(e) => Ok(internal_error("Product creation failed", e)),
        }
    }

    pub async fn get_product(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let product = product_in_scope(&*storage, id, scope)
            .await?
            .filter(|p| p.active || !shoppers_only_see_active(&profile));
        match product {
            Some(product) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                product,
                "Product retrieved successfully",
            ))),
            None => Ok(product_not_found()),
        }
    }

    pub async fn update_product(
        &self,
        id: i64,
        update: UpdateProductRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if product_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(product_not_found());
        }
        if let Some(resp) =
            check_product_fields(update.name.as_ref(), update.price_atoms, update.stock)
        {
            return Ok(resp);
        }

        match storage.update_product(id, update).await {
            Ok(Some(product)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(product, "Product updated")))
            }
            Ok(None) => Ok(product_not_found()),
            Err(e) => Ok(internal_error("Product update failed", e)),
        }
    }

    pub async fn delete_product(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        if product_in_scope(&*storage, id, scope).await?.is_none() {
            return Ok(product_not_found());
        }
        match storage.delete_product(id).await {
            Ok(Ok(true)) => {
                Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Product deleted")))
            }
            Ok(Ok(false)) => Ok(product_not_found()),
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Product deletion failed", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_fields() {
        let name = "Caderno".to_string();
        assert!(check_product_fields(Some(&name), Some(30), Some(0)).is_none());
        assert!(check_product_fields(Some(&name), Some(0), None).is_some());
        assert!(check_product_fields(None, None, Some(-1)).is_some());
        assert!(check_product_fields(Some(&"x".to_string()), None, None).is_some());
    }
}
