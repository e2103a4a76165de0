use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use super::GamificationService;
use crate::models::{
    ApiResponse, ErrorCode,
    gamification::requests::{AdjustAtomsRequest, AtomTransactionParams},
    profiles::entities::UserType,
};
use crate::services::{
    current_profile, error_response, internal_error, rejection_response,
    people::{own_student, student_visible_to},
};

fn student_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::StudentNotFound,
        "Student not found",
    )
}

impl GamificationService {
    /// 学生可省略 `student_id` 查看自己的流水
    pub async fn list_atom_transactions(
        &self,
        query: AtomTransactionParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        let student_id = match (query.student_id, profile.user_type) {
            (Some(id), _) => id,
            (None, UserType::Student) => own_student(&*storage, &profile).await?.id,
            (None, _) => {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "student_id is required",
                ));
            }
        };
        if student_visible_to(&*storage, request, &profile, student_id)
            .await?
            .is_none()
        {
            return Ok(student_not_found());
        }

        let (page, size) = query.pagination.normalized();
        match storage.list_atom_transactions(student_id, page, size).await {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Atom transactions retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve atom transactions", e)),
        }
    }

    /// 手动调整余额，余额不能低于零
    pub async fn adjust_atoms(
        &self,
        adjust: AdjustAtomsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        if adjust.amount == 0 {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "amount must not be zero",
            ));
        }
        if adjust.description.trim().is_empty() {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "description is required",
            ));
        }
        if student_visible_to(&*storage, request, &profile, adjust.student_id)
            .await?
            .is_none()
        {
            return Ok(student_not_found());
        }

        match storage
            .adjust_atoms(
                adjust.student_id,
                adjust.amount,
                adjust.description.trim().to_string(),
                profile.id,
            )
            .await
        {
            Ok(Ok(balance)) => {
                info!(
                    "Atoms of student {} adjusted by {} ({})",
                    adjust.student_id, adjust.amount, profile.id
                );
                Ok(HttpResponse::Ok().json(ApiResponse::success(balance, "Atoms adjusted")))
            }
            Ok(Err(rejection)) => Ok(rejection_response(rejection)),
            Err(e) => Ok(internal_error("Atom adjustment failed", e)),
        }
    }
}
