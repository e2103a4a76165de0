//! 教师-班级-学科任课关系

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::info;

use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{AssignmentListParams, CreateAssignmentRequest},
    profiles::entities::UserType,
};
use crate::services::{
    current_profile, error_response, internal_error, or_internal,
    tenancy::{Access, request_scope, write_school},
    write_failure,
};
use crate::storage::Storage;

define_service!(AssignmentService);

fn assignment_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::AssignmentNotFound,
        "Assignment not found",
    )
}

/// 教师、班级、学科必须都属于该学校，返回第一个不满足的
async fn foreign_member(
    storage: &dyn Storage,
    school_id: i64,
    req: &CreateAssignmentRequest,
) -> ActixResult<Option<&'static str>> {
    let teacher = or_internal(
        "Failed to retrieve teacher",
        storage.get_teacher_by_id(req.teacher_id).await,
    )?;
    if teacher.is_none_or(|t| t.school_id != school_id) {
        return Ok(Some("Teacher"));
    }
    let class = or_internal(
        "Failed to retrieve class",
        storage.get_class_by_id(req.class_id).await,
    )?;
    if class.is_none_or(|c| c.school_id != school_id) {
        return Ok(Some("Class"));
    }
    let subject = or_internal(
        "Failed to retrieve subject",
        storage.get_subject_by_id(req.subject_id).await,
    )?;
    if subject.is_none_or(|s| s.school_id != school_id) {
        return Ok(Some("Subject"));
    }
    Ok(None)
}

impl AssignmentService {
    pub async fn list_assignments(
        &self,
        query: AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, query.school_id, Access::Read).await?;
        let storage = self.get_storage(request)?;

        // 教师只能看到自己的任课
        let teacher_id = if profile.user_type == UserType::Teacher {
            let teacher = or_internal(
                "Failed to retrieve teacher",
                storage.get_teacher_by_profile_id(profile.id).await,
            )?;
            match teacher {
                Some(t) => Some(t.id),
                None => {
                    return Ok(error_response(
                        StatusCode::NOT_FOUND,
                        ErrorCode::TeacherNotFound,
                        "Teacher not found",
                    ));
                }
            }
        } else {
            query.teacher_id
        };

        match storage
            .list_assignments(scope.school_id(), teacher_id, query.class_id)
            .await
        {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                items,
                "Assignment list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve assignments", e)),
        }
    }

    pub async fn create_assignment(
        &self,
        req: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let storage = self.get_storage(request)?;

        // 管理员未指定学校时以教师所在学校为准
        let requested = match profile.user_type {
            UserType::Admin => or_internal(
                "Failed to retrieve teacher",
                storage.get_teacher_by_id(req.teacher_id).await,
            )?
            .map(|t| t.school_id),
            _ => None,
        };
        let school_id = write_school(request, &profile, requested).await?;

        if let Some(what) = foreign_member(&*storage, school_id, &req).await? {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::CrossSchoolReference,
                format!("{what} does not belong to this school"),
            ));
        }

        match storage.create_assignment(school_id, req).await {
            Ok(assignment) => {
                info!(
                    "Assignment {} created: teacher {} class {} subject {}",
                    assignment.id, assignment.teacher_id, assignment.class_id, assignment.subject_id
                );
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    assignment,
                    "Assignment created",
                )))
            }
            Err(e) => Ok(write_failure(
                "Assignment creation failed",
                e,
                ErrorCode::AssignmentAlreadyExists,
                "This teacher already teaches this subject in this class",
            )),
        }
    }

    pub async fn delete_assignment(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        let profile = current_profile(request)?;
        let scope = request_scope(request, &profile, None, Access::Read).await?;
        let storage = self.get_storage(request)?;

        let assignment = or_internal(
            "Failed to retrieve assignment",
            storage.get_assignment_by_id(id).await,
        )?;
        if assignment.is_none_or(|a| !scope.permits(a.school_id)) {
            return Ok(assignment_not_found());
        }

        match storage.delete_assignment(id).await {
            Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Assignment deleted",
            ))),
            Ok(false) => Ok(assignment_not_found()),
            Err(e) => Ok(internal_error("Assignment deletion failed", e)),
        }
    }
}
