//! 教学目录：课程、科目、班级
//!
//! 写操作限管理员与学校账户（路由层校验），读操作对本校成员开放。
//! 其他学校的记录一律按不存在处理。

pub mod classes;
pub mod courses;
pub mod subjects;

use actix_web::{HttpResponse, Result as ActixResult, http::StatusCode};

use crate::models::ErrorCode;
use crate::services::{error_response, or_internal};
use crate::storage::Storage;

define_service!(CatalogService);

/// 被引用的课程必须属于同一学校
pub(crate) async fn check_course(
    storage: &dyn Storage,
    school_id: i64,
    course_id: Option<i64>,
) -> ActixResult<Option<HttpResponse>> {
    let Some(course_id) = course_id else {
        return Ok(None);
    };
    let course = or_internal(
        "Failed to retrieve course",
        storage.get_course_by_id(course_id).await,
    )?;
    match course {
        Some(course) if course.school_id == school_id => Ok(None),
        _ => Ok(Some(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::CrossSchoolReference,
            format!("Course {course_id} does not belong to this school"),
        ))),
    }
}
