use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::{StatusCode, header},
    web,
};
use tracing::error;

use super::{FileService, stored_path};
use crate::errors::EscolaError;
use crate::models::ErrorCode;
use crate::services::{error_response, internal_error};

fn file_not_found() -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::FileNotFound,
        "File not found",
    )
}

/// 去掉会破坏 Content-Disposition 的字符
fn header_safe_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    token: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let file = match storage.get_file_by_token(&token).await {
        Ok(Some(file)) => file,
        Ok(None) => return Ok(file_not_found()),
        Err(e) => return Ok(internal_error("File query failed", e)),
    };

    let path = stored_path(&file.token);
    let bytes = match web::block(move || std::fs::read(path)).await? {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("File {} is recorded but missing on disk", file.token);
            return Ok(file_not_found());
        }
        Err(e) => {
            return Ok(internal_error(
                "File read failed",
                EscolaError::file_operation(e.to_string()),
            ));
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, file.file_type.as_str()))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                header_safe_name(&file.original_name)
            ),
        ))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_name() {
        assert_eq!(header_safe_name("a\"b\\c\n.pdf"), "abc.pdf");
        assert_eq!(header_safe_name("boletim.pdf"), "boletim.pdf");
    }
}
