use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use futures_util::{StreamExt, TryStreamExt};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{FileService, stored_path};
use crate::config::AppConfig;
use crate::errors::EscolaError;
use crate::models::{ApiResponse, ErrorCode, files::responses::FileUploadResponse};
use crate::services::{current_profile, error_response, internal_error};
use crate::utils::detect_mime;

/// 上传失败（IO 错误），只记录日志
fn upload_failed(err: impl std::fmt::Display) -> HttpResponse {
    error!("{}", EscolaError::file_operation(err.to_string()));
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::FileUploadFailed,
        "File upload failed",
    )
}

/// 写入中的上传文件，`keep` 之前离开作用域即删除
///
/// 覆盖所有提前返回，包括 multipart 流出错时的 `?` 与客户端断开导致的取消。
struct PendingFile {
    path: PathBuf,
    kept: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self { path, kept: false }
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove partial upload {}: {}", self.path.display(), e);
        }
    }
}

/// 带点号的小写扩展名，如 ".pdf"
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

fn extension_allowed(extension: &str, allowed: &[String]) -> bool {
    !extension.is_empty() && allowed.iter().any(|t| t.to_lowercase() == extension)
}

pub async fn handle_upload(
    service: &FileService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let profile = current_profile(request)?;
    let config = &AppConfig::get().upload;

    if let Err(e) = fs::create_dir_all(&config.dir) {
        return Ok(upload_failed(e));
    }

    let token = Uuid::new_v4().to_string();
    let file_path = stored_path(&token);

    let mut original_name = String::new();
    let mut content_type = String::new();
    let mut file_size: usize = 0;
    let mut file_received = false;
    let mut pending: Option<PendingFile> = None;

    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition();
        if disposition.and_then(|cd| cd.get_name()) != Some("file") {
            continue;
        }
        if file_received {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            ));
        }
        file_received = true;

        original_name = disposition
            .and_then(|cd| cd.get_filename())
            .map(|name| name.to_string())
            .unwrap_or_default();
        let extension = extension_of(&original_name);
        if !extension_allowed(&extension, &config.allowed_types) {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            ));
        }

        let mut file = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => return Ok(upload_failed(e)),
        };
        pending = Some(PendingFile::new(file_path.clone()));

        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = chunk?;

            // 第一个分块校验文件头
            if first_chunk {
                first_chunk = false;
                match detect_mime(&data, &extension) {
                    Some(mime) => content_type = mime.to_string(),
                    None => {
                        return Ok(error_response(
                            StatusCode::BAD_REQUEST,
                            ErrorCode::FileTypeNotAllowed,
                            "File content does not match its extension",
                        ));
                    }
                }
            }

            file_size += data.len();
            if file_size > config.max_size {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                ));
            }
            if let Err(e) = file.write_all(&data) {
                return Ok(upload_failed(e));
            }
        }

        if first_chunk {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
                "Uploaded file is empty",
            ));
        }
    }

    if !file_received {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ));
    }

    let storage = service.get_storage(request)?;
    match storage
        .upload_file(
            &token,
            &original_name,
            file_size as i64,
            &content_type,
            profile.id,
        )
        .await
    {
        Ok(file) => {
            if let Some(pending) = pending {
                pending.keep();
            }
            info!(
                "File {} ({} bytes) uploaded by {}",
                file.token, file.file_size, profile.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                FileUploadResponse {
                    token: file.token,
                    original_name: file.original_name,
                    size: file.file_size,
                    content_type: file.file_type,
                    uploaded_at: file.uploaded_at,
                },
                "File uploaded successfully",
            )))
        }
        Err(e) => Ok(internal_error("File record creation failed", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ObjectCache;
    use crate::models::profiles::entities::{Profile, UserType};
    use crate::storage::{
        Storage,
        sea_orm_storage::{SeaOrmStorage, test_support},
    };
    use actix_web::{App, HttpMessage, test, web};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn stored_files() -> HashSet<PathBuf> {
        fs::read_dir(&AppConfig::get().upload.dir)
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    #[::core::prelude::v1::test]
    fn test_pending_file_removed_unless_kept() {
        let dir = std::env::temp_dir();
        let dropped = dir.join(format!("{}.bin", Uuid::new_v4()));
        let kept = dir.join(format!("{}.bin", Uuid::new_v4()));
        fs::write(&dropped, b"partial").unwrap();
        fs::write(&kept, b"complete").unwrap();

        drop(PendingFile::new(dropped.clone()));
        PendingFile::new(kept.clone()).keep();

        assert!(!dropped.exists());
        assert!(kept.exists());
        fs::remove_file(&kept).unwrap();

        // 文件已不存在时静默
        drop(PendingFile::new(dropped));
    }

    #[actix_web::test]
    async fn test_interrupted_upload_leaves_no_file() {
        let db = SeaOrmStorage::in_memory().await.unwrap();
        let uploader =
            test_support::profile(&db, "envio@escola.test", UserType::Teacher, None).await;
        let storage: Arc<dyn Storage> = Arc::new(db);
        let cache: Arc<dyn ObjectCache> =
            Arc::from(crate::cache::register::create_object_cache("moka").await.unwrap());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new(uploader))
                .route(
                    "/upload",
                    web::post().to(
                        |req: HttpRequest,
                         uploader: web::Data<Profile>,
                         payload: Multipart| async move {
                            req.extensions_mut().insert(uploader.get_ref().clone());
                            FileService::new_lazy().handle_upload(&req, payload).await
                        },
                    ),
                ),
        )
        .await;

        let before = stored_files();
        // 只有开头分隔符，没有结束分隔符，读取文件内容时流出错
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"boletim.pdf\"\r\n\
            Content-Type: application/pdf\r\n\r\n\
            %PDF-1.4 conteudo interrompido";
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/upload")
                .insert_header(("Content-Type", "multipart/form-data; boundary=XYZ"))
                .set_payload(body)
                .to_request(),
        )
        .await;

        assert!(!resp.status().is_success());
        assert_eq!(stored_files(), before);
    }

    #[::core::prelude::v1::test]
    fn test_extension_of() {
        assert_eq!(extension_of("Relatório.PDF"), ".pdf");
        assert_eq!(extension_of("notas.tar.gz"), ".gz");
        assert_eq!(extension_of("sem_extensao"), "");
    }

    #[::core::prelude::v1::test]
    fn test_extension_allowed() {
        let allowed = vec![".png".to_string(), ".PDF".to_string()];
        assert!(extension_allowed(".png", &allowed));
        assert!(extension_allowed(".pdf", &allowed));
        assert!(!extension_allowed(".exe", &allowed));
        assert!(!extension_allowed("", &allowed));
    }
}
