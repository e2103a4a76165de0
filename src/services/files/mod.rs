//! 文件上传与下载
//!
//! 文件以 `{upload_dir}/{token}.bin` 存放，原始文件名只保存在数据库中。

pub mod download;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;

define_service!(FileService);

/// 令牌对应的磁盘路径
pub(crate) fn stored_path(token: &str) -> std::path::PathBuf {
    std::path::Path::new(&AppConfig::get().upload.dir).join(format!("{token}.bin"))
}

impl FileService {
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        token: String,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, token).await
    }
}
