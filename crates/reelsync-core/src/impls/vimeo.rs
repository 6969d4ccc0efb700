//! VimeoUploader - Vimeo API (v3.4) への tus アップロード
//!
//! # フロー
//! 1. ファイルの存在とサイズを確認
//! 2. `POST /me/videos`（approach=tus）で動画を作成し upload_link を受け取る
//! 3. upload_link に `PATCH` でチャンクを送る（Upload-Offset はサーバーの応答に従う）
//! 4. `PATCH {uri}` で公開設定（privacy.view = anybody）
//! 5. `GET {uri}?fields=link` で公開 URL を取得
//!
//! # タイムアウト
//! JSON の API 呼び出しには request 全体のタイムアウトをかける。
//! tus の PATCH は回線速度で所要時間が決まるので、接続確立のタイムアウトと
//! TCP keepalive だけで死んだ接続を検出する。

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::app::Config;
use crate::domain::{HostedLink, UploadError, VideoUpload};
use crate::ports::Uploader;

const API_ACCEPT: &str = "application/vnd.vimeo.*+json;version=3.4";
const TUS_VERSION: &str = "1.0.0";
const TUS_CONTENT_TYPE: &str = "application/offset+octet-stream";
const UPLOAD_OFFSET: &str = "Upload-Offset";
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct CreatedVideo {
    uri: String,
    upload: UploadTicket,
}

#[derive(Debug, Deserialize)]
struct UploadTicket {
    upload_link: String,
}

#[derive(Debug, Deserialize)]
struct LinkFields {
    link: Option<String>,
}

pub struct VimeoUploader {
    http: Client,
    api_base: String,
    access_token: String,
    /// JSON 呼び出し 1 回あたりの上限（tus の PATCH には使わない）
    request_timeout: Duration,
    chunk_bytes: usize,
}

impl VimeoUploader {
    pub fn new(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
        chunk_bytes: usize,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .tcp_keepalive(TCP_KEEPALIVE)
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            request_timeout: timeout,
            chunk_bytes: chunk_bytes.max(1),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.vimeo_api_base.clone(),
            config.access_token.clone(),
            Duration::from_secs(config.http_timeout_secs),
            config.upload_chunk_bytes,
        )
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn create_video(&self, video: &VideoUpload, size: u64) -> Result<CreatedVideo, UploadError> {
        let body = json!({
            "upload": { "approach": "tus", "size": size },
            "name": video.title,
            "description": video.description,
        });
        let resp = self
            .http
            .post(self.api_url("/me/videos"))
            .timeout(self.request_timeout)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, API_ACCEPT)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success("create video", resp).await?;
        resp.json::<CreatedVideo>()
            .await
            .map_err(|e| UploadError::MalformedResponse {
                step: "create video",
                detail: e.to_string(),
            })
    }

    /// tus の PATCH を offset が size に届くまで繰り返す
    async fn send_file(&self, upload_link: &str, path: &Path, size: u64) -> Result<(), UploadError> {
        let io_err = |source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;

        let mut offset = 0u64;
        while offset < size {
            let remaining = usize::try_from(size - offset).unwrap_or(usize::MAX);
            let mut chunk = vec![0u8; remaining.min(self.chunk_bytes)];
            file.seek(SeekFrom::Start(offset)).await.map_err(io_err)?;
            file.read_exact(&mut chunk).await.map_err(io_err)?;

            let resp = self
                .http
                .patch(upload_link)
                .header("Tus-Resumable", TUS_VERSION)
                .header(UPLOAD_OFFSET, offset.to_string())
                .header(CONTENT_TYPE, TUS_CONTENT_TYPE)
                .body(chunk)
                .send()
                .await?;
            let resp = ensure_success("tus upload", resp).await?;

            let next = resp
                .headers()
                .get(UPLOAD_OFFSET)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .ok_or_else(|| UploadError::MalformedResponse {
                    step: "tus upload",
                    detail: "missing or invalid Upload-Offset header".to_string(),
                })?;
            if next <= offset {
                return Err(UploadError::MalformedResponse {
                    step: "tus upload",
                    detail: format!("upload offset did not advance past {offset}"),
                });
            }
            tracing::debug!(offset = next, size, "sent chunk");
            offset = next;
        }
        Ok(())
    }

    async fn publish(&self, uri: &str) -> Result<(), UploadError> {
        let resp = self
            .http
            .patch(self.api_url(uri))
            .timeout(self.request_timeout)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, API_ACCEPT)
            .json(&json!({ "privacy": { "view": "anybody" } }))
            .send()
            .await?;
        ensure_success("publish", resp).await?;
        Ok(())
    }

    async fn fetch_link(&self, uri: &str) -> Result<HostedLink, UploadError> {
        let resp = self
            .http
            .get(self.api_url(uri))
            .query(&[("fields", "link")])
            .timeout(self.request_timeout)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, API_ACCEPT)
            .send()
            .await?;
        let resp = ensure_success("fetch link", resp).await?;
        let fields = resp
            .json::<LinkFields>()
            .await
            .map_err(|e| UploadError::MalformedResponse {
                step: "fetch link",
                detail: e.to_string(),
            })?;

        fields
            .link
            .and_then(HostedLink::parse)
            .ok_or_else(|| UploadError::MalformedResponse {
                step: "fetch link",
                detail: "response has no link".to_string(),
            })
    }
}

/// 2xx 以外は本文ごと Rejected にする
async fn ensure_success(step: &'static str, resp: Response) -> Result<Response, UploadError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(UploadError::Rejected {
        step,
        status: status.as_u16(),
        body,
    })
}

async fn file_size(path: &Path) -> Result<u64, UploadError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(UploadError::FileMissing(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(UploadError::FileMissing(path.to_path_buf()))
        }
        Err(source) => Err(UploadError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl Uploader for VimeoUploader {
    async fn upload(&self, video: &VideoUpload) -> Result<HostedLink, UploadError> {
        let size = file_size(video.path()).await?;

        let created = self.create_video(video, size).await?;
        tracing::debug!(uri = %created.uri, size, "created vimeo video");

        self.send_file(&created.upload.upload_link, video.path(), size)
            .await?;
        self.publish(&created.uri).await?;
        self.fetch_link(&created.uri).await
    }
}
