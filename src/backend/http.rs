//! [`SlideBackend`] over HTTP.

use crate::annotations::AnnotationMap;
use crate::backend::{
    AskReply, AskRequest, Endpoint, ProcessReply, ProgressReply, SlideBackend, ASK_FALLBACK_ERROR,
};
use crate::config::ViewerConfig;
use crate::error::{Result, SlideError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    upload_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration, upload_timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| SlideError::config(format!("server_url {:?}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .build()
            .map_err(|e| SlideError::http("client", e))?;

        Ok(Self {
            client,
            base,
            upload_timeout,
        })
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        Self::new(
            &config.server_url,
            config.request_timeout(),
            config.upload_timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        self.base
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| SlideError::config(format!("building {} url: {}", endpoint, e)))
    }

    fn document_url(&self, name: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SlideError::config("server_url cannot be a base"))?
            .pop_if_empty()
            .push("pdf")
            .push(&format!("{}.pdf", name));
        Ok(url)
    }

    /// Decode a JSON body, reading it even for error statuses.
    async fn decode_json<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SlideError::http(endpoint.path(), e))?;
        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(status_error(endpoint, status)),
            Err(e) => Err(SlideError::decode(endpoint.path(), e.to_string())),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SlideError::http(endpoint.path(), e))?;
        if !response.status().is_success() {
            return Err(status_error(endpoint, response.status()));
        }
        Self::decode_json(endpoint, response).await
    }
}

#[async_trait]
impl SlideBackend for HttpBackend {
    async fn slide_texts(&self) -> Result<AnnotationMap> {
        self.get_json(Endpoint::SlideTexts).await
    }

    async fn document_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.document_url(name)?;
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SlideError::http(path.as_str(), e))?;
        if !response.status().is_success() {
            return Err(SlideError::Status {
                endpoint: path,
                status: response.status().as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SlideError::http(path.as_str(), e))?;
        Ok(bytes.to_vec())
    }

    async fn ask(&self, question: &str, current_slide: u32) -> Result<String> {
        let url = self.endpoint_url(Endpoint::Ask)?;
        let response = self
            .client
            .post(url)
            .json(&AskRequest {
                question,
                current_slide,
            })
            .send()
            .await
            .map_err(|e| SlideError::http(Endpoint::Ask.path(), e))?;

        let reply: AskReply = Self::decode_json(Endpoint::Ask, response).await?;
        if reply.success {
            Ok(reply.response.unwrap_or_default())
        } else {
            Err(SlideError::backend(
                reply
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| ASK_FALLBACK_ERROR.to_string()),
            ))
        }
    }

    async fn process_pdf(&self) -> Result<()> {
        let url = self.endpoint_url(Endpoint::Process)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| SlideError::http(Endpoint::Process.path(), e))?;

        let reply: ProcessReply = Self::decode_json(Endpoint::Process, response).await?;
        if reply.success {
            Ok(())
        } else {
            Err(SlideError::backend(
                reply
                    .error
                    .unwrap_or_else(|| "Failed to start processing".to_string()),
            ))
        }
    }

    async fn upload(&self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SlideError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => SlideError::file_error(format!("reading {}", path.display()), e),
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| SlideError::http(Endpoint::Upload.path(), e))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint_url(Endpoint::Upload)?;
        let response = self
            .client
            .post(url)
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SlideError::http(Endpoint::Upload.path(), e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(Endpoint::Upload, response.status()))
        }
    }

    async fn progress(&self) -> Result<u8> {
        let reply: ProgressReply = self.get_json(Endpoint::Progress).await?;
        Ok(reply.percent())
    }
}

fn status_error(endpoint: Endpoint, status: StatusCode) -> SlideError {
    SlideError::Status {
        endpoint: endpoint.path().to_string(),
        status: status.as_u16(),
    }
}
