//! Client for the `media/upload.json` endpoint

use super::forms::{AppendForm, FinalizeForm, Form, InitForm};
use super::{ApiError, MediaResponse};
use crate::{Config, MediaError, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport response of an APPEND, which carries no parsed payload
#[derive(Debug, Clone)]
pub struct AppendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Media upload service
///
/// Stateless: the media id returned by [`MediaService::init`] has to be passed
/// back into [`MediaService::append`] and [`MediaService::finalize`].
#[derive(Debug, Clone)]
pub struct MediaService {
    client: Client,
    upload_url: Url,
    media_type: String,
}

impl MediaService {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(config.http.user_agent.clone())
            .default_headers(config.auth_header_map()?)
            .build()?;

        Ok(Self {
            client,
            upload_url: config.upload_url()?,
            media_type: config.upload.media_type.clone(),
        })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// INIT: declare the total payload size, returns the assigned media id
    pub async fn init(&self, payload_size: u64) -> Result<MediaResponse> {
        let form = InitForm::new(self.media_type.clone(), payload_size);
        let response = self.post_form(&form).await?;
        receive(response).await
    }

    /// APPEND: send one segment, raw or base64 encoded
    ///
    /// Splitting a payload into segments is up to the caller.
    pub async fn append(
        &self,
        data: &[u8],
        media_id: &str,
        index: u32,
        use_base64: bool,
    ) -> Result<AppendResponse> {
        let form = AppendForm::new(data, media_id, index, use_base64);
        let response = self.post_form(&form).await?;
        let status = response.status();
        debug!("status_code: {}", status.as_u16());

        if !status.is_success() {
            return Err(failure(response).await);
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        // a 2xx APPEND is normally empty, but may still carry an error payload
        relevant_error(None, decode_api_error(&body))?;

        Ok(AppendResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    /// FINALIZE: close the upload and return the final media metadata
    pub async fn finalize(&self, media_id: &str) -> Result<MediaResponse> {
        let form = FinalizeForm::new(media_id);
        let response = self.post_form(&form).await?;
        receive(response).await
    }

    async fn post_form<F: Form>(&self, form: &F) -> Result<Response> {
        debug!("Sending {} to {}", form.command(), self.upload_url);

        let response = self
            .client
            .post(self.upload_url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .body(form.encode())
            .send()
            .await?;

        Ok(response)
    }
}

/// Merge a transport error and an API error payload into one result
///
/// The transport error wins; an empty API error is ignored.
pub fn relevant_error(http_error: Option<MediaError>, api_error: ApiError) -> Result<()> {
    if let Some(err) = http_error {
        return Err(err);
    }
    if !api_error.is_empty() {
        return Err(MediaError::Api(api_error));
    }
    Ok(())
}

/// Bodies that are not an error payload decode to an empty [`ApiError`]
fn decode_api_error(body: &[u8]) -> ApiError {
    serde_json::from_slice(body).unwrap_or_default()
}

async fn receive(response: Response) -> Result<MediaResponse> {
    let status = response.status();
    if !status.is_success() {
        return Err(failure(response).await);
    }

    let body = response.bytes().await?;
    relevant_error(None, decode_api_error(&body))?;

    let media: MediaResponse = serde_json::from_slice(&body)?;
    debug!(
        "media_id={} size={} expires_after_secs={}",
        media.media_id_string, media.size, media.expires_after_secs
    );
    Ok(media)
}

async fn failure(response: Response) -> MediaError {
    let status = response.status();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return e.into(),
    };

    match relevant_error(None, decode_api_error(&body)) {
        Err(err) => err,
        Ok(()) => MediaError::Status {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ErrorDetail;
    use crate::ConfigBuilder;

    fn api_error() -> ApiError {
        ApiError {
            errors: vec![ErrorDetail {
                code: 131,
                message: "Internal error".to_string(),
            }],
        }
    }

    #[test]
    fn test_relevant_error_none() {
        assert!(relevant_error(None, ApiError::default()).is_ok());
    }

    #[test]
    fn test_relevant_error_api() {
        match relevant_error(None, api_error()) {
            Err(MediaError::Api(err)) => assert_eq!(err.errors[0].code, 131),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_relevant_error_transport_wins() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = reqwest::Client::new()
            .post(format!("http://{}/media/upload.json", addr))
            .send()
            .await
            .unwrap_err();

        assert!(matches!(
            relevant_error(Some(transport.into()), api_error()),
            Err(MediaError::Http(_))
        ));
    }

    #[test]
    fn test_decode_api_error_non_json() {
        assert!(decode_api_error(b"<html>bad gateway</html>").is_empty());
        assert!(decode_api_error(br#"{"media_id": 1}"#).is_empty());
        assert!(!decode_api_error(br#"{"errors": [{"code": 1, "message": "m"}]}"#).is_empty());
    }

    #[test]
    fn test_service_creation() {
        let config = ConfigBuilder::new()
            .with_base_url("http://127.0.0.1:8080/1.1/")
            .with_media_type("image/png")
            .with_bearer_token("token")
            .build();

        let service = MediaService::new(&config).unwrap();
        assert_eq!(
            service.upload_url().as_str(),
            "http://127.0.0.1:8080/1.1/media/upload.json"
        );
    }

    #[test]
    fn test_service_rejects_invalid_config() {
        let config = ConfigBuilder::new().with_timeout(0).build();
        assert!(matches!(
            MediaService::new(&config),
            Err(MediaError::Configuration(_))
        ));
    }
}
