//! Firebase Cloud Messaging, HTTP v1 API.
//!
//! `POST {endpoint}/v1/projects/{project}/messages:send`, one request per
//! token. Multicast fans the per-token requests out concurrently and
//! collects one `SendResponse` per token.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use choresync_core::config::PushConfig;
use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::PushSender;
use choresync_core::traits::push::{
    BatchResponse, MulticastMessage, PushMessage, PushNotification, SendResponse,
};

pub struct FcmSender {
    client: reqwest::Client,
    send_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SendResult {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

impl FcmSender {
    pub fn new(
        endpoint: &str,
        project_id: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if project_id.is_empty() {
            return Err(ChoreSyncError::Config(
                "FCM project_id is required (push.project_id or CHORESYNC_FCM_PROJECT_ID)".into(),
            ));
        }
        if access_token.is_empty() {
            return Err(ChoreSyncError::Config(
                "FCM access token is required (push.access_token or CHORESYNC_FCM_ACCESS_TOKEN)"
                    .into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChoreSyncError::Push(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                endpoint.trim_end_matches('/'),
                project_id
            ),
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &PushConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            &config.project_id,
            &config.access_token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn send_to(&self, token: &str, notification: &PushNotification) -> Result<String> {
        let resp = self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "message": {
                    "token": token,
                    "notification": {
                        "title": notification.title,
                        "body": notification.body,
                    }
                }
            }))
            .send()
            .await
            .map_err(|e| ChoreSyncError::Push(format!("FCM send failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            let result: SendResult = resp
                .json()
                .await
                .map_err(|e| ChoreSyncError::Push(format!("Invalid FCM response: {e}")))?;
            Ok(result.name)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ChoreSyncError::Push(describe_error(status, &body)))
        }
    }
}

/// `"404 UNREGISTERED: Requested entity was not found."` when the body is an
/// FCM error envelope, raw status + body otherwise.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope
                .error
                .details
                .iter()
                .find_map(|d| d.error_code.clone())
                .unwrap_or(envelope.error.status);
            format!("{} {}: {}", status.as_u16(), code, envelope.error.message)
        }
        Err(_) => format!("FCM API error {status}: {body}"),
    }
}

#[async_trait]
impl PushSender for FcmSender {
    fn name(&self) -> &str {
        "fcm"
    }

    async fn send(&self, message: &PushMessage) -> Result<String> {
        self.send_to(&message.token, &message.notification).await
    }

    async fn send_each_for_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        let sends = message
            .tokens
            .iter()
            .map(|token| self.send_to(token, &message.notification));
        let results = futures::future::join_all(sends).await;

        let responses = message
            .tokens
            .iter()
            .zip(results)
            .map(|(token, result)| match result {
                Ok(id) => SendResponse::success(token, id),
                Err(e) => SendResponse::failure(token, e.to_string()),
            })
            .collect();
        Ok(BatchResponse { responses })
    }
}
