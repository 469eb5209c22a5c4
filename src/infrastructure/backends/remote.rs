#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ActionError;
use crate::domain::models::Backend;
use crate::domain::models::ToolRequest;
use crate::domain::models::ToolResponse;
use crate::domain::models::ToolSpec;
use crate::domain::models::Transport;
use crate::domain::models::GENERIC_FAILURE;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanData {
    current_limit: i64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PlanResponse {
    data: PlanData,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

fn convert_err(err: reqwest::Error) -> anyhow::Error {
    return ActionError::Network(err.to_string()).into();
}

/// Turns a failed response into a server error, pulling the message out of
/// the body when the backend sent one.
async fn server_error(res: reqwest::Response) -> anyhow::Error {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| return e.message.or(e.error))
        .filter(|e| return !e.trim().is_empty())
        .unwrap_or_else(|| return GENERIC_FAILURE.to_string());

    tracing::error!(status = status, body = %body, "backend returned an error");
    return ActionError::Server { status, message }.into();
}

/// The owned backend: tools live under `/response/*` on the API host, and
/// credits under `/plans` and `/limits` on the plans host.
pub struct RemoteBackend {
    api_url: String,
    plans_url: String,
}

impl Default for RemoteBackend {
    fn default() -> RemoteBackend {
        return RemoteBackend {
            api_url: Config::get(ConfigKey::ApiURL),
            plans_url: Config::get(ConfigKey::PlansURL),
        };
    }
}

impl RemoteBackend {
    pub fn new(api_url: &str, plans_url: &str) -> RemoteBackend {
        return RemoteBackend {
            api_url: api_url.trim_end_matches('/').to_string(),
            plans_url: plans_url.trim_end_matches('/').to_string(),
        };
    }

    fn plans_endpoint(&self, path: &str, user_id: &str) -> String {
        return format!(
            "{}{path}?clerkId={user_id}",
            self.plans_url.trim_end_matches('/')
        );
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.api_url.is_empty() {
            bail!("API URL is not defined");
        }
        if self.plans_url.is_empty() {
            bail!("Plans URL is not defined");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn current_limit(&self, user_id: &str) -> Result<i64> {
        let res = reqwest::Client::new()
            .get(self.plans_endpoint("/plans/current", user_id))
            .send()
            .await
            .map_err(convert_err)?;

        if res.status().as_u16() != 200 {
            return Err(server_error(res).await);
        }

        let plan = res.json::<PlanResponse>().await?;
        return Ok(plan.data.current_limit);
    }

    #[allow(clippy::implicit_return)]
    async fn decrease_limit(&self, user_id: &str) -> Result<()> {
        let res = reqwest::Client::new()
            .post(self.plans_endpoint("/limits/decrease", user_id))
            .send()
            .await
            .map_err(convert_err)?;

        if !res.status().is_success() {
            return Err(server_error(res).await);
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn invoke(
        &self,
        spec: &ToolSpec,
        request: &ToolRequest,
        user_id: &str,
    ) -> Result<ToolResponse> {
        let mut req = reqwest::Client::new().post(spec.endpoint(&self.api_url, user_id));

        match spec.transport {
            Transport::Json => {
                req = req.json(&request.to_json(spec));
            }
            Transport::Multipart { file_field, .. } => {
                let mut form = multipart::Form::new();
                for (field, value) in request.schema_fields(spec) {
                    form = form.text(field.name, value.to_string());
                }

                if let Some(file) = &request.file {
                    let part = multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.to_string())
                        .mime_str(&file.mime)?;
                    form = form.part(file_field, part);
                }

                req = req.multipart(form);
            }
        }

        tracing::debug!(tool = %spec.name, "invoking tool");
        let res = req.send().await.map_err(convert_err)?;
        if !res.status().is_success() {
            return Err(server_error(res).await);
        }

        if spec.wants_blob() {
            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|e| return e.to_str().ok())
                .map(|e| return e.to_string());
            let bytes = res.bytes().await.map_err(convert_err)?.to_vec();

            return Ok(ToolResponse::Blob {
                bytes,
                content_type,
            });
        }

        let body = res.json::<serde_json::Value>().await?;
        tracing::debug!(body = ?body, "tool response");

        return Ok(ToolResponse::Json(body));
    }
}
