use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    domain::{
        AdminInfoPayload, BusinessTypeRef, CancelProjectPayload, ClientRef,
        CompleteProjectPayload, Employee, EmployeeListResponse, Project, ProjectInfoPayload,
        ProjectUpdate, UpdateContentPayload,
    },
    fallback, ApiError, ApiUrl,
};

/// Client for the uplink backend. The save operations that are known to
/// drift between backend versions are probed through the fallback candidate
/// lists rather than pinned to a single route.
pub struct UplinkClient {
    base_url: ApiUrl,
    token: Option<String>,
    http: reqwest::Client,
}

impl UplinkClient {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(base_url: ApiUrl, token: impl Into<String>) -> Self {
        Self {
            base_url,
            token: Some(token.into()),
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, url: &ApiUrl) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url.as_ref());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::ResponseError(e.to_string()))?;
        let resp = check_status(resp).await?;

        resp.json::<T>().await.map_err(|e| {
            ApiError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: ApiUrl) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, &url)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: ApiUrl,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.execute(self.request(method, &url).json(body)).await
    }

    /// Send a request where success is the status alone. The body is
    /// discarded, so a `204 No Content` acknowledgement is fine.
    async fn send_unit(
        &self,
        method: Method,
        url: ApiUrl,
        body: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        let mut req = self.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::ResponseError(e.to_string()))?;
        check_status(resp).await?;
        Ok(())
    }

    pub async fn fetch_project(&self, project_id: i64) -> Result<Project, ApiError> {
        let url = self.base_url.append_path(&format!("/projects/{project_id}"));
        self.fetch(url).await
    }

    pub async fn fetch_project_updates(
        &self,
        project_id: i64,
    ) -> Result<Vec<ProjectUpdate>, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/updates"));
        self.fetch(url).await
    }

    pub async fn append_update(
        &self,
        project_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/updates"));
        let payload = UpdateContentPayload {
            content: content.to_string(),
        };
        self.send(Method::POST, url, &payload).await
    }

    pub async fn edit_update(
        &self,
        project_id: i64,
        update_id: i64,
        content: &str,
    ) -> Result<ProjectUpdate, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/updates/{update_id}"));
        let payload = UpdateContentPayload {
            content: content.to_string(),
        };
        self.send(Method::PUT, url, &payload).await
    }

    pub async fn delete_update(&self, project_id: i64, update_id: i64) -> Result<(), ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/updates/{update_id}"));
        self.send_unit(Method::DELETE, url, None).await
    }

    pub async fn complete_project(
        &self,
        project_id: i64,
        payload: &CompleteProjectPayload,
    ) -> Result<Project, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/complete"));
        self.send(Method::POST, url, payload).await
    }

    pub async fn cancel_project(&self, project_id: i64, reason: &str) -> Result<Project, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/cancel"));
        let payload = CancelProjectPayload {
            reason: reason.to_string(),
        };
        self.send(Method::POST, url, &payload).await
    }

    pub async fn reopen_project(&self, project_id: i64) -> Result<Project, ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/reopen"));
        self.send(Method::POST, url, &serde_json::json!({})).await
    }

    pub async fn acknowledge_updates(&self, project_id: i64) -> Result<(), ApiError> {
        let url = self
            .base_url
            .append_path(&format!("/projects/{project_id}/admin-ack"));
        self.send_unit(Method::POST, url, Some(&serde_json::json!({})))
            .await
    }

    /// Save the admin financial/score block, probing the known endpoint
    /// variants because this route is not stable across backend versions.
    pub async fn save_admin_info(
        &self,
        project_id: i64,
        payload: &AdminInfoPayload,
    ) -> Result<Project, ApiError> {
        fallback::probe(fallback::admin_info_candidates(project_id), |candidate| {
            self.send(
                candidate.method,
                self.base_url.append_path(&candidate.path),
                payload,
            )
        })
        .await
    }

    /// Save the general project info, probing path and method variants.
    pub async fn save_project_info(
        &self,
        project_id: i64,
        payload: &ProjectInfoPayload,
    ) -> Result<Project, ApiError> {
        fallback::probe(fallback::project_info_candidates(project_id), |candidate| {
            self.send(
                candidate.method,
                self.base_url.append_path(&candidate.path),
                payload,
            )
        })
        .await
    }

    pub async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let response: EmployeeListResponse =
            fallback::probe(fallback::employee_list_candidates(), |candidate| {
                self.fetch(self.base_url.append_path(&candidate.path))
            })
            .await?;

        Ok(response.into_employees())
    }

    pub async fn fetch_clients(&self) -> Result<Vec<ClientRef>, ApiError> {
        fallback::probe(fallback::client_list_candidates(), |candidate| {
            self.fetch(self.base_url.append_path(&candidate.path))
        })
        .await
    }

    pub async fn fetch_business_types(&self) -> Result<Vec<BusinessTypeRef>, ApiError> {
        fallback::probe(fallback::business_type_candidates(), |candidate| {
            self.fetch(self.base_url.append_path(&candidate.path))
        })
        .await
    }
}

/// Map a response's status onto the error taxonomy, returning the response
/// untouched when it is a success.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status == 401 || status == 403 {
        let detail = resp.text().await.unwrap_or_default();
        return Err(ApiError::Unauthorized(detail));
    }
    if status == 404 {
        return Err(ApiError::NotFound);
    }
    if status == 405 {
        return Err(ApiError::MethodNotAllowed);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Server(server_message(status.as_u16(), &body)));
    }
    Ok(resp)
}

/// Pull a human-readable message out of an error body, falling back to the
/// status code when the body is not the usual `detail`/`message` shape.
fn server_message(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.detail.or(parsed.message) {
            return msg;
        }
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    format!("request failed with status {status}")
}
