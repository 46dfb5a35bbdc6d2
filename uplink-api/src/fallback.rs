use std::future::Future;

use reqwest::Method;

use crate::ApiError;

/// A single endpoint+method combination to try when the backend's exact
/// contract for an operation is not guaranteed stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub path: String,
    pub method: Method,
}

impl EndpointCandidate {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

/// Candidates for the admin financial/score save, in the order the backend
/// deployments have been observed to accept them.
pub fn admin_info_candidates(project_id: i64) -> Vec<EndpointCandidate> {
    vec![
        EndpointCandidate::new(Method::PUT, format!("/projects/{project_id}/admin-info")),
        EndpointCandidate::new(Method::PATCH, format!("/projects/{project_id}/admin-info")),
        EndpointCandidate::new(Method::PUT, format!("/projects/{project_id}")),
        EndpointCandidate::new(Method::PATCH, format!("/projects/{project_id}")),
    ]
}

/// Candidates for the general project-info save. Paths vary across backend
/// versions, so every path is tried with every method, paths outermost.
pub fn project_info_candidates(project_id: i64) -> Vec<EndpointCandidate> {
    let paths = [
        format!("/projects/{project_id}"),
        format!("/projects/{project_id}/info"),
        format!("/projects/{project_id}/detail"),
        format!("/projects/{project_id}/update"),
    ];
    let methods = [Method::PATCH, Method::PUT, Method::POST];

    paths
        .iter()
        .flat_map(|path| {
            methods
                .iter()
                .map(|method| EndpointCandidate::new(method.clone(), path.clone()))
        })
        .collect()
}

pub fn employee_list_candidates() -> Vec<EndpointCandidate> {
    vec![
        EndpointCandidate::new(Method::GET, "/employees"),
        EndpointCandidate::new(Method::GET, "/users"),
        EndpointCandidate::new(Method::GET, "/admin/users"),
    ]
}

pub fn client_list_candidates() -> Vec<EndpointCandidate> {
    vec![
        EndpointCandidate::new(Method::GET, "/projects/meta/clients"),
        EndpointCandidate::new(Method::GET, "/admin/projects/clients"),
        EndpointCandidate::new(Method::GET, "/meta/clients"),
        EndpointCandidate::new(Method::GET, "/clients"),
    ]
}

pub fn business_type_candidates() -> Vec<EndpointCandidate> {
    vec![
        EndpointCandidate::new(Method::GET, "/projects/meta/business-types"),
        EndpointCandidate::new(Method::GET, "/admin/projects/business-types"),
        EndpointCandidate::new(Method::GET, "/meta/business-types"),
        EndpointCandidate::new(Method::GET, "/business-types"),
    ]
}

/// Drive a candidate list against `send`, short-circuiting on the first
/// success. Only "not found" and "method not allowed" responses fall through
/// to the next candidate; any other error is surfaced immediately.
pub async fn probe<T, F, Fut>(candidates: Vec<EndpointCandidate>, mut send: F) -> Result<T, ApiError>
where
    F: FnMut(EndpointCandidate) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let tried = candidates.len();
    for candidate in candidates {
        let path = candidate.path.clone();
        let method = candidate.method.clone();
        match send(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_route_drift() => {
                tracing::debug!(%method, %path, "endpoint candidate rejected, trying next");
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(ApiError::EndpointUnavailable { tried })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::ready;

    #[test]
    fn admin_info_candidates_prefer_dedicated_route() {
        let candidates = admin_info_candidates(7);
        assert_eq!(
            candidates[0],
            EndpointCandidate::new(Method::PUT, "/projects/7/admin-info")
        );
        assert_eq!(
            candidates[3],
            EndpointCandidate::new(Method::PATCH, "/projects/7")
        );
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn project_info_candidates_iterate_paths_outermost() {
        let candidates = project_info_candidates(7);
        assert_eq!(candidates.len(), 12);
        // all three methods for the first path before the second path shows up
        assert!(candidates[..3]
            .iter()
            .all(|c| c.path == "/projects/7"));
        assert_eq!(candidates[3].path, "/projects/7/info");
    }

    #[tokio::test]
    async fn probe_skips_route_drift_and_returns_first_success() {
        let mut attempts = Vec::new();
        let result = probe(employee_list_candidates(), |candidate| {
            attempts.push(candidate.path.clone());
            ready(match candidate.path.as_str() {
                "/employees" => Err(ApiError::NotFound),
                "/users" => Err(ApiError::MethodNotAllowed),
                _ => Ok(42),
            })
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, vec!["/employees", "/users", "/admin/users"]);
    }

    #[tokio::test]
    async fn probe_surfaces_non_drift_errors_immediately() {
        let mut attempts = 0;
        let result: Result<(), _> = probe(employee_list_candidates(), |_| {
            attempts += 1;
            ready(Err(ApiError::Server("boom".to_string())))
        })
        .await;

        assert!(matches!(result, Err(ApiError::Server(msg)) if msg == "boom"));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn probe_reports_exhaustion() {
        let result: Result<(), _> = probe(admin_info_candidates(1), |_| {
            ready(Err(ApiError::NotFound))
        })
        .await;

        assert!(matches!(
            result,
            Err(ApiError::EndpointUnavailable { tried: 4 })
        ));
    }
}
