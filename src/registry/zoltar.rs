//! Blocking HTTP client for the Zoltar forecast-model registry.
//!
//! Credentials come from the `Z_USERNAME`/`Z_PASSWORD` environment
//! variables and are read per call, so a missing variable is a
//! recoverable per-file finding rather than a startup failure. The
//! validation pipeline is sequential by design, hence the blocking
//! client; every request carries an explicit timeout.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::{ModelRegistry, RegistryError, TeamModels};

pub const DEFAULT_BASE_URL: &str = "https://zoltardata.com/api/";
pub const USERNAME_VAR: &str = "Z_USERNAME";
pub const PASSWORD_VAR: &str = "Z_PASSWORD";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ZoltarRegistry {
    base_url: Url,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct Project {
    name: String,
    url: Url,
}

#[derive(Debug, Deserialize)]
struct Model {
    name: String,
    team_name: String,
}

impl ZoltarRegistry {
    pub fn new() -> Result<Self, RegistryError> {
        // DEFAULT_BASE_URL is statically known to parse.
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| RegistryError::Authentication(e.to_string()))?;
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: Url) -> Result<Self, RegistryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RegistryError> {
        self.base_url
            .join(path)
            .map_err(|e| RegistryError::Authentication(format!("bad endpoint '{path}': {e}")))
    }

    /// Exchange env credentials for an API token.
    fn authenticate(&self) -> Result<String, RegistryError> {
        let username = std::env::var(USERNAME_VAR)
            .map_err(|_| RegistryError::MissingCredentials(USERNAME_VAR))?;
        let password = std::env::var(PASSWORD_VAR)
            .map_err(|_| RegistryError::MissingCredentials(PASSWORD_VAR))?;

        let endpoint = self.endpoint("api-token-auth/")?;
        let response = self
            .client
            .post(endpoint.clone())
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .map_err(|source| RegistryError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RegistryError::Authentication(format!(
                "registry rejected credentials for '{username}'"
            )));
        }
        if !status.is_success() {
            return Err(RegistryError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .map_err(|source| RegistryError::Deserialization {
                    endpoint: endpoint.to_string(),
                    source,
                })?;
        Ok(token.token)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: Url,
        token: &str,
    ) -> Result<T, RegistryError> {
        let response = self
            .client
            .get(endpoint.clone())
            .header("Authorization", format!("JWT {token}"))
            .send()
            .map_err(|source| RegistryError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        response
            .json()
            .map_err(|source| RegistryError::Deserialization {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

impl ModelRegistry for ZoltarRegistry {
    fn team_models(&self, project: &str) -> Result<TeamModels, RegistryError> {
        let token = self.authenticate()?;

        let projects: Vec<Project> = self.get_json(self.endpoint("projects/")?, &token)?;
        let found = projects
            .into_iter()
            .find(|p| p.name == project)
            .ok_or_else(|| RegistryError::ProjectNotFound(project.to_string()))?;

        let models_endpoint = found
            .url
            .join("models/")
            .map_err(|e| RegistryError::Authentication(format!("bad project url: {e}")))?;
        let models: Vec<Model> = self.get_json(models_endpoint, &token)?;

        let mut by_team = TeamModels::new();
        for model in models {
            by_team.entry(model.team_name).or_default().push(model.name);
        }
        Ok(by_team)
    }
}
