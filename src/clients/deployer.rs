//! WLAN template deployer
//!
//! Deployment is asynchronous on the infrastructure manager: a deploy call
//! returns a job name, and the job's result is looked up separately (first
//! the job id by name, then the job summary by id).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::directory::{EntityIdList, QueryEnvelope};
use super::http::{build_http_client, ensure_success, join_url};
use super::{JobStatus, TemplateDeployer};
use crate::config::{HttpConfig, ServiceConfig};
use crate::error::{HotspotError, Result};

const SERVICE: &str = "infrastructure";
const DEPLOY_PATH: &str = "webacs/api/v1/op/wlanProvisioning/deployTemplate";
const JOB_SUMMARY_PATH: &str = "webacs/api/v1/data/JobSummary";

#[derive(Debug, Serialize)]
struct DeployRequest<'a> {
    #[serde(rename = "deployWlanTemplateDTO")]
    template: DeployTemplate<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployTemplate<'a> {
    controller_name: &'a str,
    template_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployResponse {
    mgmt_response: MgmtResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MgmtResponse {
    job_information: JobInformation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobInformation {
    #[serde(default)]
    job_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobEntityList {
    #[serde(default)]
    entity: Vec<JobEntity>,
}

#[derive(Debug, Deserialize)]
struct JobEntity {
    #[serde(rename = "jobSummaryDTO")]
    summary: JobSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobSummary {
    #[serde(default)]
    result_status: Option<String>,
}

/// Template deployer backed by the infrastructure manager
pub struct DeployerClient {
    client: Client,
    config: ServiceConfig,
}

impl DeployerClient {
    /// Create a deployer client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ServiceConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(http)?,
            config: config.clone(),
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
    }

    async fn job_id(&self, job_name: &str) -> Result<String> {
        let response = self
            .authed(self.client.get(join_url(&self.config.api_url, JOB_SUMMARY_PATH)))
            .query(&[("jobName", job_name)])
            .send()
            .await?;
        let envelope: QueryEnvelope<EntityIdList> =
            ensure_success(SERVICE, response).await?.json().await?;
        envelope
            .query_response
            .first()
            .ok_or_else(|| HotspotError::NotFound(format!("no job named {}", job_name)).into())
    }
}

#[async_trait]
impl TemplateDeployer for DeployerClient {
    async fn deploy_template(&self, device: &str, template_name: &str) -> Result<String> {
        let request = DeployRequest {
            template: DeployTemplate {
                controller_name: device,
                template_name,
            },
        };
        let response = self
            .authed(self.client.put(join_url(&self.config.api_url, DEPLOY_PATH)))
            .json(&request)
            .send()
            .await?;

        let deployed: DeployResponse = ensure_success(SERVICE, response).await?.json().await?;
        let job_name = deployed
            .mgmt_response
            .job_information
            .job_name
            .filter(|j| !j.is_empty())
            .ok_or_else(|| HotspotError::UnexpectedResponse {
                service: SERVICE,
                detail: "deploy response has no jobName".to_string(),
            })?;

        info!(device = %device, template = %template_name, job_name = %job_name, "Template deployment started");
        Ok(job_name)
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatus> {
        let job_id = self.job_id(job_name).await?;
        let url = join_url(
            &self.config.api_url,
            &format!("{}/{}", JOB_SUMMARY_PATH, job_id),
        );
        let response = self.authed(self.client.get(url)).send().await?;
        let envelope: QueryEnvelope<JobEntityList> =
            ensure_success(SERVICE, response).await?.json().await?;

        let summary = envelope
            .query_response
            .entity
            .into_iter()
            .next()
            .ok_or_else(|| HotspotError::UnexpectedResponse {
                service: SERVICE,
                detail: format!("job {} has no summary", job_name),
            })?;

        // A job that has not finished yet carries no result
        let status = JobStatus::new(
            summary
                .summary
                .result_status
                .unwrap_or_else(|| "PENDING".to_string()),
        );
        debug!(job_name = %job_name, job_id = %job_id, status = %status, "Fetched job status");
        Ok(status)
    }
}
