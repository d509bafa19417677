//! Health verification - bounded polling of the deployed endpoint

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineError;
use crate::core::retry::RetryPolicy;
use crate::execution::command::{CommandExecutor, CommandSpec};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A single bounded readiness check against a URL.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// true iff the endpoint answered with a success status in time.
    async fn check(&self, url: &str) -> bool;
}

/// Probe backed by an HTTP GET; success is any 2xx within the timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn check(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("probe error: {}", err);
                false
            }
        }
    }
}

/// Polls the deployed service until healthy or the retry budget runs
/// out. Retries cover "cluster reachable but endpoint not yet ready";
/// an unreachable cluster fails immediately instead.
pub struct HealthVerifier<'a, E, P> {
    executor: &'a E,
    probe: &'a P,
    config: &'a PipelineConfig,
    policy: RetryPolicy,
}

impl<'a, E: CommandExecutor, P: HealthProbe> HealthVerifier<'a, E, P> {
    pub fn new(executor: &'a E, probe: &'a P, config: &'a PipelineConfig) -> Self {
        Self {
            executor,
            probe,
            config,
            policy: config.retry_policy(),
        }
    }

    /// Substitute a different retry policy (e.g. exponential backoff)
    /// without touching the polling loop.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn verify(&self) -> Result<(), PipelineError> {
        let address = self.resolve_address().await?;
        let url = self.config.health_url(&address);
        let attempts = self.policy.max_attempts;

        for attempt in 1..=attempts {
            info!("health check attempt {}/{}: GET {}", attempt, attempts, url);
            if self.probe.check(&url).await {
                info!("health check passed");
                return Ok(());
            }
            // No sleep after the final attempt.
            if attempt < attempts {
                tokio::time::sleep(self.policy.delay_for(attempt)).await;
            }
        }

        warn!("service never became healthy: {}", url);
        Err(PipelineError::HealthCheckExhausted { attempts, url })
    }

    /// One executor call. Failure here is fatal before any probe runs
    /// and consumes none of the retry budget.
    async fn resolve_address(&self) -> Result<String, PipelineError> {
        let result = self
            .executor
            .execute(
                &CommandSpec::new("minikube", ["ip"]),
                self.config.command_timeout(),
            )
            .await;
        if !result.success() {
            return Err(PipelineError::AddressUnresolved {
                command: result.command.clone(),
                detail: result.failure_detail(),
            });
        }

        extract_address(&result.stdout).ok_or_else(|| PipelineError::AddressUnresolved {
            command: result.command.clone(),
            detail: format!("no address in output: {:?}", result.stdout.trim()),
        })
    }
}

/// Pull a bare IPv4 address out of command output.
fn extract_address(stdout: &str) -> Option<String> {
    let pattern = match Regex::new(r"(\d{1,3}\.){3}\d{1,3}") {
        Ok(re) => re,
        Err(_) => return None,
    };
    pattern.find(stdout).map(|m| m.as_str().to_string())
}
