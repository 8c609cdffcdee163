use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::{
    ServiceClient,
    config::ServiceEndpoint,
    scenario::{AssertionFailure, Scenario, Suite},
};

/// Which scenarios to run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Empty means every suite.
    pub suites: Vec<Suite>,
    /// Substring the scenario name must contain.
    pub name_filter: Option<String>,
}

impl Selection {
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let suite_ok = self.suites.is_empty() || self.suites.contains(&scenario.suite);
        let name_ok = self
            .name_filter
            .as_deref()
            .is_none_or(|f| scenario.name.contains(f));
        suite_ok && name_ok
    }

    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "message", rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    /// An assertion did not hold.
    Failed(String),
    /// The scenario could not be carried out (transport fault, bad body).
    Errored(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub suite: Suite,
    pub url: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub results: Vec<CaseResult>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Failed(_)))
    }

    pub fn errored(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Errored(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errored() == 0
    }

    fn count(&self, pred: impl Fn(&Verdict) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.verdict)).count()
    }
}

/// Runs scenarios one after another against a single endpoint and key.
#[derive(Debug)]
pub struct Runner<'a> {
    client: &'a dyn ServiceClient,
    endpoint: ServiceEndpoint,
    api_key: String,
    fail_fast: bool,
}

impl<'a> Runner<'a> {
    pub fn new(client: &'a dyn ServiceClient, endpoint: ServiceEndpoint, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            fail_fast: false,
        }
    }

    /// Stop after the first scenario that does not pass.
    pub fn fail_fast(mut self, yes: bool) -> Self {
        self.fail_fast = yes;
        self
    }

    pub async fn run_case(&self, scenario: &Scenario) -> CaseResult {
        let url = scenario.url(&self.endpoint, &self.api_key);
        let start = Instant::now();

        let verdict = match scenario.run(self.client, &self.endpoint, &self.api_key).await {
            Ok(()) => Verdict::Passed,
            Err(err) => match err.downcast_ref::<AssertionFailure>() {
                Some(failure) => Verdict::Failed(failure.to_string()),
                None => Verdict::Errored(format!("{err:#}")),
            },
        };
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &verdict {
            Verdict::Passed => info!(scenario = %scenario.name, elapsed_ms, "passed"),
            Verdict::Failed(msg) => warn!(scenario = %scenario.name, "failed: {msg}"),
            Verdict::Errored(msg) => warn!(scenario = %scenario.name, "errored: {msg}"),
        }

        CaseResult {
            name: scenario.name.clone(),
            suite: scenario.suite,
            url,
            verdict,
            elapsed_ms,
        }
    }

    pub async fn run(&self, scenarios: &[Scenario]) -> RunReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(scenarios.len());

        for scenario in scenarios {
            let result = self.run_case(scenario).await;
            let stop = self.fail_fast && result.verdict != Verdict::Passed;
            results.push(result);
            if stop {
                break;
            }
        }

        RunReport {
            started_at,
            results,
        }
    }
}
