//! Demonstration sequence exercising every REST operation in order.
//!
//! The steps run create → list → get → update → delete → verify against a
//! live server. The first failing step ends the run; earlier steps are not
//! undone.

use std::fmt;

use shared::UpdateBankRequest;
use thiserror::Error;
use tracing::{error, info};

use crate::api::{BankApiClient, ClientError, ClientResult};

pub const DEMO_NAME: &str = "Bank of America";
pub const DEMO_LOCATION: &str = "Charlotte, NC";
pub const DEMO_UPDATED_NAME: &str = "Bank of America (Updated)";
pub const DEMO_UPDATED_LOCATION: &str = "Charlotte, North Carolina";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    Create,
    List,
    Get,
    Update,
    Delete,
    Verify,
}

impl DemoStep {
    /// Execution order
    pub const SEQUENCE: [DemoStep; 6] = [
        DemoStep::Create,
        DemoStep::List,
        DemoStep::Get,
        DemoStep::Update,
        DemoStep::Delete,
        DemoStep::Verify,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DemoStep::Create => "create",
            DemoStep::List => "list",
            DemoStep::Get => "get",
            DemoStep::Update => "update",
            DemoStep::Delete => "delete",
            DemoStep::Verify => "verify",
        }
    }
}

impl fmt::Display for DemoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One completed step and what it observed
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: DemoStep,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoReport {
    pub completed: Vec<StepOutcome>,
}

impl DemoReport {
    /// Log and keep the outcome of `step`, or stop the run with its error
    fn record<T>(
        &mut self,
        step: DemoStep,
        result: ClientResult<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, DemoError> {
        match result {
            Ok(value) => {
                let summary = describe(&value);
                info!("[{}] {}", step, summary);
                self.completed.push(StepOutcome { step, summary });
                Ok(value)
            }
            Err(source) => {
                error!("[{}] failed: {}", step, source);
                Err(DemoError {
                    step,
                    source,
                    completed: std::mem::take(&mut self.completed),
                })
            }
        }
    }

    pub fn steps(&self) -> Vec<DemoStep> {
        self.completed.iter().map(|outcome| outcome.step).collect()
    }
}

/// The step that stopped the demonstration, with everything done before it
#[derive(Error, Debug)]
#[error("demo aborted at step '{step}': {source}")]
pub struct DemoError {
    pub step: DemoStep,
    #[source]
    pub source: ClientError,
    pub completed: Vec<StepOutcome>,
}

/// Run the full demonstration against the server behind `client`
pub async fn run(client: &BankApiClient) -> Result<DemoReport, DemoError> {
    info!("Running bank API demonstration against {}", client.base_url());
    let mut report = DemoReport::default();

    let bank = report.record(
        DemoStep::Create,
        client.create_bank(DEMO_NAME, DEMO_LOCATION).await,
        |bank| format!("created bank {} (ID: {})", bank.name, bank.id),
    )?;

    report.record(DemoStep::List, client.list_banks().await, |banks| {
        format!("retrieved {} banks", banks.len())
    })?;

    report.record(DemoStep::Get, client.get_bank(bank.id).await, |fetched| {
        format!(
            "ID: {}, Name: {}, Location: {}",
            fetched.id, fetched.name, fetched.location
        )
    })?;

    let changes = UpdateBankRequest {
        name: Some(DEMO_UPDATED_NAME.to_string()),
        location: Some(DEMO_UPDATED_LOCATION.to_string()),
    };
    report.record(
        DemoStep::Update,
        client.update_bank(bank.id, &changes).await,
        |updated| format!("updated bank {} to {} in {}", updated.id, updated.name, updated.location),
    )?;

    report.record(DemoStep::Delete, client.delete_bank(bank.id).await, |_| {
        format!("deleted bank {}", bank.id)
    })?;

    report.record(DemoStep::Verify, client.list_banks().await, |banks| {
        format!("{} banks remaining", banks.len())
    })?;

    info!("Demonstration complete");
    Ok(report)
}
