//! `cascade demo` - runs the sample workflow on the in-memory store.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use tracing::info;

use cascade_core::domain::WorkflowId;
use cascade_core::{App, AppBuilder, CoreError, EngineConfig, JobKind, TaskDraft, WorkflowDraft};

const STATUS_POLL: Duration = Duration::from_millis(100);

/// Polygon every step of the sample receives.
pub fn sample_polygon() -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [-63.624885020050996, -10.311050368263523],
                [-63.61073035341215, -10.311050368263523],
                [-63.61073035341215, -10.299058255070085],
                [-63.624885020050996, -10.299058255070085],
                [-63.624885020050996, -10.311050368263523]
            ]]
        }
    })
}

/// analysis, area, notification (after area), report (after everything).
///
/// With `fail`, the area step is replaced by one that always fails, so the
/// notification is aborted and the report summarizes the failure.
pub fn sample_workflow(fail: bool) -> WorkflowDraft {
    let second = if fail { JobKind::Fail } else { JobKind::Area };
    WorkflowDraft::new("demo-client", sample_polygon())
        .task(TaskDraft::new(1, JobKind::Analysis))
        .task(TaskDraft::new(2, second))
        .task(TaskDraft::new(3, JobKind::Notification).depends_on([2]))
        .task(TaskDraft::new(4, JobKind::Report))
}

pub async fn run(config: EngineConfig, fail: bool, live: bool) -> Result<()> {
    let app = AppBuilder::new(config)
        .with_builtin_jobs()?
        .expect_kinds(&JobKind::ALL)
        .build()
        .context("building engine")?;

    let workflow = app.submit(&sample_workflow(fail)).await?;
    info!(workflow_id = %workflow.workflow_id, "sample workflow submitted");

    if live {
        run_live(&app, workflow.workflow_id).await?;
    } else {
        run_drained(&app, workflow.workflow_id).await?;
    }

    print_outcome(&app, workflow.workflow_id).await
}

/// Run Ready tasks back to back until the workflow is terminal.
async fn run_drained(app: &App, workflow_id: WorkflowId) -> Result<()> {
    let scheduler = app.scheduler();
    loop {
        let ran = scheduler.drain().await?;
        if app.status(workflow_id).await?.status.is_terminal() {
            return Ok(());
        }
        if ran == 0 {
            bail!("{workflow_id} stalled before reaching a terminal status");
        }
    }
}

/// Let the background scheduler work and watch the status until terminal.
async fn run_live(app: &App, workflow_id: WorkflowId) -> Result<()> {
    let handle = app.spawn_scheduler();
    let outcome = loop {
        match app.status(workflow_id).await {
            Ok(view) if view.status.is_terminal() => break Ok(()),
            Ok(_) => tokio::time::sleep(STATUS_POLL).await,
            Err(err) => break Err(err),
        }
    };
    handle.shutdown_and_join().await;
    outcome.map_err(anyhow::Error::from)
}

async fn print_outcome(app: &App, workflow_id: WorkflowId) -> Result<()> {
    let status = app.status(workflow_id).await?;
    println!("{}", serde_json::to_string_pretty(&status)?);

    match app.results(workflow_id).await {
        Ok(results) => println!("{}", serde_json::to_string_pretty(&results)?),
        Err(CoreError::ResultsNotReady { status, .. }) => {
            let pending = json!({
                "workflowId": workflow_id,
                "status": status,
                "message": "no results"
            });
            println!("{pending}");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
