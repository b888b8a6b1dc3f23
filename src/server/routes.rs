use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio::time::timeout;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::output::{render_plan_pdf, DEFAULT_REPORT_TITLE};
use crate::planner::{GoalRequest, PlanResponse, TaskItem};

/// Error body shared by every route: `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "planagent server is running",
        "endpoints": ["/react-agent", "/generate-report", "/health"],
        "status": "healthy",
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "react-agent",
        "port": state.port,
    }))
}

pub async fn react_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GoalRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let goal = request.goal.trim();
    if goal.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Goal must not be empty",
        ));
    }

    let span = info_span!("plan", request_id = %Uuid::new_v4());
    async {
        info!("Received goal: {}", goal);
        let planning = state.planner.plan_within(goal, state.request_timeout);
        match timeout(state.request_timeout, planning).await {
            Ok(outcome) => Ok(Json(outcome.into_response())),
            Err(_) => {
                warn!("Planning exceeded {:?}", state.request_timeout);
                Err(ApiError::new(
                    StatusCode::REQUEST_TIMEOUT,
                    "Request timed out. Please try with a simpler goal.",
                ))
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn generate_report(Json(tasks): Json<Vec<TaskItem>>) -> Result<Response, ApiError> {
    if let Some(idx) = tasks
        .iter()
        .position(|t| t.step.trim().is_empty() || t.task.trim().is_empty())
    {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Task {}: step and task must not be empty", idx + 1),
        ));
    }

    let tasks: Vec<TaskItem> = tasks.into_iter().map(TaskItem::normalized).collect();
    info!("Rendering report for {} tasks", tasks.len());

    let rendered =
        tokio::task::spawn_blocking(move || render_plan_pdf(&tasks, DEFAULT_REPORT_TITLE)).await;

    let bytes = match rendered {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            error!("Report rendering failed: {}", e);
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Report generation failed: {}", e),
            ));
        }
        Err(e) => {
            error!("Report task aborted: {}", e);
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Report generation failed",
            ));
        }
    };

    Ok((
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "attachment;filename=project_plan.pdf"),
        ],
        bytes,
    )
        .into_response())
}
