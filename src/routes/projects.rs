use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{entities::project::Project, middleware::mw_ctx::CtxState};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/projects", get(get_projects))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub success: bool,
    pub projects: Vec<Project>,
}

async fn get_projects(State(state): State<Arc<CtxState>>) -> Json<ProjectsResponse> {
    Json(ProjectsResponse {
        success: true,
        projects: state.projects.clone(),
    })
}
