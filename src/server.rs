//! HTTP surface: the embedded countdown page and the board API it polls.
//!
//! All decisions are made by the refresh loops; the handlers only hand out
//! the latest published [`Board`], so a request is never slower than a
//! channel read.

use anyhow::Result;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::board::Board;
use crate::scheduler::BoardReceiver;

const BOARD_HTML: &str = include_str!("../static/board.html");

pub fn router(boards: BoardReceiver) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/arrivals", get(arrivals))
        .layer(TraceLayer::new_for_http())
        .with_state(boards)
}

/// Binds `addr` and serves the board until the process ends.
pub async fn serve(addr: &str, boards: BoardReceiver) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "Board server running");
    axum::serve(listener, router(boards)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(BOARD_HTML)
}

async fn arrivals(State(boards): State<BoardReceiver>) -> Json<Board> {
    Json(boards.borrow().as_ref().clone())
}
