//! Panel REST API endpoints
//!
//! Exposes the buttons and 7-segment displays over JSON. Register access is
//! serialized through a single lock around the board.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, put},
    Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bank::RegisterBank;
use crate::board::Board;
use crate::buttons::BUTTON_COUNT;
use crate::error::FpgaError;
use crate::regs::RegisterLayout;

/// Shared state containing the panel
pub struct PanelState<B: RegisterBank> {
    board: Mutex<Board<B>>,
    base_addr: usize,
}

impl<B: RegisterBank> PanelState<B> {
    pub fn new(board: Board<B>, base_addr: usize) -> Self {
        Self {
            board: Mutex::new(board),
            base_addr,
        }
    }

    /// Take the board back, e.g. to close it on shutdown
    pub fn into_board(self) -> Board<B> {
        self.board.into_inner()
    }
}

// ============================================================================
// Data structures
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PanelInfo {
    pub base_addr: String,
    pub span: usize,
    pub button_count: usize,
    pub layout: RegisterLayout,
}

#[derive(Debug, Serialize)]
pub struct ButtonsResponse {
    pub raw: u32,
    pub pressed: Vec<bool>,
    pub levels: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: i64,
}

#[derive(Debug, Deserialize)]
pub struct SegmentsRequest {
    pub segments: u8,
}

#[derive(Debug, Serialize)]
pub struct RegisterValue {
    pub offset: usize,
    pub value: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
}

type CommandResponse = (StatusCode, Json<CommandResult>);

fn command(result: Result<String, FpgaError>) -> CommandResponse {
    match result {
        Ok(message) => (StatusCode::OK, Json(CommandResult { success: true, message })),
        Err(e) => {
            let status = if e.is_invalid_input() {
                StatusCode::BAD_REQUEST
            } else {
                tracing::warn!("Panel command failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(CommandResult { success: false, message: e.to_string() }))
        }
    }
}

// ============================================================================
// API handlers
// ============================================================================

/// GET /api/panel - Register layout
async fn get_info<B: RegisterBank>(State(state): State<Arc<PanelState<B>>>) -> Json<PanelInfo> {
    let board = state.board.lock();
    Json(PanelInfo {
        base_addr: format!("0x{:08X}", state.base_addr),
        span: board.bank().size(),
        button_count: BUTTON_COUNT,
        layout: board.layout().clone(),
    })
}

/// GET /api/panel/buttons - Current button state
async fn get_buttons<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
) -> Result<Json<ButtonsResponse>, CommandResponse> {
    let buttons = state.board.lock().read_buttons().map_err(|e| command(Err(e)))?;
    Ok(Json(ButtonsResponse {
        raw: buttons.raw(),
        pressed: (0..BUTTON_COUNT).map(|i| buttons.is_pressed(i)).collect(),
        levels: buttons.levels(BUTTON_COUNT),
    }))
}

/// PUT /api/panel/hex/:position - Show a decimal digit
async fn put_digit<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
    Path(position): Path<usize>,
    Json(req): Json<ValueRequest>,
) -> CommandResponse {
    let result = i32::try_from(req.value)
        .map_err(|_| FpgaError::InvalidDigit(req.value))
        .and_then(|value| {
            state
                .board
                .lock()
                .set_digit(value, position)
                .map(|_| format!("HEX{} = {}", position, value))
        });
    command(result)
}

/// PUT /api/panel/hex/:position/raw - Light a raw segment pattern
async fn put_segments<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
    Path(position): Path<usize>,
    Json(req): Json<SegmentsRequest>,
) -> CommandResponse {
    command(
        state
            .board
            .lock()
            .set_segments(req.segments, position)
            .map(|_| format!("HEX{} = 0b{:07b}", position, req.segments & 0x7F)),
    )
}

/// DELETE /api/panel/hex/:position - Blank one display
async fn delete_digit<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
    Path(position): Path<usize>,
) -> CommandResponse {
    command(
        state
            .board
            .lock()
            .blank(position)
            .map(|_| format!("HEX{} blanked", position)),
    )
}

/// DELETE /api/panel/hex - Blank all displays
async fn delete_all<B: RegisterBank>(State(state): State<Arc<PanelState<B>>>) -> CommandResponse {
    command(state.board.lock().clear().map(|_| "Displays cleared".to_string()))
}

/// PUT /api/panel/number - Show a number across all displays
async fn put_number<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
    Json(req): Json<ValueRequest>,
) -> CommandResponse {
    let result = u32::try_from(req.value)
        .map_err(|_| FpgaError::NumberOutOfRange(req.value))
        .and_then(|n| state.board.lock().show_number(n).map(|_| format!("Showing {}", n)));
    command(result)
}

/// GET /api/panel/reg/:offset - Read raw register
async fn get_register<B: RegisterBank>(
    State(state): State<Arc<PanelState<B>>>,
    Path(offset): Path<usize>,
) -> Json<RegisterValue> {
    let board = state.board.lock();
    let value = if offset < board.bank().size() {
        board.bank().read32(offset)
    } else {
        None
    };
    Json(RegisterValue { offset, value })
}

/// Create the panel API router
pub fn panel_router<B>(state: Arc<PanelState<B>>) -> Router
where
    B: RegisterBank + Send + 'static,
{
    Router::new()
        .route("/", get(get_info::<B>))
        .route("/buttons", get(get_buttons::<B>))
        .route("/hex", delete(delete_all::<B>))
        .route("/hex/:position", put(put_digit::<B>).delete(delete_digit::<B>))
        .route("/hex/:position/raw", put(put_segments::<B>))
        .route("/number", put(put_number::<B>))
        .route("/reg/:offset", get(get_register::<B>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::MemBank;
    use crate::regs::{HEX2_BASE, KEY_BASE, LW_BRIDGE_SPAN};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn panel() -> (Arc<PanelState<MemBank>>, Router) {
        let board = Board::with_bank(MemBank::new(LW_BRIDGE_SPAN), RegisterLayout::default()).unwrap();
        let state = Arc::new(PanelState::new(board, 0xFF20_0000));
        (state.clone(), panel_router(state))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn info_reports_layout() {
        let (_, app) = panel();
        let (status, body) = send(app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["base_addr"], "0xFF200000");
        assert_eq!(body["button_count"], 4);
        assert_eq!(body["layout"]["key"], KEY_BASE);
    }

    #[tokio::test]
    async fn buttons_are_decoded() {
        let (state, app) = panel();
        state.board.lock().bank().poke(KEY_BASE, 0xFE);
        let (status, body) = send(app, "GET", "/buttons", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["levels"], serde_json::json!([1, 0, 0, 0]));
        assert_eq!(body["pressed"], serde_json::json!([true, false, false, false]));
        assert_eq!(body["raw"], 0xFE);
    }

    #[tokio::test]
    async fn digit_is_written() {
        let (state, app) = panel();
        let (status, body) = send(app, "PUT", "/hex/2", Some(r#"{"value":7}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(state.board.lock().bank().writes(), vec![(HEX2_BASE, !0b0000111u32)]);
    }

    #[tokio::test]
    async fn bad_position_is_a_client_error() {
        let (state, app) = panel();
        let (status, body) = send(app, "PUT", "/hex/9", Some(r#"{"value":1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(state.board.lock().bank().writes().is_empty());
    }

    #[tokio::test]
    async fn bad_digit_is_a_client_error() {
        let (state, app) = panel();
        let (status, _) = send(app, "PUT", "/hex/0", Some(r#"{"value":12}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.board.lock().bank().writes().is_empty());
    }

    #[tokio::test]
    async fn number_and_clear() {
        let (state, app) = panel();
        let (status, _) = send(app.clone(), "PUT", "/number", Some(r#"{"value":42}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.board.lock().read_segments(1).unwrap(), 0b1100110);

        let (status, _) = send(app.clone(), "PUT", "/number", Some(r#"{"value":-3}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, "DELETE", "/hex", None).await;
        assert_eq!(status, StatusCode::OK);
        for position in 0..6 {
            assert_eq!(state.board.lock().read_segments(position).unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn raw_register_read() {
        let (state, app) = panel();
        state.board.lock().bank().poke(0x100, 0xDEAD_BEEF);
        let (_, body) = send(app.clone(), "GET", "/reg/256", None).await;
        assert_eq!(body["value"], 0xDEAD_BEEFu32);

        let (_, body) = send(app, "GET", "/reg/20480", None).await;
        assert!(body["value"].is_null());
    }

    #[tokio::test]
    async fn misaligned_register_read_is_null() {
        let (state, app) = panel();
        state.board.lock().bank().poke(0, 0x1234_5678);
        let (status, body) = send(app, "GET", "/reg/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["value"].is_null());
        assert_eq!(state.board.lock().bank().reads(), 0);
    }

    #[tokio::test]
    async fn wrapping_register_offset_is_null() {
        let (state, app) = panel();
        let (status, body) = send(app, "GET", "/reg/18446744073709551612", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["value"].is_null());
        assert_eq!(state.board.lock().bank().reads(), 0);
    }

    #[tokio::test]
    async fn oversized_digit_is_reported_as_sent() {
        let (state, app) = panel();
        let (status, body) = send(app, "PUT", "/hex/0", Some(r#"{"value":4294967296}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Digit 4294967296 out of range (0-9)");
        assert!(state.board.lock().bank().writes().is_empty());
    }
}
