use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use graph_core::config::{PlotSettings, MAX_SAMPLE_COUNT};
use graph_core::plot::{
    evaluate_equation_with, find_intersections, plot_equations, Curve, CurveId, Domain, EquationResult,
    EquationSet, Plot, Point, SAMPLE_EQUATIONS,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Format an error as a JSON message for the frontend
fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!("ERROR_UPDATE:{}", error_body(code, message, severity))
}

fn error_body(code: &str, message: &str, severity: &str) -> serde_json::Value {
    json!({
        "code": code,
        "message": message,
        "severity": severity
    })
}

fn unknown_command(text: &str) -> String {
    let command = text.split(':').next().unwrap_or(text);
    format_error("UNKNOWN_COMMAND", &format!("Unknown command: {}", command), "warning")
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(code: &str, message: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(error_body(code, &message.to_string(), "error")),
    )
}

// Application State
struct AppState {
    settings: PlotSettings,
}

fn load_settings() -> PlotSettings {
    let Ok(path) = std::env::var("GRAPH_SETTINGS") else {
        return PlotSettings::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| PlotSettings::from_json(&text).map_err(|e| e.to_string()));
    match loaded {
        Ok(settings) => {
            info!("Loaded settings from {}", path);
            settings
        }
        Err(e) => {
            warn!("Failed to load settings from {}: {}, using defaults", path, e);
            PlotSettings::default()
        }
    }
}

fn bind_address() -> SocketAddr {
    match std::env::var("GRAPH_BACKEND_ADDR") {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid GRAPH_BACKEND_ADDR '{}': {}", raw, e);
            SocketAddr::from(DEFAULT_ADDR)
        }),
        Err(_) => SocketAddr::from(DEFAULT_ADDR),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        settings: load_settings(),
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .route("/api/evaluate", post(evaluate))
        .route("/api/x-values", get(x_values))
        .route("/api/intersections", post(intersections))
        .route("/api/plot", post(plot))
        .route("/api/samples", get(samples))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = bind_address();
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn root() -> &'static str {
    "Hello from Graph Backend!"
}

#[derive(Deserialize)]
struct EvaluateRequest {
    equation: String,
    x_values: Vec<f64>,
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EquationResult>, ApiError> {
    if req.x_values.len() > MAX_SAMPLE_COUNT + 1 {
        return Err(bad_request(
            "TOO_MANY_POINTS",
            format!("At most {} x values per request", MAX_SAMPLE_COUNT + 1),
        ));
    }
    Ok(Json(evaluate_equation_with(
        &req.equation,
        &req.x_values,
        &state.settings,
    )))
}

#[derive(Deserialize)]
struct XValuesQuery {
    min: f64,
    max: f64,
    steps: usize,
}

async fn x_values(Query(q): Query<XValuesQuery>) -> Result<Json<Vec<f64>>, ApiError> {
    let domain = Domain::new(q.min, q.max, q.steps).map_err(|e| bad_request("INVALID_DOMAIN", e))?;
    Ok(Json(domain.abscissas()))
}

#[derive(Deserialize)]
struct IntersectionsRequest {
    a: Curve,
    b: Curve,
}

async fn intersections(Json(req): Json<IntersectionsRequest>) -> Result<Json<Vec<Point>>, ApiError> {
    for curve in [&req.a, &req.b] {
        if curve.points.len() > MAX_SAMPLE_COUNT + 1 {
            return Err(bad_request(
                "TOO_MANY_POINTS",
                format!("Curve {} has more than {} points", curve.id, MAX_SAMPLE_COUNT + 1),
            ));
        }
    }
    Ok(Json(find_intersections(&req.a, &req.b)))
}

#[derive(Deserialize)]
struct PlotRequest {
    equations: Vec<String>,
    domain: Option<Domain>,
}

async fn plot(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlotRequest>,
) -> Result<Json<Plot>, ApiError> {
    let domain = req.domain.unwrap_or(state.settings.domain);
    let plot = plot_equations(&req.equations, &domain, &state.settings)
        .map_err(|e| bad_request("TOO_MANY_EQUATIONS", e))?;
    info!(
        "Plotted {} equations, {} intersections",
        plot.curves.len(),
        plot.intersections.len()
    );
    Ok(Json(plot))
}

async fn samples() -> impl IntoResponse {
    Json(SAMPLE_EQUATIONS)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Send the freshly sampled plot. Returns false once the client is gone.
async fn send_plot(socket: &mut WebSocket, set: &EquationSet, domain: &Domain) -> bool {
    let plot = set.plot(domain);
    let failed = plot.curves.iter().filter(|c| c.failed).count();
    if failed > 0 {
        info!("{} of {} equations produced no curve", failed, plot.curves.len());
    }
    let json = serde_json::to_string(&plot).unwrap_or("{}".to_string());
    socket
        .send(Message::Text(format!("PLOT_UPDATE:{}", json)))
        .await
        .is_ok()
}

async fn send_error(socket: &mut WebSocket, code: &str, message: &str) -> bool {
    socket
        .send(Message::Text(format_error(code, message, "error")))
        .await
        .is_ok()
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    // Each connection owns its equations; nothing is shared between sessions
    let mut set = EquationSet::with_settings(state.settings.clone());
    let mut domain = state.settings.domain;

    if !send_plot(&mut socket, &set, &domain).await {
        return;
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        let Message::Text(text) = msg else {
            continue;
        };
        info!("Received message: {}", text);

        let replot = if text == "PLOT" {
            true
        } else if text == "SAMPLES" {
            let json = serde_json::to_string(SAMPLE_EQUATIONS).unwrap_or("[]".into());
            if socket
                .send(Message::Text(format!("SAMPLES_UPDATE:{}", json)))
                .await
                .is_err()
            {
                return;
            }
            false
        } else if let Some(equation) = text.strip_prefix("EQUATION_ADD:") {
            match set.add(equation) {
                Ok(id) => {
                    info!("Added equation {} '{}'", id, equation);
                    true
                }
                Err(e) => {
                    warn!("Failed to add equation: {}", e);
                    if !send_error(&mut socket, "TOO_MANY_EQUATIONS", &e.to_string()).await {
                        return;
                    }
                    false
                }
            }
        } else if let Some(json_str) = text.strip_prefix("EQUATION_UPDATE:") {
            // Format: EQUATION_UPDATE:{"id":"uuid","equation":"y = 2x"}
            #[derive(Deserialize)]
            struct EquationUpdateCmd {
                id: uuid::Uuid,
                equation: String,
            }

            match serde_json::from_str::<EquationUpdateCmd>(json_str) {
                Ok(cmd) => match set.update(CurveId::from_uuid(cmd.id), &cmd.equation) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Failed to update equation: {}", e);
                        if !send_error(&mut socket, "UNKNOWN_EQUATION", &e.to_string()).await {
                            return;
                        }
                        false
                    }
                },
                Err(e) => {
                    warn!("Failed to parse EQUATION_UPDATE command: {}", e);
                    false
                }
            }
        } else if let Some(id_str) = text.strip_prefix("EQUATION_REMOVE:") {
            match uuid::Uuid::parse_str(id_str) {
                Ok(id) => {
                    if set.remove(CurveId::from_uuid(id)).is_some() {
                        info!("Removed equation {}", id);
                        true
                    } else {
                        warn!("Equation {} not found for removal", id);
                        false
                    }
                }
                Err(_) => {
                    warn!("Invalid UUID for EQUATION_REMOVE: {}", id_str);
                    false
                }
            }
        } else if let Some(json_str) = text.strip_prefix("EQUATION_REORDER:") {
            // Format: EQUATION_REORDER:{"id":"uuid","new_index":0}
            #[derive(Deserialize)]
            struct EquationReorderCmd {
                id: uuid::Uuid,
                new_index: usize,
            }

            match serde_json::from_str::<EquationReorderCmd>(json_str) {
                Ok(cmd) => match set.reorder(CurveId::from_uuid(cmd.id), cmd.new_index) {
                    Ok(()) => {
                        info!("Reordered equation {} to index {}", cmd.id, cmd.new_index);
                        true
                    }
                    Err(e) => {
                        warn!("Failed to reorder equation: {}", e);
                        false
                    }
                },
                Err(e) => {
                    warn!("Failed to parse EQUATION_REORDER command: {}", e);
                    false
                }
            }
        } else if let Some(json_str) = text.strip_prefix("DOMAIN_SET:") {
            // Format: DOMAIN_SET:{"min":-10,"max":10,"sample_count":200}
            match serde_json::from_str::<Domain>(json_str) {
                Ok(new_domain) => {
                    domain = new_domain;
                    info!(
                        "Domain set to [{}, {}] @ {}",
                        domain.min(),
                        domain.max(),
                        domain.sample_count()
                    );
                    true
                }
                Err(e) => {
                    warn!("Rejected DOMAIN_SET: {}", e);
                    if !send_error(&mut socket, "INVALID_DOMAIN", &e.to_string()).await {
                        return;
                    }
                    false
                }
            }
        } else {
            warn!("Unknown command: {}", text);
            if socket.send(Message::Text(unknown_command(&text))).await.is_err() {
                return;
            }
            false
        };

        if replot && !send_plot(&mut socket, &set, &domain).await {
            return;
        }
    }
}
