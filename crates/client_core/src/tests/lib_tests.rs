use super::*;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{domain::HandlingOption, protocol::DetailsQuery};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Debug, Clone)]
struct UploadedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServerState<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> ServerState<T> {
    fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    async fn capture(&self, value: T) {
        if let Some(tx) = self.tx.lock().await.take() {
            let _ = tx.send(value);
        }
    }
}

async fn spawn_server(app: Router) -> std::io::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn handle_diagnose(
    State(state): State<ServerState<UploadedField>>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state
            .capture(UploadedField {
                name,
                file_name,
                content_type,
                bytes,
            })
            .await;
    }

    Json(json!({
        "status": "success",
        "data": {
            "disease_name": "Blight",
            "confidence": 92.5,
            "description": "Bercak coklat pada daun.",
            "handling_options": [
                { "title": "Cara Mengobati", "action": "treatment" },
                { "title": "Cara Mencegah", "action": "prevention" }
            ]
        }
    }))
}

async fn handle_chat(
    State(state): State<ServerState<ChatRequest>>,
    Json(payload): Json<ChatRequest>,
) -> Json<Value> {
    state.capture(payload).await;
    Json(json!({ "status": "success", "data": { "answer": "Gunakan fungisida." } }))
}

async fn handle_details(
    State(state): State<ServerState<DetailsQuery>>,
    Query(query): Query<DetailsQuery>,
) -> Json<Value> {
    let text = format!("{} / {}", query.disease_name, query.info_type);
    state.capture(query).await;
    Json(json!({ "data": { "text": text } }))
}

fn leaf_upload() -> ImageUpload {
    ImageUpload::new("leaf.jpg", "image/jpeg", b"\xff\xd8\xff fake jpeg".to_vec()).expect("upload")
}

#[tokio::test]
async fn diagnose_sends_multipart_image_field() {
    let (state, rx) = ServerState::new();
    let app = Router::new()
        .route(DIAGNOSE_PATH, post(handle_diagnose))
        .with_state(state);
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(format!("{server_url}/"));
    let diagnosis = client.diagnose(leaf_upload()).await.expect("diagnose");

    let field = rx.await.expect("uploaded field");
    assert_eq!(field.name, "image");
    assert_eq!(field.file_name.as_deref(), Some("leaf.jpg"));
    assert_eq!(field.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(field.bytes, b"\xff\xd8\xff fake jpeg".to_vec());

    assert_eq!(diagnosis.disease_name, "Blight");
    assert_eq!(diagnosis.confidence, Some(92.5));
    assert_eq!(diagnosis.description, "Bercak coklat pada daun.");
    assert_eq!(
        diagnosis.option("treatment"),
        Some(&HandlingOption::new("Cara Mengobati", "treatment"))
    );
}

#[tokio::test]
async fn ask_posts_question_as_json() {
    let (state, rx) = ServerState::new();
    let app = Router::new()
        .route(CHAT_PATH, post(handle_chat))
        .with_state(state);
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let answer = client.ask("Apa obatnya?").await.expect("ask");

    assert_eq!(answer, "Gunakan fungisida.");
    assert_eq!(rx.await.expect("payload").question, "Apa obatnya?");
}

#[tokio::test]
async fn details_encodes_disease_name_and_info_type_as_query() {
    let (state, rx) = ServerState::new();
    let app = Router::new()
        .route(DETAILS_PATH, get(handle_details))
        .with_state(state);
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let text = client
        .details("Bercak Daun & Busuk", "treatment")
        .await
        .expect("details");

    let query = rx.await.expect("query");
    assert_eq!(query.disease_name, "Bercak Daun & Busuk");
    assert_eq!(query.info_type, "treatment");
    assert_eq!(text, "Bercak Daun & Busuk / treatment");
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let app = Router::new().route(
        DIAGNOSE_PATH,
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": "Tidak ada file gambar" })),
            )
        }),
    );
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let err = client.diagnose(leaf_upload()).await.expect_err("must fail");

    match &err {
        ServiceError::Status { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message.as_deref(), Some("Tidak ada file gambar"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.server_message(), Some("Tidak ada file gambar"));
}

#[tokio::test]
async fn error_status_without_json_body_has_no_message() {
    let app = Router::new().route(
        CHAT_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let err = client.ask("halo").await.expect_err("must fail");

    assert!(matches!(
        err,
        ServiceError::Status {
            status: 500,
            message: None
        }
    ));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let app = Router::new().route(CHAT_PATH, post(|| async { "<html>not json</html>" }));
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let err = client.ask("halo").await.expect_err("must fail");

    assert!(matches!(err, ServiceError::Decode(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn success_body_missing_data_is_a_decode_error() {
    let app = Router::new().route(
        DETAILS_PATH,
        get(|| async { Json(json!({ "status": "success" })) }),
    );
    let server_url = spawn_server(app).await.expect("spawn server");

    let client = HttpDiagnosisClient::new(server_url);
    let err = client
        .details("Blight", "treatment")
        .await
        .expect_err("must fail");

    assert!(matches!(err, ServiceError::Decode(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpDiagnosisClient::new(format!("http://{addr}"));
    let err = client.ask("halo").await.expect_err("must fail");

    assert!(matches!(err, ServiceError::Transport(_)), "unexpected: {err:?}");
}

#[test]
fn trailing_slash_is_trimmed_from_server_url() {
    let client = HttpDiagnosisClient::new("http://127.0.0.1:5000//");
    assert_eq!(client.server_url(), "http://127.0.0.1:5000");
    assert_eq!(
        client.endpoint(DIAGNOSE_PATH),
        "http://127.0.0.1:5000/api/diagnose"
    );
}
