// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the counting service client against a mock server

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use flowercam::errors::UploadError;
use flowercam::pipelines::photo::{EncodedImage, EncodingFormat};
use flowercam::upload::{CountingClient, UploadConfig};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ReceivedFile {
    field: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

type Received = Arc<Mutex<Vec<ReceivedFile>>>;

async fn upload(
    State(received): State<Received>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let file = ReceivedFile {
            field: field.name().map(str::to_string),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: Vec::new(),
        };
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        received.lock().unwrap().push(ReceivedFile {
            bytes: bytes.to_vec(),
            ..file
        });
    }
    Ok(Json(json!({
        "message": "Image processed",
        "filename": "stored.png",
        "flowers_count": 7
    })))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(api_url: String) -> CountingClient {
    CountingClient::new(&UploadConfig {
        api_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn png() -> EncodedImage {
    EncodedImage::png_from_rgba(&image::RgbaImage::from_pixel(
        3,
        3,
        image::Rgba([250, 200, 0, 255]),
    ))
    .unwrap()
}

#[tokio::test]
async fn test_count_sends_png_as_file_field() {
    let received = Received::default();
    let router = Router::new()
        .route("/upload/", post(upload))
        .with_state(received.clone());
    let base = serve(router).await;

    let response = client(base).count_flowers(&png()).await.unwrap();
    assert_eq!(response.flowers_count, 7);
    assert_eq!(response.message.as_deref(), Some("Image processed"));
    assert_eq!(response.filename.as_deref(), Some("stored.png"));

    let files = received.lock().unwrap().clone();
    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.field.as_deref(), Some("file"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));

    // Filename is <epoch-millis>.png
    let file_name = file.file_name.as_deref().unwrap();
    let millis = file_name.strip_suffix(".png").unwrap();
    assert!(millis.parse::<i64>().unwrap() > 1_600_000_000_000);

    assert_eq!(file.bytes, png().data.to_vec());
}

#[tokio::test]
async fn test_count_converts_jpeg_to_png() {
    let received = Received::default();
    let router = Router::new()
        .route("/upload/", post(upload))
        .with_state(received.clone());
    let base = serve(router).await;

    let mut jpeg = Vec::new();
    image::RgbImage::from_pixel(4, 4, image::Rgb([10, 120, 10]))
        .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .unwrap();
    let image = EncodedImage::from_bytes(jpeg).unwrap();
    assert_eq!(image.format, EncodingFormat::Jpeg);

    client(base).count_flowers(&image).await.unwrap();

    let files = received.lock().unwrap().clone();
    assert_eq!(
        image::guess_format(&files[0].bytes).unwrap(),
        image::ImageFormat::Png
    );
}

#[tokio::test]
async fn test_server_error_is_status_failure() {
    let router = Router::new().route(
        "/upload/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let base = serve(router).await;

    let result = client(base).count_flowers(&png()).await;
    assert_eq!(result, Err(UploadError::Status(500)));
}

#[tokio::test]
async fn test_missing_count_is_invalid_response() {
    let router = Router::new().route(
        "/upload/",
        post(|| async { Json(json!({ "message": "no count here" })) }),
    );
    let base = serve(router).await;

    let result = client(base).count_flowers(&png()).await;
    assert!(matches!(result, Err(UploadError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(format!("http://{}", addr)).count_flowers(&png()).await;
    assert!(matches!(result, Err(UploadError::Transport(_))));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let received = Received::default();
    let router = Router::new()
        .route("/upload/", post(upload))
        .with_state(received.clone());
    let base = serve(router).await;

    let response = client(format!("{}/", base)).count_flowers(&png()).await.unwrap();
    assert_eq!(response.flowers_count, 7);
}

#[tokio::test]
async fn test_ping() {
    let router = Router::new().route("/ping/", get(|| async { "pong" }));
    let base = serve(router).await;
    assert_eq!(client(base).ping().await, Ok(()));

    let empty = serve(Router::new()).await;
    assert_eq!(client(empty).ping().await, Err(UploadError::Status(404)));
}
