use image::ImageFormat;
use imgconv::{
    client::{ConvertService, HttpConvertClient, LocalConvertClient, MockConvertClient},
    codec::{detect_image_mime, ImageProcessor},
    controller::{ConversionController, RunState},
    models::{ConversionRequest, TargetFormat},
    progress::NoopProgress,
    server::{router, AppState},
    Error,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(Arc::new(ImageProcessor::new())), 10 * 1024 * 1024);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn write_png(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(6, 4, image::Rgb(rgb));
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

#[tokio::test]
async fn test_full_workflow_through_http_endpoint() {
    let addr = spawn_endpoint().await;
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_png(dir.path(), "red.png", [255, 0, 0]),
        write_png(dir.path(), "green.png", [0, 255, 0]),
    ];

    let mut controller = ConversionController::new();
    controller.set_format(TargetFormat::Jpeg);
    controller.select_files(&files).await;
    assert!(controller.selected().iter().all(|image| image.is_loaded()));
    assert!(controller
        .selected()
        .iter()
        .all(|image| image.mime_type == "image/png"));

    let client = HttpConvertClient::new(format!("http://{}", addr));
    let results = controller.convert_all(&client, &NoopProgress).await;

    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["red-cwd-conv.jpeg", "green-cwd-conv.jpeg"]);
    for result in results {
        let bytes = result.decode_data().unwrap();
        assert_eq!(result.size, bytes.len());
        assert_eq!(detect_image_mime(&bytes), "image/jpeg");
    }
    assert_eq!(controller.state(), RunState::Done);
    assert_eq!(controller.progress(), 100.0);
}

#[tokio::test]
async fn test_every_format_through_endpoint_has_matching_magic_bytes() {
    let addr = spawn_endpoint().await;
    let dir = tempfile::tempdir().unwrap();
    let source = write_png(dir.path(), "source.png", [10, 20, 30]);
    let bytes = std::fs::read(&source).unwrap();
    let client = HttpConvertClient::new(format!("http://{}", addr));

    for format in TargetFormat::ALL {
        let request =
            ConversionRequest::new(imgconv::data_url::encode("image/png", &bytes), format);
        let result = client.convert(&request).await.unwrap();

        assert_eq!(result.name, format!("converted.{}", format.extension()));
        let encoded = result.decode_data().unwrap();
        assert_eq!(detect_image_mime(&encoded), format.mime_type());
        assert_eq!(result.size, encoded.len());
    }
}

#[tokio::test]
async fn test_failed_item_does_not_stop_the_run() {
    let addr = spawn_endpoint().await;
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, b"this is not a png").unwrap();
    let files = vec![
        write_png(dir.path(), "a.png", [1, 2, 3]),
        broken,
        write_png(dir.path(), "c.png", [4, 5, 6]),
    ];

    let mut controller = ConversionController::new();
    controller.select_files(&files).await;

    let client = HttpConvertClient::new(format!("http://{}", addr));
    let results = controller.convert_all(&client, &NoopProgress).await;

    let names: Vec<_> = results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["a-cwd-conv.webp", "c-cwd-conv.webp"]);
    assert_eq!(controller.progress(), 100.0);
}

#[tokio::test]
async fn test_endpoint_error_reaches_client_as_status() {
    let addr = spawn_endpoint().await;
    let client = HttpConvertClient::new(format!("http://{}", addr));

    let request = ConversionRequest {
        image_src: "data:image/png;base64,%%%".to_string(),
        format: "png".to_string(),
        original_name: None,
    };
    let err = client.convert(&request).await.unwrap_err();

    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 500);
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["error"], "Error converting image");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_local_client_matches_endpoint_naming() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![write_png(dir.path(), "photo.png", [9, 9, 9])];
    let client = LocalConvertClient::new(Arc::new(ImageProcessor::new()));

    let mut controller = ConversionController::new().with_original_names(false);
    controller.set_format(TargetFormat::Png);
    controller.select_files(&files).await;
    let results = controller.convert_all(&client, &NoopProgress).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "converted.png");
}

#[tokio::test]
async fn test_empty_run_issues_no_requests() {
    let client = MockConvertClient::new();
    let mut controller = ConversionController::new();
    controller.select_files(&[]).await;

    let results = controller.convert_all(&client, &NoopProgress).await;

    assert!(results.is_empty());
    assert_eq!(client.get_call_count(), 0);
    assert_eq!(controller.progress(), 0.0);
}
