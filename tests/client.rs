mod support;

use converter::error::GENERIC_FAILURE;
use converter::{
    AudioFormat, ClientConfig, ClientError, ConversionOptions, ConversionResult, ConversionService,
    HttpConversionClient, Quality,
};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use support::{closed_address, Reply, StubService};

fn client_for(base_url: &str, timeout_secs: Option<u64>) -> HttpConversionClient {
    let config = ClientConfig::new(base_url, timeout_secs, PathBuf::from(".")).unwrap();
    HttpConversionClient::new(config).unwrap()
}

fn request() -> converter::ConversionRequest {
    converter::validator::compose(
        "https://youtu.be/abc123",
        ConversionOptions {
            format: AudioFormat::Wav,
            quality: Quality::Medium,
        },
    )
}

#[test]
fn test_posts_flat_body_to_download() {
    let stub = StubService::start(|_| {
        Reply::json(
            200,
            json!({
                "success": true,
                "message": "Download completed successfully",
                "title": "Song",
                "file_path": "/tmp/x/Song.wav"
            }),
        )
    });

    let result = client_for(&stub.base_url, None).submit(&request()).unwrap();
    assert_eq!(
        result,
        ConversionResult::Converted {
            title: "Song".to_string(),
            file_path: "/tmp/x/Song.wav".to_string()
        }
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/download");
    assert_eq!(
        requests[0].json(),
        json!({"url": "https://youtu.be/abc123", "format": "wav", "quality": "medium"})
    );
}

#[test]
fn test_service_failure_body_is_rejection() {
    let stub = StubService::start(|_| {
        Reply::json(200, json!({"success": false, "message": "Video unavailable"}))
    });

    let result = client_for(&stub.base_url, None).submit(&request()).unwrap();
    assert_eq!(
        result,
        ConversionResult::Rejected {
            message: "Video unavailable".to_string()
        }
    );
}

#[test]
fn test_error_detail_is_kept() {
    let stub = StubService::start(|_| {
        Reply::json(400, json!({"detail": "Download failed: private video"}))
    });

    let err = client_for(&stub.base_url, None).submit(&request()).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Service { ref detail } if detail == "Download failed: private video"
    ));
    assert_eq!(err.user_message(), "Error: Download failed: private video");
}

#[test]
fn test_error_without_detail_is_generic() {
    let stub = StubService::start(|_| Reply::raw(502, b"<html>bad gateway</html>"));

    let err = client_for(&stub.base_url, None).submit(&request()).unwrap_err();
    assert!(matches!(err, ClientError::Status(status) if status.as_u16() == 502));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[test]
fn test_validation_detail_list_is_generic() {
    // request validation errors carry a list, not a message
    let stub = StubService::start(|_| {
        Reply::json(422, json!({"detail": [{"loc": ["body", "format"], "msg": "bad value"}]}))
    });

    let err = client_for(&stub.base_url, None).submit(&request()).unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[test]
fn test_malformed_body_is_protocol_error() {
    let stub = StubService::start(|_| Reply::raw(200, b"not json"));

    let err = client_for(&stub.base_url, None).submit(&request()).unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[test]
fn test_success_without_path_is_protocol_error() {
    let stub = StubService::start(|_| Reply::json(200, json!({"success": true, "title": "Song"})));

    let err = client_for(&stub.base_url, None).submit(&request()).unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
}

#[test]
fn test_connection_refused_is_transport_error() {
    let err = client_for(&closed_address(), None).submit(&request()).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[test]
fn test_timeout_is_transport_error() {
    let stub = StubService::start(|_| {
        Reply::json(200, json!({"success": true, "title": "Song", "file_path": "tmp/abc.mp3"}))
            .after(Duration::from_secs(3))
    });

    let err = client_for(&stub.base_url, Some(1)).submit(&request()).unwrap_err();
    assert!(matches!(err, ClientError::Transport(ref e) if e.is_timeout()));
}

#[test]
fn test_ping_reads_banner() {
    let stub = StubService::start(|_| {
        Reply::json(200, json!({"message": "YouTube Audio Downloader API"}))
    });

    let banner = client_for(&stub.base_url, None).ping().unwrap();
    assert_eq!(banner, "YouTube Audio Downloader API");
    assert_eq!(stub.requests()[0].method, "GET");
    assert_eq!(stub.requests()[0].path, "/api/");
}
