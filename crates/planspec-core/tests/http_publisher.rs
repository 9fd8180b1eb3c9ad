//! HttpPlanServer against a local stub server.
//!
//! The stub answers each accepted connection with one canned response and
//! hands back the raw requests it saw.

use std::time::Duration;

use planspec_core::{
    catalog, publish_plan, Credentials, HttpPlanServer, PlanServer, PublishError,
    PublishOutcome, PublisherConfig, ValidationError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

async fn stub_server(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut socket).await);

            let reason = match status {
                200 => "OK",
                201 => "Created",
                401 => "Unauthorized",
                404 => "Not Found",
                _ => "Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        seen
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client(url: &str) -> HttpPlanServer {
    let config = PublisherConfig::new(url)
        .with_credentials(Credentials::Basic {
            username: "builder".to_string(),
            password: "pw".to_string(),
        })
        .with_timeout(Duration::from_secs(5));
    HttpPlanServer::new(config).unwrap()
}

#[tokio::test]
async fn created_response_maps_to_created() {
    let (url, stub) = stub_server(vec![(201, "")]).await;
    let server = client(&url);
    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();

    let receipt = server.publish(&plan).await.unwrap();
    assert_eq!(receipt.outcome, PublishOutcome::Created);
    assert_eq!(receipt.digest, plan.digest());

    let requests = stub.await.unwrap();
    let request = requests[0].to_ascii_lowercase();
    assert!(request.starts_with("put /rest/api/latest/import/plan http/1.1"));
    assert!(request.contains("authorization: basic "));
    assert!(request.contains("x-request-id: "));
    assert!(request.contains("content-type: application/json"));
    assert!(requests[0].contains("\"plan_key\":\"DMIBSTB\""));
}

#[tokio::test]
async fn ok_response_maps_to_updated() {
    let (url, stub) = stub_server(vec![(201, ""), (200, "")]).await;
    let server = client(&url);
    let plan = catalog::bam2fastx::plan().unwrap().validate().unwrap();

    assert_eq!(
        server.publish(&plan).await.unwrap().outcome,
        PublishOutcome::Created
    );
    assert_eq!(
        server.publish(&plan).await.unwrap().outcome,
        PublishOutcome::Updated
    );

    let requests = stub.await.unwrap();
    let body = |r: &str| r.split("\r\n\r\n").nth(1).unwrap_or_default().to_string();
    assert_eq!(body(&requests[0]), body(&requests[1]));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let (url, _stub) = stub_server(vec![(401, "bad credentials")]).await;
    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();

    let err = client(&url).publish(&plan).await.unwrap_err();
    match err {
        PublishError::Authentication(message) => assert_eq!(message, "bad credentials"),
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn rejection_message_passed_through_verbatim() {
    let message = "Plan PLAYG-DMIBSTB: oid 1jwrvrqpgcf7y belongs to another plan";
    let (url, _stub) = stub_server(vec![(409, message)]).await;
    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();

    let err = client(&url).publish(&plan).await.unwrap_err();
    match &err {
        PublishError::Rejected { status, message: m } => {
            assert_eq!(*status, 409);
            assert_eq!(m, message);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unreachable_server_is_connectivity_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();
    let err = client(&format!("http://{addr}"))
        .publish(&plan)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Connectivity { .. }), "{err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _hold = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let config = PublisherConfig::new(&format!("http://{addr}"))
        .with_timeout(Duration::from_millis(200));
    let server = HttpPlanServer::new(config).unwrap();
    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();

    let err = server.publish(&plan).await.unwrap_err();
    assert!(matches!(err, PublishError::Timeout { .. }), "{err:?}");
}

/// Sends response headers and part of the body, then stalls.
async fn stalling_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: text/plain\r\ncontent-length: 100\r\n\r\nPartial"
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });
    format!("http://{addr}")
}

fn short_timeout_client(url: &str) -> HttpPlanServer {
    let config = PublisherConfig::new(url).with_timeout(Duration::from_millis(300));
    HttpPlanServer::new(config).unwrap()
}

#[tokio::test]
async fn stalled_error_body_times_out() {
    let url = stalling_server("409 Conflict").await;
    let plan = catalog::barcoding::plan().unwrap().validate().unwrap();

    let started = std::time::Instant::now();
    let err = tokio::time::timeout(Duration::from_secs(5), short_timeout_client(&url).publish(&plan))
        .await
        .expect("publish must respect its own deadline")
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(
        matches!(err, PublishError::Timeout { timeout_ms: 300, .. }),
        "{err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn stalled_fetch_body_times_out_within_one_deadline() {
    let url = stalling_server("200 OK").await;
    let identity = catalog::barcoding::plan().unwrap().identity();

    let started = std::time::Instant::now();
    let err = tokio::time::timeout(Duration::from_secs(5), short_timeout_client(&url).fetch(&identity))
        .await
        .expect("fetch must respect its own deadline")
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert!(matches!(err, PublishError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn fetch_missing_plan_returns_none() {
    let (url, stub) = stub_server(vec![(404, "")]).await;
    let identity = catalog::barcoding::plan().unwrap().identity();

    assert!(client(&url).fetch(&identity).await.unwrap().is_none());

    let requests = stub.await.unwrap();
    assert!(requests[0].starts_with("GET /rest/api/latest/import/plan/PLAYG-DMIBSTB "));
}

#[tokio::test]
async fn invalid_plan_fails_before_network() {
    // Nothing listens here; a network attempt would surface as Connectivity.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let plan = catalog::barcoding::plan().unwrap().with_stages(vec![]);
    let err = publish_plan(&client(&format!("http://{addr}")), plan)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PublishError::Validation(ValidationError::NoStages)
    ));
}
