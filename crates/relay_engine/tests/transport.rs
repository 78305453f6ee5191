use std::time::{Duration, Instant};

use relay_core::{RawResponse, RelayError};
use relay_engine::{RequestConfig, ReqwestTransport, Transport, TransportSettings};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(TransportSettings::default()).expect("client")
}

#[tokio::test]
async fn posts_json_and_decodes_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header("content-type", "application/json"))
        .and(header("x-trace", "abc"))
        .and(body_json(json!({"selection": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestConfig::post(
        format!("{}/ingest", server.uri()),
        json!({"selection": "hi"}),
        Duration::from_secs(5),
    )
    .header("x-trace", "abc");

    let raw = transport().send(request).await.expect("send ok");
    assert_eq!(raw, RawResponse::Json(json!({"response": "ok"})));
}

#[tokio::test]
async fn non_json_reply_is_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello there", "text/plain"))
        .mount(&server)
        .await;

    let raw = transport()
        .send(RequestConfig::get(
            format!("{}/plain", server.uri()),
            Duration::from_secs(5),
        ))
        .await
        .expect("send ok");
    assert_eq!(raw, RawResponse::Text("hello there".to_string()));
}

#[tokio::test]
async fn failure_status_becomes_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(503).set_body_string("  overloaded \n"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = transport()
        .send(RequestConfig::post(
            format!("{}/ingest", server.uri()),
            json!({}),
            Duration::from_secs(5),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RelayError::Http {
            status: 503,
            message: "overloaded".into()
        }
    );

    let err = transport()
        .send(RequestConfig::post(
            format!("{}/empty", server.uri()),
            json!({}),
            Duration::from_secs(5),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RelayError::Http {
            status: 404,
            message: "Not Found".into()
        }
    );
}

#[tokio::test]
async fn slow_reply_times_out_and_is_aborted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(1_500))
                .set_body_string("too late"),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(100);
    let started = Instant::now();
    let err = transport()
        .send(RequestConfig::post(
            format!("{}/slow", server.uri()),
            json!({}),
            timeout,
        ))
        .await
        .unwrap_err();

    assert_eq!(err, RelayError::Timeout { timeout });
    // The caller gets control back at the timeout, not when the server answers.
    assert!(started.elapsed() < Duration::from_millis(1_000));
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport()
        .send(RequestConfig::get(
            format!("http://{addr}/"),
            Duration::from_secs(5),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Network { .. }), "{err:?}");
}

#[tokio::test]
async fn invalid_endpoint_is_network_error() {
    let err = transport()
        .send(RequestConfig::get("not a url", Duration::from_secs(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Network { .. }));
}
