//! End-to-end tests for the ingress server over real sockets.

use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use ledger_edge::handlers::ingress_router;
use ledger_edge::http::ServerSettings;

mod common;

const HELLO: &str = r#"{"hello": "Hello World!"}"#;

#[tokio::test]
async fn pipelined_requests_answered_in_order() {
    let server = common::spawn_server(ingress_router().unwrap()).await;

    let raw = common::exchange(
        server.addr,
        &[b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\nGET /hello HTTP/1.1\r\nHost: x\r\n\r\n"],
    )
    .await;

    let responses = common::split_responses(&raw);
    assert_eq!(responses.len(), 2);
    for (status, body) in responses {
        assert_eq!(status, 200);
        assert_eq!(body, HELLO);
    }
    assert!(raw.contains("Content-Type: application/json\r\n"));
    assert!(raw.contains("Server: ledger-edge\r\n"));
}

#[tokio::test]
async fn mixed_pipeline_keeps_request_order() {
    let server = common::spawn_server(ingress_router().unwrap()).await;

    let raw = common::exchange(
        server.addr,
        &[b"GET /unknown HTTP/1.1\r\n\r\nGET /clientes/3/extrato HTTP/1.1\r\n\r\nGET /hello HTTP/1.1\r\n\r\n"],
    )
    .await;

    let responses = common::split_responses(&raw);
    let statuses: Vec<u16> = responses.iter().map(|(s, _)| *s).collect();
    assert_eq!(statuses, vec![404, 200, 200]);
    assert!(responses[1].1.contains("extract id3"));
    assert_eq!(responses[2].1, HELLO);
}

#[tokio::test]
async fn body_split_across_reads_is_reassembled() {
    let server = common::spawn_server(ingress_router().unwrap()).await;
    let body = r#"{"valor":100,"tipo":"c","descricao":"pix"}"#;
    let head = format!(
        "POST /clientes/1/transacoes HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    let (first, second) = body.split_at(10);

    let raw = common::exchange(
        server.addr,
        &[head.as_bytes(), first.as_bytes(), second.as_bytes()],
    )
    .await;

    let responses = common::split_responses(&raw);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].0, 200);
    let json: serde_json::Value = serde_json::from_str(&responses[0].1).unwrap();
    assert_eq!(json["response"], "transacoes id1");
}

#[tokio::test]
async fn malformed_request_gets_bad_request() {
    let server = common::spawn_server(ingress_router().unwrap()).await;

    let raw = common::exchange(server.addr, &[b"NOT A REQUEST\r\n\r\n"]).await;

    let responses = common::split_responses(&raw);
    assert_eq!(responses, vec![(400, r#"{"error":"Bad Request"}"#.to_string())]);
}

#[tokio::test]
async fn partial_request_waits_for_more_bytes() {
    let server = common::spawn_server(ingress_router().unwrap()).await;

    let raw = common::exchange(server.addr, &[b"GET /hel", b"lo HTTP/1.1\r\n", b"\r\n"]).await;

    assert_eq!(common::split_responses(&raw), vec![(200, HELLO.to_string())]);
}

#[tokio::test]
async fn http_client_sees_well_formed_responses() {
    let server = common::spawn_server(ingress_router().unwrap()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/clientes/9/transacoes", server.addr))
        .header("content-type", "application/json")
        .body(r#"{"valor":5,"tipo":"x","descricao":"pix"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 422);
    let json: serde_json::Value = serde_json::from_str(&res.text().await.unwrap()).unwrap();
    assert!(json["error"].is_string());

    let res = client
        .get(format!("http://{}/hello", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert!(res.headers().contains_key("date"));
    assert_eq!(res.text().await.unwrap(), HELLO);
}

#[tokio::test]
async fn idle_connection_closed_without_response() {
    let settings = ServerSettings {
        idle_timeout: Duration::from_millis(200),
        ..ServerSettings::default()
    };
    let server = common::spawn_server_with(ingress_router().unwrap(), settings).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET /hel").await.unwrap();

    let started = Instant::now();
    let mut response = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("idle connection was not closed");
    assert_eq!(read.unwrap(), 0);
    assert!(response.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn connections_are_released_after_close() {
    let server = common::spawn_server(ingress_router().unwrap()).await;
    assert_eq!(server.server.router().routes().len(), 2);

    let raw = common::exchange(server.addr, &[b"GET /hello HTTP/1.1\r\n\r\n"]).await;
    assert_eq!(common::split_responses(&raw).len(), 1);

    let deadline = Instant::now() + Duration::from_secs(2);
    while server.server.active_connections() > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.server.active_connections(), 0);
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let server = common::spawn_server(ingress_router().unwrap()).await;
    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(tokio::net::TcpStream::connect(server.addr).await.is_err());
}
