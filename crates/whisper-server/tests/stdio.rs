use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, BufReader};
use whisper_server::{RpcServer, serve};
use whisper_settings::WhisperSettings;
use whisper_tools::ToolRouter;

fn server(dir: &std::path::Path) -> Arc<RpcServer> {
    let mut settings = WhisperSettings::default();
    settings.files.base_dir = Some(dir.to_path_buf());
    settings.api.api_key = None;
    Arc::new(RpcServer::new(ToolRouter::from_settings(&settings).unwrap()))
}

/// Feed `input` through the transport and collect every response line.
async fn run(input: &str) -> Vec<Value> {
    let dir = tempfile::tempdir().unwrap();
    let (writer, mut client) = tokio::io::duplex(1 << 16);

    serve(server(dir.path()), BufReader::new(input.as_bytes()), writer)
        .await
        .unwrap();

    let mut out = String::new();
    let _ = client.read_to_string(&mut out).await.unwrap();
    out.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap_or_else(|| panic!("no response for id {id}"))
}

#[tokio::test]
async fn serves_a_session_until_input_closes() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"chat_with_audio","arguments":{"input_file_path":"a.mp3"}}}"#,
        "",
    ]
    .join("\n");

    let responses = run(&input).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(by_id(&responses, 1)["result"]["serverInfo"]["name"], "whisper-mcp");
    assert_eq!(by_id(&responses, 2)["result"]["tools"].as_array().unwrap().len(), 7);
    let call = &by_id(&responses, 3)["result"];
    assert_eq!(call["isError"], true);
    assert_eq!(call["structuredContent"]["error"]["kind"], "configuration");
}

#[tokio::test]
async fn protocol_errors_do_not_stop_the_loop() {
    let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"nope\"}\n{\"jsonrpc\":\"2.0\",\"id\":10,\"method\":\"ping\"}\n";

    let responses = run(input).await;

    assert_eq!(responses.len(), 3);
    let parse = responses.iter().find(|r| r["id"].is_null()).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(by_id(&responses, 9)["error"]["code"], -32601);
    assert_eq!(by_id(&responses, 10)["result"], json!({}));
}

#[tokio::test]
async fn empty_input_produces_no_output() {
    assert!(run("").await.is_empty());
}
