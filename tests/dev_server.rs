mod common;

use block_frame::{BlockIdentity, FrameError, HttpDevServerLoader, Phase};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use common::{block_props, bundle_event, props_event, recording_session};

const BUNDLE: &str = r#"[{"name":"index.js","content":"var VanillaBlockBundle = {};"}]"#;

fn respond(status: &str, headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        headers,
        body.len(),
        body
    )
}

fn route(path: &str) -> String {
    let redirect = |to: &str| respond("302 Found", &format!("Location: {}\r\n", to), "");
    match path {
        "/bundle/octo/blocks/viewer" => respond(
            "200 OK",
            "Content-Type: application/json\r\n",
            BUNDLE,
        ),
        "/old/bundle/octo/blocks/viewer" => redirect("/bundle/octo/blocks/viewer"),
        "/away/bundle/octo/blocks/viewer" => {
            redirect("http://localhost:1/bundle/octo/blocks/viewer")
        }
        "/loop/bundle/octo/blocks/viewer" => redirect("/loop/bundle/octo/blocks/viewer"),
        _ => respond("404 Not Found", "", "not found"),
    }
}

/// Serve canned responses on an ephemeral port, returning the base URL.
async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
            let _ = socket.write_all(route(&path).as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

fn block() -> BlockIdentity {
    BlockIdentity {
        owner: "octo".into(),
        repo: "blocks".into(),
        id: "viewer".into(),
        kind: "file".into(),
    }
}

#[tokio::test]
async fn test_fetches_bundle() {
    let base = spawn_server().await;
    let loader = HttpDevServerLoader::new(&base).unwrap();

    let bundle = loader.fetch_bundle(&block()).await.unwrap();
    assert_eq!(bundle.len(), 1);
    assert_eq!(bundle.assets()[0].name, "index.js");
}

#[tokio::test]
async fn test_follows_same_origin_redirect() {
    let base = spawn_server().await;
    let loader = HttpDevServerLoader::new(&format!("{}/old", base)).unwrap();

    let bundle = loader.fetch_bundle(&block()).await.unwrap();
    assert_eq!(bundle.len(), 1);
}

#[tokio::test]
async fn test_blocks_cross_origin_redirect() {
    let base = spawn_server().await;
    let loader = HttpDevServerLoader::new(&format!("{}/away", base)).unwrap();

    let err = loader.fetch_bundle(&block()).await.unwrap_err();
    assert!(matches!(err, FrameError::DevServer(ref msg) if msg.contains("fetch blocked")));
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let base = spawn_server().await;
    let loader = HttpDevServerLoader::new(&format!("{}/loop", base)).unwrap();

    let err = loader.fetch_bundle(&block()).await.unwrap_err();
    assert!(matches!(err, FrameError::DevServer(ref msg) if msg.contains("too many redirects")));
}

#[tokio::test]
async fn test_missing_block_is_an_error() {
    let base = spawn_server().await;
    let loader = HttpDevServerLoader::new(&base).unwrap();
    let mut unknown = block();
    unknown.id = "nope".into();

    let err = loader.fetch_bundle(&unknown).await.unwrap_err();
    assert!(matches!(err, FrameError::DevServer(ref msg) if msg.contains("404")));
}

#[tokio::test]
async fn test_session_loads_through_dev_server() {
    let base = spawn_server().await;
    let (session, _) = recording_session();
    let mut session =
        session.with_dev_server(Box::new(HttpDevServerLoader::new(&base).unwrap()));

    let mut props = block_props("octo", "hi");
    props["block"] = json!({"owner": "octo", "repo": "blocks", "id": "viewer", "type": "file"});

    session.handle_event(&bundle_event(json!([]))).await.unwrap();
    session.handle_event(&props_event(props)).await.unwrap();

    assert_eq!(session.phase(), Phase::Ready);
    let realm = session.frame().realm();
    assert_eq!(realm.executed.len(), 1);
    assert_eq!(realm.executed[0].origin, "index.js");
    assert_eq!(realm.renders.len(), 1);
}
