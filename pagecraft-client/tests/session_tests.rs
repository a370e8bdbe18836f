use pagecraft_client::{
    ClientConfig, ClientError, ContentStore, EditorSession, HttpStore, MemoryStore, Resource,
};
use pagecraft_sections::{ListResource, ListState, Page, SectionKind, Service, VisualNode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn service(slug: &str, title: &str) -> Service {
    Service {
        slug: slug.to_string(),
        title: title.to_string(),
        ..Service::default()
    }
}

/// Answer exactly one HTTP request with `status` and `body`; resolves to the raw request
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).to_string()
    });
    (format!("http://{}/api", addr), handle)
}

fn http_store(base_url: String) -> HttpStore {
    HttpStore::new(ClientConfig {
        base_url,
        token: Some("tok-123".to_string()),
        timeout_secs: 5,
    })
    .unwrap()
}

// Scenario A

#[tokio::test]
async fn test_sections_keep_order_and_ids_across_save_and_reload() {
    let mut session = EditorSession::create(MemoryStore::new(), "Home", "home");
    let hero = session.draft_mut().add_section(SectionKind::Hero);
    let text = session.draft_mut().add_section(SectionKind::Text);
    assert!(session.is_dirty());

    session.save().await.unwrap();
    assert!(!session.is_dirty());
    assert_eq!(session.store().count(Resource::Pages), 1);

    let stored = session.store().raw(Resource::Pages);
    assert_eq!(stored[0]["content"][0]["id"], json!(hero));
    assert_eq!(stored[0]["content"][0]["type"], json!("hero"));

    session.reload().await.unwrap();
    assert_eq!(session.draft().page().section_ids(), vec![hero, text]);
}

#[tokio::test]
async fn test_second_save_updates_in_place() {
    let mut session = EditorSession::create(MemoryStore::new(), "Home", "home");
    session.save().await.unwrap();
    session.draft_mut().add_section(SectionKind::Quote);
    session.save().await.unwrap();

    assert_eq!(session.store().count(Resource::Pages), 1);
    let page: Page = session.store().page("home").await.unwrap();
    assert_eq!(page.content.len(), 1);
}

// Save failures

#[tokio::test]
async fn test_failed_save_leaves_draft_unchanged() {
    let mut session = EditorSession::create(MemoryStore::new(), "Home", "home");
    session.draft_mut().add_section(SectionKind::Cta);
    let before = session.draft().clone();

    session.store().fail_next(ClientError::Status {
        status: 500,
        message: "database unavailable".to_string(),
    });
    let err = session.save().await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Status {
            status: 500,
            message: "database unavailable".to_string()
        }
    );
    assert_eq!(session.draft(), &before);
    assert!(session.is_dirty());
    assert_eq!(session.store().count(Resource::Pages), 0);

    session.save().await.unwrap();
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_duplicate_section_ids_are_not_sent() {
    let mut session = EditorSession::create(MemoryStore::new(), "Home", "home");
    let first = session.draft_mut().add_section(SectionKind::Text);
    let second = session.draft_mut().add_section(SectionKind::Quote);
    session.draft_mut().section_mut(&second).unwrap().id = Some(first.as_str().into());

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, ClientError::Invalid(_)));
    assert_eq!(session.store().count(Resource::Pages), 0);
}

#[tokio::test]
async fn test_untitled_page_with_loose_slug_still_saves() {
    let mut session = EditorSession::create(MemoryStore::new(), "", "Draft_Page");
    session.draft_mut().add_section(SectionKind::Hero);
    session.save().await.unwrap();
    assert_eq!(session.store().count(Resource::Pages), 1);
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_new_page_is_dirty_before_first_save() {
    let session = EditorSession::create(MemoryStore::new(), "Home", "home");
    assert!(session.is_dirty());
}

#[tokio::test]
async fn test_unauthorized_save_reports_session_expired() {
    let mut session = EditorSession::create(MemoryStore::new(), "Home", "home");
    session.store().fail_next(ClientError::Unauthorized);
    let err = session.save().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Session expired, please sign in again");
    assert!(session.is_dirty());
}

// Fetch-on-render

#[tokio::test]
async fn test_grid_lists_are_fetched_once() {
    let store = MemoryStore::new();
    store
        .seed(Resource::Services, &[service("web", "Web design"), service("brand", "Branding")])
        .unwrap();
    let mut session = EditorSession::create(store, "Home", "home");
    let grid = session.draft_mut().add_section(SectionKind::ServicesGrid);
    session
        .draft_mut()
        .update_section(&grid, json!({ "title": "What we do", "services": ["brand"] }));

    assert_eq!(session.fetch_lists().await, vec![ListResource::Services]);
    assert!(matches!(session.lists().services, Some(ListState::Ready(_))));
    assert_eq!(session.fetch_lists().await, Vec::<ListResource>::new());

    let html = session.render_html().await.unwrap();
    assert!(html.contains("Branding"));
    assert!(!html.contains("Web design"));
}

#[tokio::test]
async fn test_failed_fetch_renders_inline_notice() {
    let store = MemoryStore::new();
    let mut session = EditorSession::create(store, "Blog", "blog");
    session.draft_mut().add_section(SectionKind::BlogGrid);
    session.draft_mut().add_section(SectionKind::Text);

    session
        .store()
        .fail_next(ClientError::Transport("connection refused".to_string()));
    let root = session.render().await;
    let notices: Vec<&VisualNode> = root
        .walk()
        .into_iter()
        .filter(|n| matches!(n, VisualNode::Notice(_)))
        .collect();
    assert_eq!(notices.len(), 1);
    assert!(matches!(session.lists().blogs, Some(ListState::Failed(_))));

    // text section still renders
    assert_eq!(root.children().len(), 2);

    session.invalidate_lists();
    let root = session.render().await;
    assert!(!root.walk().iter().any(|n| matches!(n, VisualNode::Notice(_))));
}

// HTTP

#[tokio::test]
async fn test_http_401_maps_to_unauthorized() {
    let (base_url, server) = serve_once("401 Unauthorized", String::new()).await;
    let result = EditorSession::open(http_store(base_url), "home").await;
    assert_eq!(result.err(), Some(ClientError::Unauthorized));

    let request = server.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /api/pages/home "));
    assert!(request.contains("authorization: bearer tok-123"));
}

#[tokio::test]
async fn test_http_page_is_normalized_on_load() {
    let body = json!({
        "id": 4,
        "title": "About",
        "slug": "about",
        "status": "published",
        "content": [
            { "id": "sec_1", "data": { "headline": "Hi" } },
            { "id": "sec_2", "type": "service_list", "data": { "cards": [{ "title": "SEO" }] } }
        ]
    });
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;
    let session = EditorSession::open(http_store(base_url), "about").await.unwrap();
    server.await.unwrap();

    let page = session.draft().page();
    assert_eq!(page.content[0].kind(), Some(SectionKind::Hero));
    assert_eq!(page.content[1].data()["services"][0]["enabled"], json!(true));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn test_http_list_accepts_data_envelope() {
    let body = json!({ "data": [{ "slug": "web", "title": "Web design" }] });
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;
    let services = http_store(base_url).services().await.unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/services "));
    assert_eq!(services, vec![service("web", "Web design")]);
}
