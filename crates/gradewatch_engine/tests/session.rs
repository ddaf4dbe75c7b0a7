use gradewatch_engine::{AuthError, NetworkError, PortalSession, SessionSettings};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT_PAGE: &str = r#"
<html><head><script>
    var form = { csrfmiddlewaretoken: 'token-123', next: '/' };
</script></head><body>Log in</body></html>
"#;

fn settings_for(server: &MockServer) -> SessionSettings {
    SessionSettings {
        base_url: server.uri(),
        ..SessionSettings::default()
    }
}

async fn mount_root(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn initialize_discovers_csrf_token() {
    let server = MockServer::start().await;
    mount_root(&server, ROOT_PAGE).await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    session.initialize().await.expect("initialize");
    assert_eq!(session.csrf_token(), Some("token-123"));
}

#[tokio::test]
async fn initialize_fails_loudly_without_marker() {
    let server = MockServer::start().await;
    mount_root(&server, "<html><body>maintenance page</body></html>").await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, AuthError::TokenNotFound));
}

#[tokio::test]
async fn empty_token_is_not_a_missing_marker() {
    let server = MockServer::start().await;
    mount_root(&server, "csrfmiddlewaretoken: ''").await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    session.initialize().await.expect("initialize");
    assert_eq!(session.csrf_token(), Some(""));
}

#[tokio::test]
async fn login_requires_initialize_first() {
    let server = MockServer::start().await;
    let mut session = PortalSession::new(settings_for(&server)).expect("client");

    let err = session.login("user", "secret").await.unwrap_err();
    assert!(matches!(err, AuthError::NotInitialized));
}

#[tokio::test]
async fn login_posts_token_and_caches_frontpage() {
    let server = MockServer::start().await;
    // The root page must only ever be fetched once, by initialize; course
    // discovery afterwards uses the page cached from the login response.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ROOT_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .and(body_string_contains("csrfmiddlewaretoken=token-123"))
        .and(body_string_contains("username=user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>frontpage after login</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    session.initialize().await.expect("initialize");
    session.login("user", "secret").await.expect("login");

    let frontpage = session.frontpage().await.expect("frontpage");
    assert!(frontpage.contains("frontpage after login"));
}

#[tokio::test]
async fn login_rejection_is_fatal_not_partial() {
    let server = MockServer::start().await;
    mount_root(&server, ROOT_PAGE).await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    session.initialize().await.expect("initialize");
    let err = session.login("user", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 403 }));

    // The rejected login must not have left the session usable.
    let err = session.get("/student/TMA4100/").await.unwrap_err();
    assert!(matches!(err, NetworkError::NotLoggedIn));
}

#[tokio::test]
async fn get_requires_login() {
    let server = MockServer::start().await;
    let session = PortalSession::new(settings_for(&server)).expect("client");

    let err = session.get("/student/TMA4100/").await.unwrap_err();
    assert!(matches!(err, NetworkError::NotLoggedIn));
}

#[tokio::test]
async fn get_surfaces_http_status() {
    let server = MockServer::start().await;
    mount_root(&server, ROOT_PAGE).await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/TMA4100/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = PortalSession::new(settings_for(&server)).expect("client");
    session.initialize().await.expect("initialize");
    session.login("user", "secret").await.expect("login");

    let err = session.get("/student/TMA4100/").await.unwrap_err();
    assert!(matches!(
        err,
        NetworkError::HttpStatus { status: 500, .. }
    ));
}
