use gradewatch_core::Graded;
use gradewatch_engine::{
    compile_filters, list_courses, list_exercises, snapshot, PortalSession, ScrapeError,
    SessionSettings,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT_PAGE: &str = "csrfmiddlewaretoken: 'token-123'";

const FRONTPAGE: &str = r#"
<html><body>
  <a href="/">Home</a>
  <a href="/student/TMA4100/">Matematikk 1</a>
  <a href="/student/TMA4100/">Matematikk 1 (again)</a>
  <a href="/student/TDT4120/">Algoritmer</a>
  <a href="/logout/">Log out</a>
</body></html>
"#;

fn exercise_row(course: &str, id: &str, name: &str, status: &str) -> String {
    format!(
        r#"<a href="/student/{course}/exercise/{id}">
            <div class="col-xs-12 col-sm-6 col-md-8"><strong>{name}</strong></div>
            <div class="col-xs-12 col-sm-6 col-md-4">Status: {status}</div>
        </a>"#
    )
}

fn course_page(rows: &[String]) -> String {
    format!("<html><body>{}</body></html>", rows.join("\n"))
}

async fn logged_in_session(server: &MockServer, frontpage: &str) -> PortalSession {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ROOT_PAGE, "text/html"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(frontpage.to_string(), "text/html"))
        .mount(server)
        .await;

    let settings = SessionSettings {
        base_url: server.uri(),
        ..SessionSettings::default()
    };
    let mut session = PortalSession::new(settings).expect("client");
    session.initialize().await.expect("initialize");
    session.login("user", "secret").await.expect("login");
    session
}

#[tokio::test]
async fn discovers_courses_and_skips_duplicates() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;

    let courses = list_courses(&mut session, &[]).await.expect("courses");
    let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["TMA4100", "TDT4120"]);
    assert_eq!(courses[0].url, "/student/TMA4100/");
}

#[tokio::test]
async fn filters_narrow_by_url_match() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;

    let filters = compile_filters(&["TDT".to_string()]).expect("filters");
    let courses = list_courses(&mut session, &filters).await.expect("courses");
    let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["TDT4120"]);
}

#[test]
fn invalid_filter_is_a_fatal_config_error() {
    let err = compile_filters(&["TMA[".to_string()]).unwrap_err();
    assert!(matches!(err, ScrapeError::BadFilter { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn lists_exercises_with_parsed_statuses() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;
    let page = course_page(&[
        exercise_row("TMA4100", "1", "Øving 1", "levert, rettet, godkjent"),
        exercise_row("TMA4100", "2", "Øving 2", "ikke levert, ikke rettet, ikke vurdert"),
    ]);
    Mock::given(method("GET"))
        .and(path("/student/TMA4100/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;

    let courses = list_courses(&mut session, &[]).await.expect("courses");
    let (exercises, warnings) = list_exercises(&session, &courses[0]).await.expect("exercises");

    assert!(warnings.is_empty());
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0].id, "1");
    assert_eq!(exercises[0].name, "Øving 1");
    assert!(exercises[0].status.delivered);
    assert!(exercises[0].status.corrected);
    assert_eq!(exercises[0].status.graded, Graded::Pass);
    assert_eq!(exercises[1].id, "2");
    assert!(!exercises[1].status.delivered);
    assert_eq!(exercises[1].status.graded, Graded::Pending);
}

#[tokio::test]
async fn malformed_status_drops_one_exercise_keeps_siblings() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;
    let page = course_page(&[
        exercise_row("TMA4100", "1", "Øving 1", "levert, rettet, notavalidtoken"),
        exercise_row("TMA4100", "2", "Øving 2", "levert, ikke rettet, ikke vurdert"),
    ]);
    Mock::given(method("GET"))
        .and(path("/student/TMA4100/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;

    let courses = list_courses(&mut session, &[]).await.expect("courses");
    let (exercises, warnings) = list_exercises(&session, &courses[0]).await.expect("exercises");

    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].id, "2");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].course, "TMA4100");
    assert_eq!(warnings[0].exercise_id, "1");
    assert!(warnings[0].reason.contains("notavalidtoken"));
}

#[tokio::test]
async fn snapshot_preserves_scrape_order_and_collects_warnings() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;
    Mock::given(method("GET"))
        .and(path("/student/TMA4100/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            course_page(&[exercise_row(
                "TMA4100",
                "1",
                "Øving 1",
                "levert, rettet, underkjent",
            )]),
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/TDT4120/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            course_page(&[exercise_row(
                "TDT4120",
                "7",
                "Øving 7",
                "levert, rettet, bogus",
            )]),
            "text/html",
        ))
        .mount(&server)
        .await;

    let courses = list_courses(&mut session, &[]).await.expect("courses");
    let (snap, warnings) = snapshot(&session, &courses).await.expect("snapshot");

    let codes: Vec<&str> = snap.courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["TMA4100", "TDT4120"]);
    assert_eq!(snap.courses[0].exercises.len(), 1);
    assert_eq!(snap.courses[0].exercises[0].status.graded, Graded::Fail);
    // The malformed TDT4120 exercise surfaces as a warning, not an error.
    assert_eq!(snap.courses[1].exercises.len(), 0);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].course, "TDT4120");
}

#[tokio::test]
async fn failing_course_fetch_aborts_the_whole_snapshot() {
    let server = MockServer::start().await;
    let mut session = logged_in_session(&server, FRONTPAGE).await;
    Mock::given(method("GET"))
        .and(path("/student/TMA4100/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            course_page(&[exercise_row(
                "TMA4100",
                "1",
                "Øving 1",
                "levert, rettet, godkjent",
            )]),
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/student/TDT4120/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let courses = list_courses(&mut session, &[]).await.expect("courses");
    let err = snapshot(&session, &courses).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Network(_)));
    assert!(!err.is_fatal());
}
