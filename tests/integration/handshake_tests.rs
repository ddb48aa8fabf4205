//! Integration tests for the sign-in handshake
//!
//! These tests use wiremock to stand in for the site and check the requests
//! the handshake sends.

use listing_crawler::config::{Credentials, SiteConfig};
use listing_crawler::{run_handshake, CrawlerError, LoginOutcome, Session};
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIGN_IN_PATH: &str = "/ws/eBayISAPI.dll";
const SUBMIT_PATH: &str = "/signin/s";
const TEST_USER_AGENT: &str = "TestAgent/1.0";

fn site_config(base_url: &str) -> SiteConfig {
    SiteConfig {
        base_url: format!("{}/", base_url),
        sign_in_url: format!("{}{}?SignIn&ru={}/", base_url, SIGN_IN_PATH, base_url),
        sign_in_submit_url: format!("{}{}", base_url, SUBMIT_PATH),
        user_agent: Some(TEST_USER_AGENT.to_string()),
    }
}

fn sign_in_page() -> String {
    r#"<html><head><script>
        window.cfg = {"dfpmid":"MID0123456789","other":"x"};
    </script></head><body>
        <form>
          <input type="hidden" data-token='{"name":"srt","value":"SRT0123abc"}'>
          <input type="hidden" data-token='{"name":"rqid","value":"RQID42"}'>
        </form>
    </body></html>"#
        .to_string()
}

async fn mount_sign_in_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn submitted_forms(server: &MockServer) -> Vec<HashMap<String, String>> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|request| request.url.path() == SUBMIT_PATH)
        .map(|request| {
            url::form_urlencoded::parse(&request.body)
                .into_owned()
                .collect::<HashMap<String, String>>()
        })
        .collect()
}

#[tokio::test]
async fn test_handshake_follows_root_redirect_and_posts_once() {
    let server = MockServer::start().await;

    let location = format!("{}?SignIn", SIGN_IN_PATH);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", location.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    mount_sign_in_page(&server, sign_in_page()).await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let credentials = Credentials::new("buyer@example.com", "s3cret");
    let authenticated = run_handshake(session, &credentials).await.unwrap();

    assert_eq!(authenticated.outcome(), LoginOutcome::Submitted);

    let forms = submitted_forms(&server).await;
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["userid"], "buyer@example.com");
    assert_eq!(form["pass"], "s3cret");
    assert_eq!(form["srt"], "SRT0123abc");
    assert_eq!(form["rqid"], "RQID42");
    assert_eq!(form["lkdhjebhsjdhejdshdjchquwekguid"], "RQID42");
    assert_eq!(form["mid"], "MID0123456789");
    assert_eq!(form["kmsi"], "1");
    assert_eq!(form["isRecgUser"], "false");
}

#[tokio::test]
async fn test_handshake_navigates_from_root_to_sign_in() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Home</body></html>")
                .insert_header("set-cookie", "visitor=v1; Path=/"),
        )
        .mount(&server)
        .await;
    mount_sign_in_page(&server, sign_in_page()).await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=s1; Path=/"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let authenticated = run_handshake(session, &Credentials::new("u", "p"))
        .await
        .unwrap();

    assert_eq!(authenticated.outcome(), LoginOutcome::Submitted);

    let root = url::Url::parse(&format!("{}/", server.uri())).unwrap();
    let cookies = authenticated.session().cookies_for(&root).unwrap_or_default();
    assert!(cookies.contains("visitor=v1"));
    assert!(cookies.contains("session=s1"));
}

#[tokio::test]
async fn test_method_not_allowed_on_submit_is_captcha() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_sign_in_page(&server, sign_in_page()).await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let authenticated = run_handshake(session, &Credentials::new("u", "p"))
        .await
        .unwrap();

    assert_eq!(authenticated.outcome(), LoginOutcome::CaptchaChallenge);
}

#[tokio::test]
async fn test_other_submit_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_sign_in_page(&server, sign_in_page()).await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let result = run_handshake(session, &Credentials::new("u", "p")).await;

    assert!(matches!(result, Err(CrawlerError::Transport(_))));
}

#[tokio::test]
async fn test_missing_token_stops_before_login_post() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_sign_in_page(
        &server,
        r#"<html><body>{"name":"srt","value":"SRT0123abc"}</body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let result = run_handshake(session, &Credentials::new("u", "p")).await;

    assert!(matches!(result, Err(CrawlerError::Extraction(_))));
}

#[tokio::test]
async fn test_root_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let result = run_handshake(session, &Credentials::new("u", "p")).await;

    assert!(matches!(result, Err(CrawlerError::Transport(_))));
}

#[tokio::test]
async fn test_unexpected_landing_page_is_not_reached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Back soon"))
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let authenticated = run_handshake(session, &Credentials::new("u", "p"))
        .await
        .unwrap();

    assert_eq!(authenticated.outcome(), LoginOutcome::NotReached);
}

#[tokio::test]
async fn test_sign_in_redirecting_to_root_stalls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .mount(&server)
        .await;

    let session = Session::new(site_config(&server.uri())).unwrap();
    let result = run_handshake(session, &Credentials::new("u", "p")).await;

    assert!(matches!(result, Err(CrawlerError::HandshakeStalled { .. })));
}
