//! Integration tests for page crawling against a mock HTTP server.

use harvester_core::crawl::{CrawlError, HtmlLinkCollector, LinkFilter, LinkSource, apply_filters};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_collector_returns_hrefs_in_document_order() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/index.html",
        r#"<html><body>
            <a href="https://blog.example.com/2020/01/post.html">post</a>
            <a name="anchor-only">no href</a>
            <a href="https://blog.example.com/2020/01/post.html#comments">comments</a>
            <a href="https://drive.google.com/file/d/FID123/view">drive</a>
        </body></html>"#,
    )
    .await;

    let collector = HtmlLinkCollector::new().expect("client");
    let links = collector
        .links_on_page(&format!("{}/index.html", server.uri()))
        .await
        .expect("page should load");

    assert_eq!(
        links,
        vec![
            "https://blog.example.com/2020/01/post.html",
            "https://blog.example.com/2020/01/post.html#comments",
            "https://drive.google.com/file/d/FID123/view",
        ]
    );
}

#[tokio::test]
async fn test_collector_non_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let collector = HtmlLinkCollector::new().expect("client");
    let result = collector
        .links_on_page(&format!("{}/gone", server.uri()))
        .await;

    assert!(
        matches!(result, Err(CrawlError::HttpStatus { status: 500, .. })),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_collector_page_without_anchors_is_empty() {
    let server = MockServer::start().await;
    serve_page(&server, "/empty", "<html><body><p>nothing here</p></body></html>").await;

    let collector = HtmlLinkCollector::new().expect("client");
    let links = collector
        .links_on_page(&format!("{}/empty", server.uri()))
        .await
        .expect("page should load");

    assert!(links.is_empty());
}

#[tokio::test]
async fn test_collected_links_narrowed_by_comment_filter() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/archive",
        r#"<a href="https://blog.example.com/a.html">a</a>
           <a href="https://blog.example.com/a.html#comment-1">c</a>
           <a href="https://other.example.com/b.html">b</a>"#,
    )
    .await;

    let collector = HtmlLinkCollector::new().expect("client");
    let links = collector
        .links_on_page(&format!("{}/archive", server.uri()))
        .await
        .expect("page should load");

    let filters = LinkFilter::compile_all(&[
        r"https://blog\.example\.com".to_string(),
        r"[^#]*$".to_string(),
    ])
    .expect("patterns compile");

    assert_eq!(
        apply_filters(links, &filters),
        vec!["https://blog.example.com/a.html"]
    );
}
