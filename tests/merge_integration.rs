//! End-to-end merge runs against local HTTP servers

use std::io::Write;

use epg_merge::config::Config;
use epg_merge::errors::AppError;
use epg_merge::merge::SourceOutcome;
use epg_merge::models::{ChannelSelector, EpgSourceConfig, SourceFormat};
use epg_merge::runner;
use epg_merge::xmltv::{Node, parse_document};
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const US_GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv generator-info-name="us-upstream">
  <channel id="101">
    <display-name>US News</display-name>
    <icon src="http://img.test/101.png"/>
  </channel>
  <channel id="102"><display-name>US Sports</display-name></channel>
  <channel id="103"><display-name>US Movies</display-name></channel>
  <programme start="20240101060000 +0000" stop="20240101070000 +0000" channel="101">
    <title lang="en">Morning News</title>
    <desc>Headlines &amp; weather</desc>
  </programme>
  <programme start="20240101060000 +0000" stop="20240101080000 +0000" channel="103">
    <title>Feature</title>
  </programme>
  <programme start="20240101070000 +0000" stop="20240101090000 +0000" channel="102">
    <title>Match Day</title>
  </programme>
</tv>"#;

const UK_GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv>
  <channel id="5"><display-name>UK Five</display-name></channel>
  <programme start="20240101060000 +0000" stop="20240101063000 +0000" channel="5">
    <title>Breakfast</title>
  </programme>
</tv>"#;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn source(
    name: &str,
    url: String,
    format: SourceFormat,
    channels: ChannelSelector,
    prefix: &str,
) -> EpgSourceConfig {
    EpgSourceConfig {
        name: name.to_string(),
        url,
        format,
        channels,
        prefix: prefix.to_string(),
    }
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn merges_sources_and_skips_the_failing_one() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/us.xml.gz",
        ResponseTemplate::new(200).set_body_bytes(gzip(US_GUIDE.as_bytes())),
    )
    .await;
    mount(&server, "/broken.xml", ResponseTemplate::new(404)).await;
    mount(
        &server,
        "/uk.xml",
        ResponseTemplate::new(200).set_body_string(UK_GUIDE),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output").join("guide.xml");
    let mut config = Config::with_sources(vec![
        source(
            "US",
            format!("{}/us.xml.gz", server.uri()),
            SourceFormat::Gz,
            ChannelSelector::only(["101", "102"]),
            "us-",
        ),
        source(
            "Broken",
            format!("{}/broken.xml", server.uri()),
            SourceFormat::Raw,
            ChannelSelector::All,
            "xx-",
        ),
        source(
            "UK",
            format!("{}/uk.xml", server.uri()),
            SourceFormat::Raw,
            ChannelSelector::All,
            "uk-",
        ),
    ]);
    config.output.path = output.clone();

    let stats = runner::run(&config).await.unwrap();
    assert_eq!(stats.total_channels, 3);
    assert_eq!(stats.total_programmes, 3);
    assert_eq!(stats.sources_succeeded, 2);
    assert_eq!(stats.sources_failed, 1);
    assert!(matches!(
        &stats.reports[1].outcome,
        SourceOutcome::Failed { stage: "fetch", error } if error.contains("404")
    ));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));

    let root = parse_document(written.as_bytes()).unwrap();
    assert_eq!(root.attribute("generator-info-name"), Some("EPG Merger"));
    assert_eq!(
        root.attribute("generator-info-url"),
        Some("https://github.com/mdbass/iptv-epg")
    );

    let channel_ids: Vec<_> = root
        .children_named("channel")
        .filter_map(|c| c.attribute("id"))
        .collect();
    assert_eq!(channel_ids, vec!["us-101", "us-102", "uk-5"]);

    let programme_refs: Vec<_> = root
        .children_named("programme")
        .filter_map(|p| p.attribute("channel"))
        .collect();
    assert_eq!(programme_refs, vec!["us-101", "us-102", "uk-5"]);

    let names: Vec<_> = root.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["channel", "channel", "channel", "programme", "programme", "programme"]
    );

    let news = root.children_named("programme").next().unwrap();
    let children: Vec<_> = news.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(children, vec!["title", "desc"]);
    let desc = news.children_named("desc").next().unwrap();
    assert_eq!(desc.children, vec![Node::Text("Headlines & weather".to_string())]);
    assert!(written.contains("Headlines &amp; weather"));
}

#[tokio::test]
async fn writes_empty_guide_when_every_source_fails() {
    let server = MockServer::start().await;
    mount(&server, "/down.xml", ResponseTemplate::new(503)).await;
    mount(
        &server,
        "/garbage.xml",
        ResponseTemplate::new(200).set_body_string("<html><body>maintenance"),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = Config::with_sources(vec![
        source(
            "Down",
            format!("{}/down.xml", server.uri()),
            SourceFormat::Raw,
            ChannelSelector::All,
            "a-",
        ),
        source(
            "Garbage",
            format!("{}/garbage.xml", server.uri()),
            SourceFormat::Raw,
            ChannelSelector::All,
            "b-",
        ),
    ]);
    config.output.path = dir.path().join("guide.xml");

    let stats = runner::run(&config).await.unwrap();
    assert!(stats.all_failed());
    assert_eq!(stats.sources_failed, 2);

    let written = std::fs::read_to_string(&config.output.path).unwrap();
    let root = parse_document(written.as_bytes()).unwrap();
    assert_eq!(root.name, "tv");
    assert_eq!(root.child_elements().count(), 0);
}

#[tokio::test]
async fn loads_sources_file_with_mixed_formats() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/us.xml",
        ResponseTemplate::new(200).set_body_string(US_GUIDE),
    )
    .await;
    mount(
        &server,
        "/uk.xml.gz",
        ResponseTemplate::new(200).set_body_bytes(gzip(UK_GUIDE.as_bytes())),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("merged.xml");
    let sources_file = dir.path().join("sources.json");
    let contents = serde_json::json!({
        "sources": [
            {"name": "US", "url": format!("{}/us.xml", server.uri()), "format": "raw",
             "channels": [103], "prefix": "us-"},
            {"name": "UK", "url": format!("{}/uk.xml.gz", server.uri()), "format": "GZ",
             "channels": "*", "prefix": "uk-"}
        ],
        "output": {"path": output, "generator_name": "Test Merger"},
        "http": {"timeout": "10s"}
    });
    std::fs::write(&sources_file, contents.to_string()).unwrap();

    let config = Config::load_from_file(&sources_file).unwrap();
    let stats = runner::run(&config).await.unwrap();
    assert_eq!(stats.sources_succeeded, 2);

    let root = parse_document(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(root.attribute("generator-info-name"), Some("Test Merger"));
    let channel_ids: Vec<_> = root
        .children_named("channel")
        .filter_map(|c| c.attribute("id"))
        .collect();
    assert_eq!(channel_ids, vec!["us-103", "uk-5"]);
}

#[tokio::test]
async fn unwritable_output_is_an_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/uk.xml",
        ResponseTemplate::new(200).set_body_string(UK_GUIDE),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut config = Config::with_sources(vec![source(
        "UK",
        format!("{}/uk.xml", server.uri()),
        SourceFormat::Raw,
        ChannelSelector::All,
        "uk-",
    )]);
    config.output.path = blocker.join("guide.xml");

    let result = runner::run(&config).await;
    assert!(matches!(result, Err(AppError::Output { .. })));
}
