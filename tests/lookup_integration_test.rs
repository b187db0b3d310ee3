use anyhow::Result;
use book_etl::core::LookupBackend;
use book_etl::{LiveLookup, SiteConfig};
use httpmock::prelude::*;
use std::process::Command;
use tempfile::TempDir;

const ISBN: &str = "9788804660415";

const LANDING: &str = r#"<html><body>
<form name="aspnetForm" method="post" action="./">
  <input type="hidden" name="__VIEWSTATE" value="vs-abc" />
  <input type="hidden" name="__VIEWSTATEGENERATOR" value="gen-1" />
  <input type="hidden" name="__EVENTVALIDATION" value="ev-2" />
</form>
</body></html>"#;

const PRODUCT: &str = r#"<html><body>
<div class="menu">Architettura e urbanistica</div>
<div class="boxproddetail pdpboxproddetail"><h1>Il Nome della Rosa</h1><p>Umberto Eco</p></div>
</body></html>"#;

const EMPTY_RESULTS: &str = "<html><body><p>Nessun risultato</p></body></html>";

fn live(server: &MockServer) -> LiveLookup {
    LiveLookup::new(SiteConfig::for_base_url(server.base_url())).unwrap()
}

#[tokio::test]
async fn test_first_query_template_wins() -> Result<()> {
    let server = MockServer::start_async().await;
    let landing = server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).header("content-type", "text/html").body(LANDING);
        })
        .await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET).path("/ricerca.aspx").query_param("q", ISBN);
            then.status(200).header("content-type", "text/html").body(PRODUCT);
        })
        .await;
    let fallback = server
        .mock_async(|when, then| {
            when.method(GET).path("/libri.aspx");
            then.status(200).body(PRODUCT);
        })
        .await;

    let result = live(&server).lookup(ISBN).await?;

    landing.assert_async().await;
    search.assert_async().await;
    assert_eq!(fallback.hits_async().await, 0);

    assert!(result.found);
    assert_eq!(
        result.html,
        r#"<div class="boxproddetail pdpboxproddetail"><h1>Il Nome della Rosa</h1><p>Umberto Eco</p></div>"#
    );
    assert_eq!(result.text, "Il Nome della RosaUmberto Eco");
    assert_eq!(result.structured_data["isbn"], ISBN);
    assert_eq!(
        result.url(),
        Some(server.url(format!("/ricerca.aspx?q={}", ISBN)).as_str())
    );

    Ok(())
}

#[tokio::test]
async fn test_form_submission_replays_hidden_fields() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(LANDING);
        })
        .await;
    let searches = server
        .mock_async(|when, then| {
            when.method(GET).path_contains(".aspx");
            then.status(200).body(EMPTY_RESULTS);
        })
        .await;
    let form = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("__VIEWSTATE=vs-abc")
                .body_contains("__VIEWSTATEGENERATOR=gen-1")
                .body_contains("__EVENTVALIDATION=ev-2")
                .body_contains("cg2=9788804660415")
                .body_contains("MainSearch=Search");
            then.status(200).body(PRODUCT);
        })
        .await;

    let result = live(&server).lookup(ISBN).await?;

    assert_eq!(searches.hits_async().await, 3);
    form.assert_async().await;
    assert!(result.found);
    assert_eq!(result.url(), Some(server.url("/").as_str()));

    Ok(())
}

#[tokio::test]
async fn test_direct_path_with_text_proximity() -> Result<()> {
    let server = MockServer::start_async().await;
    // landing page without the search form
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html><body>Benvenuti</body></html>");
        })
        .await;
    let form = server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).body(PRODUCT);
        })
        .await;
    let page = format!(
        "<html><body><article><p>Codice {} - {}</p></article></body></html>",
        ISBN,
        "Un romanzo storico ambientato in un monastero medievale. ".repeat(5)
    );
    let direct = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/libri/{}", ISBN));
            then.status(200).body(page);
        })
        .await;

    let result = live(&server).lookup(ISBN).await?;

    assert_eq!(form.hits_async().await, 0);
    direct.assert_async().await;
    assert!(result.found);
    assert!(result.html.starts_with("<article>"));
    assert_eq!(
        result.url(),
        Some(server.url(format!("/libri/{}", ISBN)).as_str())
    );

    Ok(())
}

#[tokio::test]
async fn test_redirect_reports_resolved_url() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ricerca.aspx");
            then.status(302)
                .header("Location", format!("/libro/{}", ISBN));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/libro/{}", ISBN));
            then.status(200).body(PRODUCT);
        })
        .await;

    let result = live(&server).lookup(ISBN).await?;

    assert!(result.found);
    assert_eq!(
        result.url(),
        Some(server.url(format!("/libro/{}", ISBN)).as_str())
    );

    Ok(())
}

#[tokio::test]
async fn test_exhausted_strategies_name_the_isbn() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(LANDING);
        })
        .await;
    let pages = server
        .mock_async(|when, then| {
            when.method(GET).path_contains(ISBN);
            then.status(200).body(EMPTY_RESULTS);
        })
        .await;

    let result = live(&server).lookup(ISBN).await?;

    // the three direct path guesses
    assert_eq!(pages.hits_async().await, 3);
    assert!(!result.found);
    assert_eq!(result.html, "");
    assert_eq!(result.text, "");
    assert_eq!(
        result.error_message(),
        Some(format!("No book found for ISBN {}", ISBN).as_str())
    );

    Ok(())
}

#[tokio::test]
async fn test_unreachable_site_still_yields_result() -> Result<()> {
    let lookup = LiveLookup::new(SiteConfig::for_base_url("http://127.0.0.1:1/"))?;

    let result = lookup.lookup(ISBN).await?;

    assert!(!result.found);
    assert_eq!(
        result.error_message(),
        Some("No book found for ISBN 9788804660415")
    );

    Ok(())
}

#[test]
fn test_cli_prints_json_when_network_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("site.toml");
    std::fs::write(
        &config_path,
        r#"
[site]
base_url = "http://127.0.0.1:1/"

[timeouts]
request_secs = 2
direct_secs = 2
"#,
    )?;

    let output = Command::new(env!("CARGO_BIN_EXE_isbn-lookup"))
        .args([ISBN, "--headless", "--config"])
        .arg(&config_path)
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["found"], false);
    assert_eq!(
        json["structured_data"]["error"],
        "No book found for ISBN 9788804660415"
    );

    Ok(())
}

#[test]
fn test_cli_fixture_backend() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_isbn-lookup"))
        .args(["9788817050289", "--fixture"])
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["found"], true);
    assert_eq!(json["structured_data"]["author"], "Primo Levi");
    assert_eq!(
        json["structured_data"]["url"],
        "https://www.libraccio.it/libro/9788817050289"
    );

    Ok(())
}

#[test]
fn test_cli_bad_config_is_reported_as_json() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_isbn-lookup"))
        .args([ISBN, "--config", "/nonexistent/site.toml"])
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["found"], false);
    assert!(json["structured_data"]["error"]
        .as_str()
        .unwrap()
        .starts_with("Script error:"));

    Ok(())
}
