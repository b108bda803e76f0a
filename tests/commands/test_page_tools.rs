//! Tests for single-page tools

use fandom_ai::commands::page::{execute, PageTool, NO_INFOBOX};
use fandom_ai::WikiClient;
use httpmock::prelude::*;

const BEE_PAGE: &str = r#"
<html><body><div class="mw-parser-output">
  <table class="infobox">
    <tr><th>Rarity</th><td>Legendary</td></tr>
    <tr><th>Color</th><td>Blue</td></tr>
  </table>
  <p>The Diamond Bee collects pollen.</p>
</div></body></html>"#;

#[tokio::test]
async fn test_infobox_rows_rendered() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Diamond_Bee");
        then.status(200).body(BEE_PAGE);
    });

    let wiki = WikiClient::new().unwrap();
    let out = execute(&wiki, None, &server.url("/wiki/Diamond_Bee"), &PageTool::Infobox)
        .await
        .unwrap();

    assert_eq!(out, "Infobox data:\n- Rarity: Legendary\n- Color: Blue");
    assert_ne!(out, NO_INFOBOX);
}

#[tokio::test]
async fn test_find_term_absent() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Diamond_Bee");
        then.status(200).body(BEE_PAGE);
    });

    let wiki = WikiClient::new().unwrap();
    let out = execute(
        &wiki,
        None,
        &server.url("/wiki/Diamond_Bee"),
        &PageTool::Find("Nectar".into()),
    )
    .await
    .unwrap();
    assert_eq!(out, "'nectar' not found in the page.");
}
