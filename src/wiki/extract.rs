//! HTML extraction for MediaWiki/Fandom pages.
//!
//! Everything here is pure: callers hand in markup, get text back.

use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

/// Main article container on MediaWiki pages.
pub const CONTENT_SELECTOR: &str = "div.mw-parser-output";

/// Anchors inside the `Special:AllPages` listing.
pub const ALL_PAGES_SELECTOR: &str = "ul.mw-allpages-chunk li a";

const HEADING_TAGS: &[&str] = &["h2", "h3", "h4"];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("bad selector {}: {}", css, e)))
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn content_root<'a>(doc: &'a Html) -> Result<ElementRef<'a>> {
    let sel = selector(CONTENT_SELECTOR)?;
    doc.select(&sel)
        .next()
        .ok_or_else(|| Error::Parse("main content container not found".to_string()))
}

/// Visible text of the main content container, whitespace-normalized.
pub fn content_text(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    content_root(&doc).map(element_text)
}

/// Raw `href` values of the all-pages listing, in document order.
pub fn all_pages_hrefs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(sel) = selector(ALL_PAGES_SELECTOR) else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Internal `/wiki/` links of the main content, in document order.
pub fn wiki_links(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let root = content_root(&doc)?;
    let sel = selector("a[href^=\"/wiki/\"]")?;
    Ok(root
        .select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect())
}

fn heading_level(el: &ElementRef<'_>) -> Option<u8> {
    let name = el.value().name();
    if HEADING_TAGS.contains(&name) {
        name[1..].parse().ok()
    } else {
        None
    }
}

/// Heading carried by a content child: either a bare `h2`-`h4` or the
/// `div.mw-heading` wrapper newer MediaWiki puts around it.
fn child_heading<'a>(el: ElementRef<'a>) -> Option<(u8, ElementRef<'a>)> {
    if let Some(level) = heading_level(&el) {
        return Some((level, el));
    }
    if el.value().name() != "div" || !el.value().classes().any(|c| c == "mw-heading") {
        return None;
    }
    let sel = selector(&HEADING_TAGS.join(", ")).ok()?;
    let inner = el.select(&sel).next()?;
    heading_level(&inner).map(|level| (level, inner))
}

fn heading_text(el: ElementRef<'_>) -> String {
    // MediaWiki appends "[edit]" spans to headings.
    let text = match selector("span.mw-headline") {
        Ok(sel) => el.select(&sel).next().map(element_text),
        Err(_) => None,
    }
    .unwrap_or_else(|| element_text(el));
    text.trim_end_matches("[edit]").trim().to_string()
}

/// Section headings (h2-h4) in the main content.
pub fn sections(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let root = content_root(&doc)?;
    let sel = selector(&HEADING_TAGS.join(", "))?;
    Ok(root
        .select(&sel)
        .map(heading_text)
        .filter(|t| !t.is_empty())
        .collect())
}

/// Text following the heading named `name` up to the next heading of the
/// same or higher level. `None` when missing or empty.
pub fn section_text(html: &str, name: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let root = content_root(&doc)?;
    let wanted = name.trim().to_lowercase();

    let mut level: Option<u8> = None;
    let mut parts: Vec<String> = Vec::new();

    for child in root.children().filter_map(ElementRef::wrap) {
        let heading = child_heading(child);
        match (level, heading) {
            (None, Some((next, el))) => {
                if heading_text(el).to_lowercase() == wanted {
                    level = Some(next);
                }
            }
            (Some(current), Some((next, _))) if next <= current => break,
            (Some(_), _) => parts.push(element_text(child)),
            (None, None) => {}
        }
    }

    let text = normalize_whitespace(&parts.join(" "));
    Ok((!text.is_empty()).then_some(text))
}

/// Label/value rows of a `table.infobox`. `None` when the page has no infobox.
pub fn infobox(html: &str) -> Result<Option<Vec<(String, String)>>> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table.infobox")?;
    let Some(table) = doc.select(&table_sel).next() else {
        return Ok(None);
    };

    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let rows = table
        .select(&row_sel)
        .filter_map(|row| {
            let th = row.select(&th_sel).next()?;
            let td = row.select(&td_sel).next()?;
            Some((element_text(th), element_text(td)))
        })
        .collect();
    Ok(Some(rows))
}

/// Case-insensitive containment check used by "find <term>".
pub fn contains_term(text: &str, term: &str) -> bool {
    let term = term.trim();
    !term.is_empty() && text.to_lowercase().contains(&term.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
<html><body>
  <h1>Windy Bee</h1>
  <div class="mw-parser-output">
    <p>The   Windy Bee is an
       event bee.</p>
    <h2><span class="mw-headline">Abilities</span><span class="mw-editsection">[edit]</span></h2>
    <p>Summons <a href="/wiki/Cloud">clouds</a>.</p>
    <h3><span class="mw-headline">Tornado</span></h3>
    <p>Spins fields.</p>
    <h2><span class="mw-headline">Trivia</span></h2>
    <p>It is <a href="https://example.com/x">external</a> and <a href="/wiki/Bees">buzzy</a>.</p>
    <table class="infobox">
      <tr><th>Rarity</th><td> Event </td></tr>
      <tr><th colspan="2">Header only</th></tr>
      <tr><th>Color</th><td>Colorless</td></tr>
    </table>
  </div>
</body></html>"#;

    #[test]
    fn content_text_collapses_whitespace() {
        let text = content_text(ARTICLE).unwrap();
        assert!(text.starts_with("The Windy Bee is an event bee."));
        assert!(!text.contains("  "));
        assert!(!text.contains('\n'));
        assert!(!text.contains("Windy Bee</h1>"));
    }

    #[test]
    fn content_text_requires_container() {
        let err = content_text("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn all_pages_hrefs_in_order_skipping_missing_href() {
        let html = r#"
<ul class="mw-allpages-chunk">
  <li><a href="/wiki/A">A</a></li>
  <li><a>no href</a></li>
  <li><a href="/wiki/B">B</a></li>
</ul>
<ul class="other"><li><a href="/wiki/Ignored">x</a></li></ul>"#;
        assert_eq!(all_pages_hrefs(html), vec!["/wiki/A", "/wiki/B"]);
    }

    #[test]
    fn wiki_links_only_internal() {
        let links = wiki_links(ARTICLE).unwrap();
        assert_eq!(links, vec!["/wiki/Cloud", "/wiki/Bees"]);
    }

    #[test]
    fn sections_strip_edit_links() {
        let names = sections(ARTICLE).unwrap();
        assert_eq!(names, vec!["Abilities", "Tornado", "Trivia"]);
    }

    #[test]
    fn section_text_stops_at_same_level_heading() {
        let text = section_text(ARTICLE, "abilities").unwrap().unwrap();
        assert!(text.contains("Summons clouds"));
        assert!(text.contains("Spins fields"));
        assert!(!text.contains("external"));
    }

    #[test]
    fn section_text_subsection_stops_at_higher_heading() {
        let text = section_text(ARTICLE, "Tornado").unwrap().unwrap();
        assert_eq!(text, "Spins fields.");
    }

    #[test]
    fn section_text_with_wrapped_headings() {
        let html = r#"
<div class="mw-parser-output">
  <p>Intro.</p>
  <div class="mw-heading mw-heading2"><h2 id="Abilities">Abilities</h2><span class="mw-editsection">[edit]</span></div>
  <p>Summons clouds.</p>
  <div class="mw-heading mw-heading3"><h3>Tornado</h3></div>
  <p>Spins fields.</p>
  <div class="mw-heading mw-heading2"><h2>Trivia</h2></div>
  <p>Likes wind.</p>
</div>"#;
        assert_eq!(sections(html).unwrap(), vec!["Abilities", "Tornado", "Trivia"]);
        let abilities = section_text(html, "Abilities").unwrap().unwrap();
        assert!(abilities.starts_with("Summons clouds."));
        assert!(abilities.ends_with("Spins fields."));
        assert!(!abilities.contains("Likes wind"));
        assert_eq!(section_text(html, "tornado").unwrap().unwrap(), "Spins fields.");
        assert_eq!(section_text(html, "Trivia").unwrap().unwrap(), "Likes wind.");
    }

    #[test]
    fn section_text_missing_is_none() {
        assert!(section_text(ARTICLE, "Gallery").unwrap().is_none());
    }

    #[test]
    fn infobox_rows_need_th_and_td() {
        let rows = infobox(ARTICLE).unwrap().unwrap();
        assert_eq!(
            rows,
            vec![
                ("Rarity".to_string(), "Event".to_string()),
                ("Color".to_string(), "Colorless".to_string()),
            ]
        );
    }

    #[test]
    fn infobox_absent_is_none() {
        let html = r#"<div class="mw-parser-output"><p>x</p></div>"#;
        assert!(infobox(html).unwrap().is_none());
    }

    #[test]
    fn normalize_whitespace_trims_and_collapses() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn contains_term_ignores_case() {
        let text = content_text(ARTICLE).unwrap();
        assert!(contains_term(&text, "WINDY bee"));
        assert!(!contains_term(&text, "dragon"));
        assert!(!contains_term(&text, "  "));
    }
}
