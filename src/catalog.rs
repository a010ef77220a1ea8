//! Catalog of importable legal codes.
//!
//! gesetze-im-internet.de publishes a table of contents (`gii-toc.xml`)
//! listing every code with a title and a link to its XML archive. The code
//! identifier is the slug in the link path (e.g. `.../bgb/xml.zip` → `bgb`).

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::models::CatalogEntry;

/// Table-of-contents URL for the public dataset.
pub const TOC_URL: &str = "https://www.gesetze-im-internet.de/gii-toc.xml";

/// Download and parse the catalog.
pub async fn fetch_catalog(client: &reqwest::Client) -> Result<Vec<CatalogEntry>> {
    let response = client
        .get(TOC_URL)
        .send()
        .await
        .map_err(|e| Error::Transient(format!("catalog source not reachable: {}", e)))?;

    if !response.status().is_success() {
        return Err(Error::Endpoint(format!(
            "catalog source returned {}",
            response.status()
        )));
    }

    let xml = response
        .text()
        .await
        .map_err(|e| Error::Transient(format!("failed to read catalog response: {}", e)))?;
    parse_catalog(&xml)
}

/// Parse the TOC XML into catalog entries. Items without a usable link slug
/// are skipped.
pub fn parse_catalog(xml: &str) -> Result<Vec<CatalogEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_item = false;
    let mut current_field: Option<&'static str> = None;
    let mut title = String::new();
    let mut link = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    title.clear();
                    link.clear();
                }
                b"title" if in_item => current_field = Some("title"),
                b"link" if in_item => current_field = Some("link"),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Endpoint(format!("invalid catalog XML text: {}", e)))?;
                match current_field {
                    Some("title") => title.push_str(&text),
                    Some("link") => link.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = false;
                    if let Some(code) = code_from_link(&link) {
                        entries.push(CatalogEntry {
                            code,
                            title: title.trim().to_string(),
                            url: link.trim().to_string(),
                        });
                    }
                }
                b"title" | b"link" => current_field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Endpoint(format!("invalid catalog XML: {}", e)));
            }
            _ => {}
        }
    }

    Ok(entries)
}

/// Extract the code slug from an archive link like
/// `http://www.gesetze-im-internet.de/bgb/xml.zip`.
fn code_from_link(link: &str) -> Option<String> {
    let url = url::Url::parse(link.trim()).ok()?;
    let mut segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    // Last segment is the archive file name
    segments.pop()?;
    let code = segments.pop()?;
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <items>
          <item>
            <title>B&#252;rgerliches Gesetzbuch</title>
            <link>http://www.gesetze-im-internet.de/bgb/xml.zip</link>
          </item>
          <item>
            <title>Strafgesetzbuch</title>
            <link>http://www.gesetze-im-internet.de/stgb/xml.zip</link>
          </item>
          <item>
            <title>Kaputter Eintrag</title>
            <link>not a link</link>
          </item>
        </items>"#;

    #[test]
    fn test_parse_catalog() {
        let entries = parse_catalog(TOC_FIXTURE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "bgb");
        assert_eq!(entries[0].title, "Bürgerliches Gesetzbuch");
        assert_eq!(entries[0].url, "http://www.gesetze-im-internet.de/bgb/xml.zip");
        assert_eq!(entries[1].code, "stgb");
    }

    #[test]
    fn test_parse_empty_catalog() {
        let entries = parse_catalog("<items></items>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_code_from_link() {
        assert_eq!(
            code_from_link("http://www.gesetze-im-internet.de/bgb/xml.zip"),
            Some("bgb".to_string())
        );
        assert_eq!(code_from_link("not a link"), None);
        assert_eq!(code_from_link("http://example.com/xml.zip"), None);
    }
}
