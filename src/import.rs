//! Import pipeline: fetch a code's XML archive from gesetze-im-internet,
//! parse its norms, embed them in batches, and upsert them into the store.
//!
//! The archive is a zip containing one norm XML document. Each `<norm>`
//! carries its section identifier in `<enbez>` (e.g. `§ 1`), its title in
//! `<titel>`, and the body inside `<textdaten><text><Content>`. Norms
//! without an `enbez` (front matter, tables of contents) are skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

use crate::catalog;
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::models::LegalText;
use crate::store::LegalTextStore;

/// Number of section texts sent to the embedding endpoint per call.
const EMBED_BATCH_SIZE: usize = 16;

/// One parsed statutory norm.
#[derive(Debug, Clone, PartialEq)]
pub struct Norm {
    pub section: String,
    pub title: Option<String>,
    pub text: String,
}

/// Import every section of `code`, returning the number of sections
/// upserted.
pub async fn import_code(
    client: &reqwest::Client,
    embedder: &dyn Embedder,
    store: &LegalTextStore,
    code: &str,
) -> Result<usize> {
    let entries = catalog::fetch_catalog(client).await?;
    let entry = entries
        .iter()
        .find(|e| e.code == code)
        .ok_or_else(|| Error::NotFound(format!("code '{}' is not in the catalog", code)))?;

    tracing::info!(code, url = %entry.url, "downloading archive");
    let archive = client
        .get(&entry.url)
        .send()
        .await
        .map_err(|e| Error::Transient(format!("archive download failed: {}", e)))?;
    if !archive.status().is_success() {
        return Err(Error::Endpoint(format!(
            "archive download for '{}' returned {}",
            code,
            archive.status()
        )));
    }
    let bytes = archive
        .bytes()
        .await
        .map_err(|e| Error::Transient(format!("archive download interrupted: {}", e)))?;

    let xml = extract_norm_xml(&bytes)?;
    let norms = parse_norms(&xml)?;
    if norms.is_empty() {
        return Err(Error::Endpoint(format!(
            "archive for '{}' contained no sections",
            code
        )));
    }
    tracing::info!(code, sections = norms.len(), "parsed archive");

    let mut imported = 0;
    for batch in norms.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|n| n.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;

        for (norm, vector) in batch.iter().zip(vectors) {
            let record = LegalText {
                code: code.to_string(),
                section: norm.section.clone(),
                sub_section: String::new(),
                title: norm.title.clone(),
                text: norm.text.clone(),
            };
            store.upsert(&record, vector).await?;
            imported += 1;
        }
        tracing::debug!(code, imported, "upserted batch");
    }

    Ok(imported)
}

/// `legal-mcp import` — trigger an import through the HTTP API.
pub async fn run_import(api_url: &str, code: &str) -> anyhow::Result<()> {
    let client = crate::list::connect(api_url).await?;
    match client.import(code).await {
        Ok(response) => {
            println!(
                "Imported {} section{} of '{}'.",
                response.sections_imported,
                if response.sections_imported == 1 {
                    ""
                } else {
                    "s"
                },
                response.code
            );
            Ok(())
        }
        Err(e) => {
            crate::output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Pull the first `.xml` member out of the downloaded zip archive.
fn extract_norm_xml(bytes: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| Error::Endpoint(format!("invalid zip archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::Endpoint(format!("invalid zip entry: {}", e)))?;
        if file.name().ends_with(".xml") {
            let mut xml = String::new();
            file.read_to_string(&mut xml)
                .map_err(|e| Error::Endpoint(format!("invalid zip entry encoding: {}", e)))?;
            return Ok(xml);
        }
    }
    Err(Error::Endpoint("zip archive contains no XML document".into()))
}

/// Parse the norm XML into sections.
pub fn parse_norms(xml: &str) -> Result<Vec<Norm>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut norms = Vec::new();
    let mut in_norm = false;
    let mut in_content = false;
    let mut current_field: Option<&'static str> = None;
    let mut section = String::new();
    let mut title = String::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"norm" => {
                    in_norm = true;
                    section.clear();
                    title.clear();
                    text.clear();
                }
                b"enbez" if in_norm => current_field = Some("enbez"),
                b"titel" if in_norm && !in_content => current_field = Some("titel"),
                b"Content" if in_norm => in_content = true,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let value = t
                    .unescape()
                    .map_err(|e| Error::Endpoint(format!("invalid norm XML text: {}", e)))?;
                match current_field {
                    Some("enbez") => section.push_str(&value),
                    Some("titel") => title.push_str(&value),
                    _ if in_content => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(value.trim());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"norm" => {
                    in_norm = false;
                    let section = section.trim();
                    let body = text.trim();
                    if !section.is_empty() && !body.is_empty() {
                        let title = title.trim();
                        norms.push(Norm {
                            section: section.to_string(),
                            title: if title.is_empty() {
                                None
                            } else {
                                Some(title.to_string())
                            },
                            text: body.to_string(),
                        });
                    }
                }
                b"enbez" | b"titel" => current_field = None,
                b"Content" => in_content = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Endpoint(format!("invalid norm XML: {}", e)));
            }
            _ => {}
        }
    }

    Ok(norms)
}
