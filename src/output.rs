//! Console output for the CLI: aligned tables by default, JSON on request,
//! colored error/hint lines when stderr is a terminal.

use crate::models::{CatalogResponse, CodesResponse, SearchResponse, SectionResponse};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Red error line on stderr.
pub fn print_error(message: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{}Error: {}{}", RED, message, RESET);
    } else {
        eprintln!("Error: {}", message);
    }
}

/// Yellow remediation hint on stderr.
pub fn print_hint(message: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{}{}{}", YELLOW, message, RESET);
    } else {
        eprintln!("{}", message);
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("failed to serialize output: {}", e)),
    }
}

pub fn print_codes(response: &CodesResponse) {
    println!("Imported codes ({}):", response.codes.len());
    for code in &response.codes {
        println!("  {}", code);
    }
}

pub fn print_catalog(response: &CatalogResponse) {
    println!("Available legal codes ({}):", response.count);
    let width = response
        .entries
        .iter()
        .map(|e| e.code.len())
        .max()
        .unwrap_or(4);
    for entry in &response.entries {
        println!("  {:width$}  {}", entry.code, entry.title, width = width);
    }
}

pub fn print_search_results(response: &SearchResponse) {
    if response.results.is_empty() {
        println!("No results.");
        return;
    }

    println!(
        "{} result{} for \"{}\"{}:",
        response.count,
        if response.count == 1 { "" } else { "s" },
        response.query,
        match &response.code {
            Some(code) => format!(" in {}", code),
            None => String::new(),
        }
    );
    println!();

    for (i, hit) in response.results.iter().enumerate() {
        let heading = match (&hit.title, hit.sub_section.as_str()) {
            (Some(title), "") => format!("{} {} — {}", hit.code, hit.section, title),
            (Some(title), sub) => format!("{} {} ({}) — {}", hit.code, hit.section, sub, title),
            (None, "") => format!("{} {}", hit.code, hit.section),
            (None, sub) => format!("{} {} ({})", hit.code, hit.section, sub),
        };
        println!("{}. [{:.4}] {}", i + 1, hit.distance, heading);
        println!("    {}", excerpt(&hit.text, 200));
        println!();
    }
}

pub fn print_section(response: &SectionResponse) {
    for text in &response.texts {
        match (&text.title, text.sub_section.as_str()) {
            (Some(title), "") => println!("{} {} — {}", text.code, text.section, title),
            (Some(title), sub) => println!("{} {} ({}) — {}", text.code, text.section, sub, title),
            (None, "") => println!("{} {}", text.code, text.section),
            (None, sub) => println!("{} {} ({})", text.code, text.section, sub),
        }
        println!();
        println!("{}", text.text);
        println!();
    }
}

/// First `max_chars` of a text with newlines flattened.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let truncated: String = flat.chars().take(max_chars).collect();
    format!("{}…", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("kurzer Text", 200), "kurzer Text");
    }

    #[test]
    fn test_excerpt_flattens_newlines() {
        assert_eq!(excerpt("erste\nzweite", 200), "erste zweite");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        // Multi-byte characters must not be split
        let text = "§§§§§§§§§§";
        let result = excerpt(text, 5);
        assert!(result.starts_with("§§§§§"));
        assert!(result.ends_with('…'));
    }
}
