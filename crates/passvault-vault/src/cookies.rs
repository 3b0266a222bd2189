// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk cookie import from pasted text.
//!
//! Two input shapes are understood. A JSON array of records bearing `domain`,
//! `name` and `value` is tried first; only when the text is not JSON at all do
//! we fall back to Netscape `cookies.txt` lines (tab-separated, at least seven
//! fields, `#` comments). Malformed records are skipped individually.

use serde_json::Value;

use passvault_core::{CookieFields, ItemDraft, ItemPayload};

/// Folder every imported cookie lands in.
pub const COOKIE_FOLDER: &str = "Other";

/// Notes attached to cookies read from Netscape lines.
pub const NETSCAPE_NOTE: &str = "Imported from Netscape format";

const NETSCAPE_MIN_FIELDS: usize = 7;

/// Which parser produced the drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieFormat {
    Structured,
    Netscape,
}

/// Parser output: one draft per usable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookies {
    pub format: CookieFormat,
    pub drafts: Vec<ItemDraft>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
}

/// Parse pasted text into cookie drafts.
pub fn parse_cookies(text: &str) -> ParsedCookies {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => ParsedCookies {
            format: CookieFormat::Structured,
            drafts: parse_structured(&json),
        },
        Err(_) => ParsedCookies {
            format: CookieFormat::Netscape,
            drafts: parse_netscape(text),
        },
    }
}

/// Records of a JSON array. Anything but an array yields nothing.
fn parse_structured(json: &Value) -> Vec<ItemDraft> {
    let Some(records) = json.as_array() else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let domain = truthy_text(record.get("domain")?)?;
            let key = truthy_text(record.get("name")?)?;
            let value = truthy_text(record.get("value")?)?;
            let notes = serde_json::to_string(record).ok()?;
            Some(cookie_draft(domain, key, value, notes))
        })
        .collect()
}

fn parse_netscape(text: &str) -> Vec<ItemDraft> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < NETSCAPE_MIN_FIELDS {
                return None;
            }
            Some(cookie_draft(
                parts[0].to_string(),
                parts[5].to_string(),
                parts[6].to_string(),
                NETSCAPE_NOTE.to_string(),
            ))
        })
        .collect()
}

fn cookie_draft(domain: String, key: String, value: String, notes: String) -> ItemDraft {
    ItemDraft::new(ItemPayload::Cookie(CookieFields {
        domain,
        key,
        value,
        notes,
    }))
    .in_folder(COOKIE_FOLDER)
}

/// Text of a scalar that counts as present: non-empty strings, non-zero
/// numbers, and `true`.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(draft: &ItemDraft) -> &CookieFields {
        match &draft.payload {
            ItemPayload::Cookie(f) => f,
            other => panic!("expected cookie, got {other:?}"),
        }
    }

    #[test]
    fn structured_record_maps_to_cookie_slots() {
        let parsed = parse_cookies(r#"[{"domain":"example.com","name":"sid","value":"abc123"}]"#);
        assert_eq!(parsed.format, CookieFormat::Structured);
        assert_eq!(parsed.drafts.len(), 1);

        let draft = &parsed.drafts[0];
        let fields = cookie(draft);
        assert_eq!(fields.domain, "example.com");
        assert_eq!(fields.key, "sid");
        assert_eq!(fields.value, "abc123");
        assert_eq!(draft.folder.as_deref(), Some(COOKIE_FOLDER));

        let notes: Value = serde_json::from_str(&fields.notes).unwrap();
        assert_eq!(notes["domain"], "example.com");
    }

    #[test]
    fn structured_records_missing_fields_are_skipped() {
        let parsed = parse_cookies(
            r#"[
                {"domain":"a.com","name":"k","value":"v","path":"/","secure":true},
                {"domain":"b.com","name":"k"},
                {"domain":"","name":"k","value":"v"},
                "not an object",
                {"domain":"c.com","name":"k","value":42}
            ]"#,
        );
        let domains: Vec<_> = parsed.drafts.iter().map(|d| cookie(d).domain.clone()).collect();
        assert_eq!(domains, ["a.com", "c.com"]);
        assert_eq!(cookie(&parsed.drafts[1]).value, "42");
    }

    #[test]
    fn valid_json_that_is_not_an_array_yields_nothing() {
        let parsed = parse_cookies(r#"{"domain":"example.com","name":"sid","value":"x"}"#);
        assert_eq!(parsed.format, CookieFormat::Structured);
        assert!(parsed.drafts.is_empty());
    }

    #[test]
    fn netscape_lines_are_the_fallback() {
        let text = "# Netscape HTTP Cookie File\n\
                    \n\
                    .example.com\tTRUE\t/\tFALSE\t0\tsid\tabc123\r\n\
                    short\tline\n\
                    .other.org\tTRUE\t/\tTRUE\t1700000000\ttoken\tzzz\textra\n";
        let parsed = parse_cookies(text);
        assert_eq!(parsed.format, CookieFormat::Netscape);
        assert_eq!(parsed.drafts.len(), 2);

        let first = cookie(&parsed.drafts[0]);
        assert_eq!(first.domain, ".example.com");
        assert_eq!(first.key, "sid");
        assert_eq!(first.value, "abc123");
        assert_eq!(first.notes, NETSCAPE_NOTE);
        assert_eq!(cookie(&parsed.drafts[1]).key, "token");
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse_cookies("hello world").drafts.is_empty());
        assert!(parse_cookies("").drafts.is_empty());
    }
}
