// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup artifacts: validation of imported vault encodings and export naming.
//!
//! An artifact is accepted when it carries a non-empty `salt` together with
//! either the legacy `iv` + `data` pair or the field-level `items` + `integrity`
//! pair. Validation happens entirely before any state is touched.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use passvault_core::{EncryptedVault, PassVaultError};

use crate::kdf;

/// File extension reserved for vault backups.
pub const BACKUP_EXTENSION: &str = "pv";

/// A validated backup, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    vault: EncryptedVault,
    contents: String,
}

impl BackupArtifact {
    /// The decoded vault.
    pub fn vault(&self) -> &EncryptedVault {
        &self.vault
    }

    /// The artifact text exactly as it was read or persisted.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn into_contents(self) -> String {
        self.contents
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }
}

/// Default export file name for a given day, e.g. `passvault_ghost_backup_2026-10-18.pv`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!(
        "passvault_ghost_backup_{}.{BACKUP_EXTENSION}",
        date.format("%Y-%m-%d")
    )
}

/// Validate raw artifact bytes.
pub fn parse_artifact(bytes: &[u8]) -> Result<BackupArtifact, PassVaultError> {
    let contents = std::str::from_utf8(bytes)
        .map_err(|_| PassVaultError::ImportFormat("artifact is not UTF-8 text".to_string()))?;
    let contents = contents.trim();

    let json: Value = serde_json::from_str(contents)
        .map_err(|e| PassVaultError::ImportFormat(format!("artifact is not JSON: {e}")))?;
    let Some(object) = json.as_object() else {
        return Err(PassVaultError::ImportFormat(
            "artifact must be a JSON object".to_string(),
        ));
    };

    if !non_empty_text(object, "salt") {
        return Err(PassVaultError::ImportFormat("missing salt".to_string()));
    }
    let legacy = non_empty_text(object, "iv") && non_empty_text(object, "data");
    let fields = object.get("items").is_some_and(Value::is_array)
        && non_empty_text(object, "integrity");
    if !legacy && !fields {
        return Err(PassVaultError::ImportFormat(
            "expected either iv + data or items + integrity".to_string(),
        ));
    }

    let vault: EncryptedVault = serde_json::from_value(json)
        .map_err(|e| PassVaultError::ImportFormat(format!("malformed vault records: {e}")))?;
    if let Some(params) = vault.kdf {
        kdf::check_params(params)
            .map_err(|_| PassVaultError::ImportFormat("unsupported kdf parameters".to_string()))?;
    }

    Ok(BackupArtifact {
        vault,
        contents: contents.to_string(),
    })
}

fn non_empty_text(object: &Map<String, Value>, key: &str) -> bool {
    object
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(text: &str) -> String {
        match parse_artifact(text.as_bytes()) {
            Err(PassVaultError::ImportFormat(msg)) => msg,
            other => panic!("expected ImportFormat, got {other:?}"),
        }
    }

    #[test]
    fn hostile_kdf_parameters_are_rejected() {
        let msg = rejected(
            r#"{"salt":"AAAAAAAAAAAAAAAAAAAAAA==","kdf":{"memoryCost":8,"iterations":4294967295,"parallelism":1},"integrity":"x","items":[]}"#,
        );
        assert!(msg.contains("kdf"), "{msg}");
        let msg = rejected(
            r#"{"salt":"c2FsdA==","kdf":{"memoryCost":4194304,"iterations":3,"parallelism":4},"integrity":"x","items":[]}"#,
        );
        assert!(msg.contains("kdf"), "{msg}");
    }

    #[test]
    fn sane_kdf_parameters_are_accepted() {
        let text = r#"{"salt":"c2FsdA==","kdf":{"memoryCost":65536,"iterations":3,"parallelism":4},"integrity":"x","items":[]}"#;
        assert!(parse_artifact(text.as_bytes()).is_ok());
    }

    #[test]
    fn legacy_artifact_is_accepted() {
        let artifact = parse_artifact(br#"{"salt":"c2FsdA==","iv":"aXY=","data":"ZA=="}"#).unwrap();
        assert!(artifact.vault().is_legacy());
    }

    #[test]
    fn field_artifact_is_accepted_verbatim() {
        let text = r#"{"salt":"c2FsdA==","integrity":"x","items":[]}"#;
        let artifact = parse_artifact(format!("  {text}\n").as_bytes()).unwrap();
        assert_eq!(artifact.contents(), text);
        assert_eq!(artifact.vault().item_count(), Some(0));
    }

    #[test]
    fn salt_alone_is_rejected() {
        assert!(rejected(r#"{"salt":"c2FsdA=="}"#).contains("iv + data"));
    }

    #[test]
    fn missing_or_empty_salt_is_rejected() {
        assert_eq!(rejected(r#"{"iv":"a","data":"b"}"#), "missing salt");
        assert_eq!(rejected(r#"{"salt":"","iv":"a","data":"b"}"#), "missing salt");
    }

    #[test]
    fn half_shapes_are_rejected() {
        rejected(r#"{"salt":"s","iv":"a"}"#);
        rejected(r#"{"salt":"s","items":[]}"#);
        rejected(r#"{"salt":"s","items":{},"integrity":"i"}"#);
    }

    #[test]
    fn non_json_and_non_objects_are_rejected() {
        rejected("not json at all");
        rejected("[1,2,3]");
        assert!(parse_artifact(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn malformed_item_records_are_rejected() {
        let msg = rejected(r#"{"salt":"s","integrity":"i","items":[{"id":"1"}]}"#);
        assert!(msg.contains("malformed"));
    }

    #[test]
    fn default_name_uses_reserved_extension() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(default_file_name(date), "passvault_ghost_backup_2026-10-18.pv");
    }
}
