// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Records persisted in the document store and the request / response
//! bodies of the HTTP API. Field names follow the stored JSON (camelCase),
//! so the same types are used for both.
//!
//! ## Address Normalization
//!
//! [`normalize_address`] lowercases an address and adds the `0x` prefix, so
//! `ABC123`, `abc123` and `0xabc123` all address the same allowlist record.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;


// =============================================================================
// Normalization
// =============================================================================

/// Lowercase an address and prefix it with `0x` if absent.
pub fn normalize_address(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.starts_with("0x") {
        lower
    } else {
        format!("0x{lower}")
    }
}

/// Prefix a hex payload with `0x` if absent.
pub fn normalize_message(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        format!("0x{}", &trimmed[2..])
    } else {
        format!("0x{trimmed}")
    }
}

// =============================================================================
// Allowlist
// =============================================================================

/// Permission flags of one address on the subnet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AllowListFlags {
    pub transactions_allowed: bool,
    pub transactions_admin: bool,
    pub contracts_allowed: bool,
    pub contracts_admin: bool,
    #[serde(rename = "mintSubnetVSBT")]
    pub mint_subnet_vsbt: bool,
}

/// One mutable allowlist field.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub enum AllowListField {
    #[serde(rename = "transactionsAllowed")]
    TransactionsAllowed,
    #[serde(rename = "transactionsAdmin")]
    TransactionsAdmin,
    #[serde(rename = "contractsAllowed")]
    ContractsAllowed,
    #[serde(rename = "contractsAdmin")]
    ContractsAdmin,
    #[serde(rename = "mintSubnetVSBT")]
    MintSubnetVsbt,
}

impl AllowListField {
    pub const ALL: [AllowListField; 5] = [
        AllowListField::TransactionsAllowed,
        AllowListField::TransactionsAdmin,
        AllowListField::ContractsAllowed,
        AllowListField::ContractsAdmin,
        AllowListField::MintSubnetVsbt,
    ];

    /// Field name in the stored document.
    pub fn key(self) -> &'static str {
        match self {
            AllowListField::TransactionsAllowed => "transactionsAllowed",
            AllowListField::TransactionsAdmin => "transactionsAdmin",
            AllowListField::ContractsAllowed => "contractsAllowed",
            AllowListField::ContractsAdmin => "contractsAdmin",
            AllowListField::MintSubnetVsbt => "mintSubnetVSBT",
        }
    }
}

impl AllowListFlags {
    pub fn get(&self, field: AllowListField) -> bool {
        match field {
            AllowListField::TransactionsAllowed => self.transactions_allowed,
            AllowListField::TransactionsAdmin => self.transactions_admin,
            AllowListField::ContractsAllowed => self.contracts_allowed,
            AllowListField::ContractsAdmin => self.contracts_admin,
            AllowListField::MintSubnetVsbt => self.mint_subnet_vsbt,
        }
    }

    /// Fields whose value in `incoming` differs from `self`.
    pub fn changed_fields(&self, incoming: &AllowListFlags) -> Vec<AllowListField> {
        AllowListField::ALL
            .into_iter()
            .filter(|field| self.get(*field) != incoming.get(*field))
            .collect()
    }
}

/// Allowlist record keyed by normalized address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AllowListRecord {
    /// Lowercase, `0x`-prefixed address.
    pub address: String,
    #[serde(flatten)]
    pub flags: AllowListFlags,
}

impl AllowListRecord {
    pub fn new(address: &str, flags: AllowListFlags) -> Self {
        Self {
            address: normalize_address(address),
            flags,
        }
    }
}

/// Body of `POST /api/update-allowlist`.
///
/// Every field is optional at the parsing stage so a missing field is
/// reported as a validation error naming it. Flags accept JSON booleans or
/// the strings `"true"` / `"false"`, which is how oracle scripts forward
/// contract arguments.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllowListRequest {
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[schema(value_type = Option<bool>)]
    pub transactions_allowed: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[schema(value_type = Option<bool>)]
    pub transactions_admin: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[schema(value_type = Option<bool>)]
    pub contracts_allowed: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    #[schema(value_type = Option<bool>)]
    pub contracts_admin: Option<bool>,
    #[serde(default, rename = "mintSubnetVSBT", deserialize_with = "deserialize_flag")]
    #[schema(value_type = Option<bool>)]
    pub mint_subnet_vsbt: Option<bool>,
}

/// An allowlist request lacking one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid allowlist: missing {}", .missing.join(", "))]
pub struct IncompleteAllowList {
    /// Stored field names, `address` first when absent.
    pub missing: Vec<&'static str>,
}

impl UpdateAllowListRequest {
    /// Validate that every field is present and build the normalized record.
    pub fn into_record(self) -> Result<AllowListRecord, IncompleteAllowList> {
        let address = self.address.filter(|a| !a.trim().is_empty());

        let mut missing = Vec::new();
        if address.is_none() {
            missing.push("address");
        }
        for (value, field) in [
            (self.transactions_allowed, AllowListField::TransactionsAllowed),
            (self.transactions_admin, AllowListField::TransactionsAdmin),
            (self.contracts_allowed, AllowListField::ContractsAllowed),
            (self.contracts_admin, AllowListField::ContractsAdmin),
            (self.mint_subnet_vsbt, AllowListField::MintSubnetVsbt),
        ] {
            if value.is_none() {
                missing.push(field.key());
            }
        }

        match (
            address,
            self.transactions_allowed,
            self.transactions_admin,
            self.contracts_allowed,
            self.contracts_admin,
            self.mint_subnet_vsbt,
        ) {
            (
                Some(address),
                Some(transactions_allowed),
                Some(transactions_admin),
                Some(contracts_allowed),
                Some(contracts_admin),
                Some(mint_subnet_vsbt),
            ) => Ok(AllowListRecord::new(
                &address,
                AllowListFlags {
                    transactions_allowed,
                    transactions_admin,
                    contracts_allowed,
                    contracts_admin,
                    mint_subnet_vsbt,
                },
            )),
            _ => Err(IncompleteAllowList { missing }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Number(u64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(repr) = Option::<FlagRepr>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match repr {
        FlagRepr::Bool(value) => Ok(Some(value)),
        FlagRepr::Number(0) => Ok(Some(false)),
        FlagRepr::Number(1) => Ok(Some(true)),
        FlagRepr::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean flag `{other}`"
            ))),
        },
        FlagRepr::Number(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean flag `{other}`"
        ))),
    }
}

// =============================================================================
// Email Domains
// =============================================================================

/// An approved email domain (e.g. `@mit.edu`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DomainRecord {
    pub domain: String,
}

/// Body of `POST /api/update-validdomains`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AddDomainRequest {
    pub domain: Option<String>,
}

// =============================================================================
// Relayed Messages
// =============================================================================

/// Relay state of a ledger entry.
///
/// Entries written before the status field existed carry no status and are
/// read as `Pending`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelayStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl RelayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayStatus::Pending => "pending",
            RelayStatus::Succeeded => "succeeded",
            RelayStatus::Failed => "failed",
        }
    }
}

/// Relay ledger entry keyed by message content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayedMessageRecord {
    /// `0x`-prefixed hex payload.
    pub message: String,
    #[serde(default)]
    pub status: RelayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/update-subnet-allowlist`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RelayMessageRequest {
    pub message: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn address_normalization_is_format_insensitive() {
        let expected = "0xabc123";
        assert_eq!(normalize_address("ABC123"), expected);
        assert_eq!(normalize_address("abc123"), expected);
        assert_eq!(normalize_address("0xabc123"), expected);
        assert_eq!(normalize_address("0XABC123"), expected);
    }

    #[test]
    fn message_normalization_adds_prefix_once() {
        assert_eq!(normalize_message("deadbeef"), "0xdeadbeef");
        assert_eq!(normalize_message("0xdeadbeef"), "0xdeadbeef");
        assert_eq!(normalize_message("0Xdeadbeef"), "0xdeadbeef");
    }

    #[test]
    fn allowlist_record_serializes_with_stored_field_names() {
        let record = AllowListRecord::new(
            "ABCDEF",
            AllowListFlags {
                mint_subnet_vsbt: true,
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "address": "0xabcdef",
                "transactionsAllowed": false,
                "transactionsAdmin": false,
                "contractsAllowed": false,
                "contractsAdmin": false,
                "mintSubnetVSBT": true
            })
        );
    }

    #[test]
    fn request_accepts_string_flags() {
        let request: UpdateAllowListRequest = serde_json::from_value(json!({
            "address": "0xABC",
            "transactionsAllowed": "true",
            "transactionsAdmin": "false",
            "contractsAllowed": true,
            "contractsAdmin": 0,
            "mintSubnetVSBT": "TRUE"
        }))
        .unwrap();
        let record = request.into_record().unwrap();
        assert_eq!(record.address, "0xabc");
        assert!(record.flags.transactions_allowed);
        assert!(!record.flags.transactions_admin);
        assert!(record.flags.contracts_allowed);
        assert!(!record.flags.contracts_admin);
        assert!(record.flags.mint_subnet_vsbt);
    }

    #[test]
    fn request_rejects_garbage_flags() {
        let result = serde_json::from_value::<UpdateAllowListRequest>(json!({
            "address": "0xABC",
            "transactionsAllowed": "yes"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn incomplete_request_names_missing_fields() {
        let request: UpdateAllowListRequest = serde_json::from_value(json!({
            "address": "0xabc",
            "transactionsAllowed": true,
            "contractsAllowed": true
        }))
        .unwrap();
        let err = request.into_record().unwrap_err();
        assert_eq!(
            err.missing,
            vec!["transactionsAdmin", "contractsAdmin", "mintSubnetVSBT"]
        );
        assert_eq!(
            err.to_string(),
            "Invalid allowlist: missing transactionsAdmin, contractsAdmin, mintSubnetVSBT"
        );
    }

    #[test]
    fn blank_address_is_missing() {
        let request = UpdateAllowListRequest {
            address: Some("  ".into()),
            transactions_allowed: Some(true),
            transactions_admin: Some(true),
            contracts_allowed: Some(true),
            contracts_admin: Some(true),
            mint_subnet_vsbt: Some(true),
        };
        let err = request.into_record().unwrap_err();
        assert_eq!(err.missing, vec!["address"]);
    }

    #[test]
    fn changed_fields_lists_only_differences() {
        let stored = AllowListFlags {
            transactions_allowed: true,
            contracts_allowed: true,
            ..Default::default()
        };
        let incoming = AllowListFlags {
            transactions_admin: true,
            ..stored
        };
        assert_eq!(
            stored.changed_fields(&incoming),
            vec![AllowListField::TransactionsAdmin]
        );
        assert!(stored.changed_fields(&stored).is_empty());
    }

    #[test]
    fn legacy_ledger_entry_reads_as_pending() {
        let record: RelayedMessageRecord =
            serde_json::from_value(json!({"message": "0xdeadbeef"})).unwrap();
        assert_eq!(record.status, RelayStatus::Pending);
        assert!(record.transaction_hash.is_none());
    }
}
