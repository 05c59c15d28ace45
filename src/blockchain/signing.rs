// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay signer loading.
//!
//! The subnet signing key is configured either as a hex string (with or
//! without `0x`) or as a PEM document (SEC1 or PKCS#8, secp256k1).

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::ChainError;

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(ChainError)` - If PEM parsing fails
pub fn pem_to_hex(pem_str: &str) -> Result<String, ChainError> {
    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
}

/// Create a signer from the configured secret, hex or PEM.
pub fn signer_from_secret(secret: &str) -> Result<PrivateKeySigner, ChainError> {
    if secret.trim_start().starts_with("-----BEGIN") {
        signer_from_hex(&pem_to_hex(secret)?)
    } else {
        signer_from_hex(secret)
    }
}
