// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use cid::Cid;
use ethers::types::Address;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

/// Multicodec for raw bytes
pub const RAW_CODEC: u64 = 0x55;
/// Multicodec for JSON
pub const JSON_CODEC: u64 = 0x0200;
/// Multihash code for sha2-256
const SHA2_256: u64 = 0x12;

/// Lower-case and collapse whitespace so cosmetic differences in the
/// upstream export do not change the derived identity.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Deterministic counterparty address for a record.
///
/// keccak256 over `name|region|sourceIndex`, keeping the low 20 bytes the
/// same way an Ethereum address is taken from a public key hash.
pub fn pseudo_identity(name: &str, region: &str, source_index: u64) -> Address {
    let seed = format!("{}|{}|{}", normalize_name(name), region, source_index);

    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(seed.as_bytes());
    hasher.finalize(&mut hash);

    Address::from_slice(&hash[12..])
}

/// CIDv1 string for `bytes` under `codec`, hashed with sha2-256
pub fn digest_cid(codec: u64, bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);

    match multihash::Multihash::wrap(SHA2_256, &hash) {
        Ok(mh) => Cid::new_v1(codec, mh).to_string(),
        // 32-byte digests always fit; keep the mapper total regardless
        Err(_) => format!("sha256-{}", hex::encode(hash)),
    }
}

/// Canonical compact JSON of a value. Field order follows declaration order
/// of the serialized struct, so output is stable across runs.
pub fn canonical_json<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}
