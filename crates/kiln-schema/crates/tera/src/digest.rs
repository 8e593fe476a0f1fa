// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::Path;

use data_encoding::HEXLOWER;

#[cfg(test)]
#[path = "./digest_test.rs"]
mod digest_test;

/// A digest algorithm that recipes can ask for
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// The lowercase hex digest of `data`
    pub fn hex_digest(&self, data: &[u8]) -> String {
        match self {
            Self::Md5 => {
                use md5::{Digest, Md5};
                HEXLOWER.encode(Md5::digest(data).as_slice())
            }
            Self::Sha1 => HEXLOWER.encode(
                ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, data).as_ref(),
            ),
            Self::Sha256 => {
                HEXLOWER.encode(ring::digest::digest(&ring::digest::SHA256, data).as_ref())
            }
        }
    }
}

/// The lowercase hex digest of a file's contents
pub fn file_digest<P: AsRef<Path>>(path: P, algorithm: HashAlgorithm) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(algorithm.hex_digest(&data))
}
