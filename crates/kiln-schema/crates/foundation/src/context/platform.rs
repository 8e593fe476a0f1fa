// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./platform_test.rs"]
mod platform_test;

/// Linux machines that are not identified by a bit width
pub const NON_X86_LINUX_MACHINES: &[&str] = &["armv6l", "armv7l", "aarch64", "ppc64le"];

/// The operating system family of a platform
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Os {
    Linux,
    Osx,
    Win,
}

/// The platform that a recipe is being resolved for.
///
/// Platforms are identified by their subdir, eg `linux-64`,
/// `osx-64`, `win-32` or `linux-armv7l`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Platform {
    os: Os,
    bits: u8,
    machine: Option<String>,
}

impl Platform {
    /// A platform identified by os family and bit width
    pub fn new(os: Os, bits: u8) -> Self {
        Self {
            os,
            bits,
            machine: None,
        }
    }

    /// A non-x86 linux platform, eg `armv7l`
    pub fn linux_machine<S: Into<String>>(machine: S) -> Result<Self> {
        let machine = machine.into();
        let bits = match machine.as_str() {
            "armv6l" | "armv7l" => 32,
            "aarch64" | "ppc64le" => 64,
            _ => return Err(Error::InvalidPlatform(format!("linux-{machine}"))),
        };
        Ok(Self {
            os: Os::Linux,
            bits,
            machine: Some(machine),
        })
    }

    /// The platform of the running process
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "windows" => Os::Win,
            "macos" => Os::Osx,
            _ => Os::Linux,
        };
        let arch = std::env::consts::ARCH;
        if os == Os::Linux {
            if let Ok(platform) = Self::linux_machine(arch) {
                return platform;
            }
        }
        let bits = match arch {
            "x86" | "arm" => 32,
            _ => 64,
        };
        Self::new(os, bits)
    }

    pub fn os(&self) -> Os {
        self.os
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// The non-x86 linux machine name, if any
    pub fn machine(&self) -> Option<&str> {
        self.machine.as_deref()
    }

    /// The package subdirectory for this platform, eg `linux-64`
    pub fn subdir(&self) -> String {
        match &self.machine {
            Some(machine) => format!("{}-{machine}", self.os),
            None => format!("{}-{}", self.os, self.bits),
        }
    }

    /// The platform name recorded in package indices, eg `linux`
    pub fn platform_name(&self) -> &'static str {
        self.os.into()
    }

    /// The architecture name recorded in package indices, eg `x86_64`
    pub fn arch_name(&self) -> String {
        match &self.machine {
            Some(machine) => machine.clone(),
            None if self.bits == 64 => "x86_64".to_string(),
            None => "x86".to_string(),
        }
    }

    /// True if paths on this platform are separated with a backslash
    pub fn uses_backslash_paths(&self) -> bool {
        self.os == Os::Win
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subdir())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(subdir: &str) -> Result<Self> {
        let invalid = || Error::InvalidPlatform(subdir.to_string());
        let (os, tail) = subdir.split_once('-').ok_or_else(invalid)?;
        let os = Os::from_str(os).map_err(|_| invalid())?;
        match tail {
            "32" => Ok(Self::new(os, 32)),
            "64" => Ok(Self::new(os, 64)),
            machine if os == Os::Linux => Self::linux_machine(machine).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Platform {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.subdir())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let subdir = String::deserialize(deserializer)?;
        Self::from_str(&subdir).map_err(serde::de::Error::custom)
    }
}
