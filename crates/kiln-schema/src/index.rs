// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use kiln_schema_foundation::FieldValue;
use kiln_schema_tera::{HashAlgorithm, file_digest};
use serde::Serialize;

use crate::{DependencyKind, Error, RecipeDocument, Result};

#[cfg(test)]
#[path = "./index_test.rs"]
mod index_test;

/// The subdir of packages that run on any platform
const NOARCH: &str = "noarch";

/// The index metadata written alongside a built package
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexRecord {
    pub name: String,
    pub version: String,
    pub build: String,
    pub build_number: u64,
    /// None for packages that are not platform specific
    pub platform: Option<String>,
    pub arch: Option<String>,
    pub subdir: String,
    pub depends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_features: Option<String>,
    #[serde(flatten)]
    pub app: Option<AppMeta>,
}

/// The extra index metadata of an application package
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppMeta {
    #[serde(rename = "type")]
    pub kind: String,
    /// The file name of the app icon, named by its md5 digest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_entry: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_cli_opts: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_own_environment: Option<FieldValue>,
}

impl IndexRecord {
    pub fn from_document(document: &RecipeDocument) -> Result<Self> {
        let text = |field: &str| {
            document
                .get_value(field)
                .filter(|v| v.is_truthy())
                .map(ToString::to_string)
        };
        let joined = |field: &str| {
            document
                .get_value(field)
                .and_then(FieldValue::as_list)
                .filter(|items| !items.is_empty())
                .map(|items| items.join(" "))
        };

        let mut depends: Vec<_> = document
            .ms_depends(DependencyKind::Run)?
            .iter()
            .map(ToString::to_string)
            .collect();
        depends.sort();

        let platform = document.context().platform();
        let noarch = document
            .get_value("build/noarch_python")
            .is_some_and(FieldValue::is_truthy);
        let (platform_name, arch, subdir) = if noarch {
            (None, None, NOARCH.to_string())
        } else {
            (
                Some(platform.platform_name().to_string()),
                Some(platform.arch_name()),
                platform.subdir(),
            )
        };

        let app = if document.is_app() {
            Some(AppMeta::from_document(document)?)
        } else {
            None
        };

        Ok(Self {
            name: document.name()?,
            version: document.version()?,
            build: document.build_id()?,
            build_number: document.build_number().unwrap_or_default(),
            platform: platform_name,
            arch,
            subdir,
            depends,
            license: text("about/license"),
            license_family: text("about/license_family"),
            features: joined("build/features"),
            track_features: joined("build/track_features"),
            app,
        })
    }
}

impl AppMeta {
    fn from_document(document: &RecipeDocument) -> Result<Self> {
        let value = |field: &str| document.get_value(field).filter(|v| v.is_truthy()).cloned();

        let icon = match (value("app/icon"), document.recipe_dir()) {
            (Some(icon), Some(recipe_dir)) => {
                let path = recipe_dir.join(icon.to_string());
                let digest = file_digest(&path, HashAlgorithm::Md5)
                    .map_err(|err| Error::FileReadError(path, err))?;
                Some(format!("{digest}.png"))
            }
            (Some(icon), None) => {
                tracing::debug!(%icon, "no recipe directory to find the app icon in");
                None
            }
            (None, _) => None,
        };

        Ok(Self {
            kind: "app".into(),
            icon,
            app_entry: value("app/entry"),
            app_type: value("app/type"),
            app_cli_opts: value("app/cli_opts"),
            summary: value("app/summary"),
            app_own_environment: value("app/own_environment"),
        })
    }
}
