// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
#[diagnostic(
    url(
        "https://spkenv.dev/error_codes#{}",
        self.code().unwrap_or_else(|| Box::new("kiln::generic"))
    )
)]
pub enum Error {
    #[error("Invalid platform subdir {0:?}, expected something like 'linux-64' or 'win-32'")]
    #[diagnostic(code("kiln::invalid_platform"))]
    InvalidPlatform(String),
    #[error("Unknown interpreter {0:?}")]
    UnknownInterpreter(String),
}
