// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use rstest::rstest;

use super::{build_string, dist_string};
use crate::DependencySpec;

fn deps(specs: &[&str]) -> Vec<DependencySpec> {
    specs
        .iter()
        .map(|spec| DependencySpec::from_str(spec).unwrap())
        .collect()
}

#[rstest]
#[case(&["python 3.6*"], &[], Some(2), "py36_2")]
#[case(&["python 2.7*", "numpy 1.11*"], &[], Some(0), "np111py27_0")]
#[case(&["numpy", "python 3.6*"], &[], None, "py36_0")]
#[case(&["python >=2.7"], &[], Some(1), "1")]
#[case(&["python"], &[], Some(1), "py_1")]
#[case(&["perl 5.20.3*"], &[], None, "pl5.20.3_0")]
#[case(&["r-base 3.3.1*"], &[], None, "r3.3.1_0")]
#[case(&["lua"], &["vc9"], Some(4), "lua_vc9_4")]
#[case(&["zlib 1.2*"], &["vc9", "mkl"], None, "vc9_mkl_0")]
#[case(&[], &[], None, "0")]
fn test_build_string(
    #[case] run: &[&str],
    #[case] features: &[&str],
    #[case] number: Option<u64>,
    #[case] expected: &str,
) {
    let features: Vec<String> = features.iter().map(|f| f.to_string()).collect();
    assert_eq!(build_string(&deps(run), &features, number), expected);
}

#[rstest]
fn test_dist_string() {
    assert_eq!(dist_string("foo", "1.0", "py36_0"), "foo-1.0-py36_0");
}
