// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use stampsort::classify::{leading_date, Classifier};
use stampsort::config::ClassifyConfig;
use stampsort::naming::{resolve, split_extension, CanonicalName};

#[derive(Arbitrary, Debug)]
struct Input {
    segments: Vec<String>,
    file_name: String,
    occupied: u8,
}

fuzz_target!(|input: Input| {
    let (stem, ext) = split_extension(OsStr::new(&input.file_name));
    let mut joined = stem.to_os_string();
    joined.push(&ext);
    assert_eq!(joined, OsString::from(&input.file_name));

    if let Some((year, month)) = leading_date(&input.file_name) {
        assert_eq!(year.len(), 4);
        assert_eq!(month.len(), 2);
    }

    // The first `occupied` candidates are taken; the next one must be picked
    let name = CanonicalName::from_file_name(&input.file_name);
    let taken = u64::from(input.occupied);
    let dir = Path::new("/d");
    let picked = resolve(dir, &name, None, |p| {
        if p == dir.join(name.file_name()) {
            return taken > 0;
        }
        (1..taken).any(|i| p == dir.join(name.with_suffix(i)))
    })
    .unwrap();
    let expected = if taken == 0 {
        dir.join(name.file_name())
    } else {
        dir.join(name.with_suffix(taken))
    };
    assert_eq!(picked, expected);

    let root = PathBuf::from("/root");
    let mut path = root.clone();
    for segment in input.segments.iter().filter(|s| !s.is_empty() && !s.contains(['/', '\0'])) {
        path.push(segment);
    }
    if !input.file_name.is_empty() && !input.file_name.contains(['/', '\0']) {
        path.push(&input.file_name);
        let classifier = Classifier::new(root, &ClassifyConfig::default());
        let _ = classifier.classify(&path);
    }
});
