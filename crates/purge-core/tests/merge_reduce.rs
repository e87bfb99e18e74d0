//! Merge and top-chain reduction over several resolved streams

use purge_core::pipeline::{MergedStream, TopChainReducer, reduce_top_chain};
use purge_core::stream::{MemoryStream, PathSetWriter, collect_paths};
use purge_core::types::{compare_paths, is_covered_by};

fn merge_and_reduce(inputs: &[&[&str]]) -> Vec<String> {
    let mut streams: Vec<MemoryStream> = inputs
        .iter()
        .map(|paths| MemoryStream::sorted_files(paths.iter().copied()))
        .collect();
    let merged = MergedStream::new(streams.iter_mut()).unwrap();
    collect_paths(TopChainReducer::new(merged)).unwrap()
}

#[test]
fn folder_filter_swallows_file_filter() {
    assert_eq!(merge_and_reduce(&[&["a"], &["a/b", "a/c"]]), vec!["a"]);
}

#[test]
fn unrelated_filters_pass_through() {
    assert_eq!(merge_and_reduce(&[&["x/y"], &["x/z"]]), vec!["x/y", "x/z"]);
}

#[test]
fn merge_is_a_sorted_multiset_union() {
    let mut first = MemoryStream::sorted_files(["lib/a.jar", "lib/b.jar", "z"]);
    let mut second = MemoryStream::sorted_files(["lib", "lib/a.jar", "lib.txt"]);
    let mut third = MemoryStream::default();

    let merged = MergedStream::new([&mut first, &mut second, &mut third]).unwrap();
    let paths = collect_paths(merged).unwrap();

    assert_eq!(paths.len(), 6);
    assert!(paths.windows(2).all(|w| compare_paths(&w[0], &w[1]).is_le()));
    assert_eq!(
        paths,
        vec!["lib", "lib/a.jar", "lib/a.jar", "lib/b.jar", "lib.txt", "z"]
    );
}

#[test]
fn reduced_output_has_no_covered_pairs() {
    let reduced = merge_and_reduce(&[
        &["repo/com/acme", "repo/com/acme/app/1.0/app.jar", "repo/org"],
        &["repo/com/acme/app", "repo/com/acme-tools/x.jar", "repo/org/x/y"],
        &["repo/com", "other/readme.md"],
    ]);

    assert_eq!(reduced, vec!["other/readme.md", "repo/com", "repo/org"]);
    for (i, a) in reduced.iter().enumerate() {
        for b in reduced.iter().skip(i + 1) {
            assert!(!is_covered_by(b, a) && !is_covered_by(a, b), "{a} and {b}");
        }
    }
}

#[test]
fn every_input_path_is_kept_or_covered() {
    let inputs: &[&[&str]] = &[&["a/b/c", "b", "c/d"], &["a/b", "b/x", "cd"]];
    let reduced = merge_and_reduce(inputs);

    for path in inputs.iter().flat_map(|paths| paths.iter()) {
        assert!(
            reduced.iter().any(|kept| is_covered_by(path, kept)),
            "{path} was lost"
        );
    }
}

#[test]
fn reduction_is_idempotent_through_a_spilled_set() {
    let mut input = MemoryStream::sorted_files(["a", "a/b", "b/c", "b/c/d", "bc", "z", "z/1"]);
    let once = reduce_top_chain(&mut input, PathSetWriter::with_threshold(2)).unwrap();
    assert!(once.spill_path().is_some());

    let twice = reduce_top_chain(once.reader().unwrap(), PathSetWriter::new()).unwrap();

    assert_eq!(
        collect_paths(once.reader().unwrap()).unwrap(),
        collect_paths(twice.reader().unwrap()).unwrap()
    );
    assert_eq!(twice.len(), 4);
}
