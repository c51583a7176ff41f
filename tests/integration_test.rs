/// Integration tests for license grouping and reporting
///
/// These tests feed hand-built search records through the grouper and check
/// the resulting groups and the rendered report.

use std::collections::HashSet;
use std::io;

use license_report::core::grouper::{group_hits, group_records, Grouper, Hit, LicenseText, MalformedRecord};
use license_report::utils::output_formatter::{format_report, write_report, ReportOptions};

fn records(raw: &[&[u8]]) -> Vec<io::Result<Vec<u8>>> {
    raw.iter().map(|r| Ok(r.to_vec())).collect()
}

fn names(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_identical_blocks_share_a_group() {
    let groups = group_records(records(&[
        b"a.py\0License: MIT\n",
        b"a.py\0more text\n",
        b"b.py\0License: MIT\n",
        b"b.py\0more text\n",
    ]))
    .expect("Failed to group records");

    assert_eq!(groups.len(), 1);
    let key = LicenseText::new(["License: MIT\n", "more text\n"]);
    assert_eq!(key.content(), "License: MIT\nmore text\n");
    assert_eq!(groups.get(&key), Some(&names(&["a.py", "b.py"])));
}

#[test]
fn test_distinct_blocks_get_distinct_groups() {
    let groups = group_records(records(&[b"a.py\0X\n", b"b.py\0Y\n"])).expect("Failed to group records");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups.get(&LicenseText::new(["X\n"])), Some(&names(&["a.py"])));
    assert_eq!(groups.get(&LicenseText::new(["Y\n"])), Some(&names(&["b.py"])));
}

#[test]
fn test_malformed_record_aborts_grouping() {
    let result = group_records(records(&[b"a.py\0License: MIT\n", b"no-separator-here\n", b"b.py\0X\n"]));

    let err = result.expect_err("Malformed record should abort grouping");
    let malformed = err
        .downcast_ref::<MalformedRecord>()
        .expect("Error should be a MalformedRecord");
    assert_eq!(malformed.record, "no-separator-here\n");
}

#[test]
fn test_read_error_aborts_grouping() {
    let stream = vec![
        Ok(b"a.py\0License: MIT\n".to_vec()),
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")),
    ];

    let err = group_records(stream).expect_err("Read error should abort grouping");
    assert!(err.downcast_ref::<io::Error>().is_some());
}

#[test]
fn test_single_hit_is_one_line_group() {
    let groups = group_hits(vec![Hit::new("only.rs", "// License: MIT\n")]);

    assert_eq!(groups.len(), 1);
    let (text, filenames) = groups.iter().next().expect("One group expected");
    assert_eq!(text.lines().len(), 1);
    assert_eq!(filenames, &names(&["only.rs"]));
}

#[test]
fn test_empty_input_yields_empty_report() {
    let groups = group_records(Vec::new()).expect("Empty input should group");

    assert!(groups.is_empty());
    assert_eq!(format_report(&groups, &ReportOptions::default()), "");

    let markdown = ReportOptions {
        markdown: true,
        ..ReportOptions::default()
    };
    assert_eq!(format_report(&groups, &markdown), "");
}

#[test]
fn test_interleaved_runs_form_separate_blocks() {
    let groups = group_hits(vec![
        Hit::new("a.c", "License one\n"),
        Hit::new("b.c", "License two\n"),
        Hit::new("a.c", "License three\n"),
    ]);

    // a.c produced two separate blocks, each keyed on its own line
    assert_eq!(groups.len(), 3);
    assert_eq!(groups.get(&LicenseText::new(["License one\n"])), Some(&names(&["a.c"])));
    assert_eq!(groups.get(&LicenseText::new(["License three\n"])), Some(&names(&["a.c"])));
    assert_eq!(groups.file_count(), 2);
}

#[test]
fn test_grouping_is_exact_match() {
    let groups = group_hits(vec![
        Hit::new("a.rs", "License: MIT\n"),
        Hit::new("b.rs", "license: mit\n"),
        Hit::new("c.rs", "License:  MIT\n"),
    ]);

    assert_eq!(groups.len(), 3);
}

#[test]
fn test_line_order_is_part_of_the_key() {
    let groups = group_hits(vec![
        Hit::new("a.rs", "first license line\n"),
        Hit::new("a.rs", "second license line\n"),
        Hit::new("b.rs", "second license line\n"),
        Hit::new("b.rs", "first license line\n"),
    ]);

    assert_eq!(groups.len(), 2);
    let key = LicenseText::new(["first license line\n", "second license line\n"]);
    assert_eq!(groups.get(&key), Some(&names(&["a.rs"])));
}

#[test]
fn test_grouping_is_idempotent() {
    let hits = vec![
        Hit::new("a.py", "License: MIT\n"),
        Hit::new("b.py", "License: MIT\n"),
        Hit::new("c.py", "License: GPL\n"),
        Hit::new("c.py", "see LICENSE\n"),
    ];

    assert_eq!(group_hits(hits.clone()), group_hits(hits));
}

#[test]
fn test_record_splits_on_first_null() {
    let hit = Hit::parse(b"./a.txt\0weird\0license\n").expect("Record should parse");

    assert_eq!(hit.filename, "./a.txt");
    assert_eq!(hit.text, "weird\0license\n");
}

#[test]
fn test_grouper_accepts_records_and_hits() {
    let mut grouper = Grouper::new();
    grouper.add_record(b"a.py\0License: MIT\n").expect("Record should parse");
    grouper.add_hit(Hit::new("a.py", "more text\n"));
    assert!(grouper.add_record(b"garbage").is_err());

    let groups = grouper.finish();
    let key = LicenseText::new(["License: MIT\n", "more text\n"]);
    assert_eq!(groups.get(&key), Some(&names(&["a.py"])));
}

#[test]
fn test_report_lists_files_under_their_statement() {
    let groups = group_hits(vec![
        Hit::new("a.py", "License: MIT\n"),
        Hit::new("a.py", "more text\n"),
        Hit::new("b.py", "License: MIT\n"),
        Hit::new("b.py", "more text\n"),
    ]);

    let options = ReportOptions {
        sort: true,
        ..ReportOptions::default()
    };
    assert_eq!(
        format_report(&groups, &options),
        "License: MIT\nmore text\n\ta.py\n\tb.py\n\n"
    );
}

#[test]
fn test_sorted_report_puts_common_statements_first() {
    let groups = group_hits(vec![
        Hit::new("odd.rs", "GPL license\n"),
        Hit::new("a.rs", "MIT license\n"),
        Hit::new("b.rs", "MIT license\n"),
    ]);

    let options = ReportOptions {
        sort: true,
        markdown: true,
        color: false,
    };
    assert_eq!(
        format_report(&groups, &options),
        "```\nMIT license\n\ta.rs\n\tb.rs\n\nGPL license\n\todd.rs\n\n```\n"
    );
}

#[test]
fn test_report_terminates_unterminated_content() {
    let groups = group_hits(vec![Hit::new("a.rs", "License at end of file")]);

    let mut out = Vec::new();
    write_report(&groups, &ReportOptions::default(), &mut out).expect("Failed to write report");
    assert_eq!(String::from_utf8(out).expect("Report is UTF-8"), "License at end of file\n\ta.rs\n\n");
}
