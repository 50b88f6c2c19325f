use dedupe::duplicates::{DuplicateFinder, DuplicatePair};
use dedupe::output::{CsvOutput, DuplicateSink, JsonOutput, ListOutput};
use std::fs;
use tempfile::{tempdir, TempDir};

fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
    fs::write(dir.path().join("b.txt"), b"alpha").unwrap();
    fs::write(dir.path().join("c.txt"), b"alpha").unwrap();
    fs::write(dir.path().join("d.txt"), b"delta!").unwrap();
    dir
}

#[test]
fn test_list_export_prints_duplicates_only() {
    let dir = fixture();
    let finder = DuplicateFinder::with_defaults();

    let mut sink = ListOutput::new(Vec::new());
    finder.find_duplicates(dir.path(), &mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    let expected = format!(
        "{}\n{}\n",
        dir.path().join("b.txt").display(),
        dir.path().join("c.txt").display()
    );
    assert_eq!(text, expected);
}

#[test]
fn test_csv_export_rows() {
    let dir = fixture();
    let finder = DuplicateFinder::with_defaults();

    let mut sink = CsvOutput::new(Vec::new()).with_header(true);
    finder.find_duplicates(dir.path(), &mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    let a = dir.path().join("a.txt");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("\"canonical\",\"duplicate\""));
    assert_eq!(
        lines.next().unwrap(),
        format!("\"{}\",\"{}\"", a.display(), dir.path().join("b.txt").display())
    );
    assert_eq!(
        lines.next().unwrap(),
        format!("\"{}\",\"{}\"", a.display(), dir.path().join("c.txt").display())
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn test_json_export_parses_back() {
    let dir = fixture();
    let finder = DuplicateFinder::with_defaults();

    let mut sink = JsonOutput::new(Vec::new());
    finder.find_duplicates(dir.path(), &mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    let pairs: Vec<DuplicatePair> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|p| p.canonical == dir.path().join("a.txt")));
    assert!(pairs.iter().all(|p| p.size == 5));
}

#[test]
fn test_export_without_duplicates_is_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"alone").unwrap();
    let finder = DuplicateFinder::with_defaults();

    let mut sink = CsvOutput::new(Vec::new());
    finder.find_duplicates(dir.path(), &mut sink).unwrap();
    sink.finish().unwrap();
    assert!(sink.into_inner().unwrap().is_empty());
}
