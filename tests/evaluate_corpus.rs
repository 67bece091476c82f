use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use stt_bench::batch::SkipReason;
use stt_bench::io::read_report;
use stt_bench::{EvaluatorConfig, evaluate_corpus};

fn response(words: &[&str]) -> String {
    let words: Vec<_> = words
        .iter()
        .enumerate()
        .map(|(i, w)| serde_json::json!({"word": w, "timestamp": [i * 100, i * 100 + 90]}))
        .collect();
    serde_json::json!({"output": {"predicted_words": words}}).to_string()
}

fn setup_corpus(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let refs = root.join("text");
    let hyps = root.join("api_response");
    std::fs::create_dir_all(&refs).unwrap();
    std::fs::create_dir_all(&hyps).unwrap();

    std::fs::write(refs.join("bn_001.txt"), "আমি ভালো আছি\n").unwrap();
    std::fs::write(
        hyps.join("bn_001.json"),
        response(&["আমি", " ", "ভালো", " ", "আছি"]),
    )
    .unwrap();

    std::fs::write(refs.join("en_002.txt"), "the cat sat").unwrap();
    std::fs::write(hyps.join("en_002.json"), response(&["the", " ", "cat"])).unwrap();

    std::fs::write(refs.join("en_003.txt"), "hello").unwrap();
    std::fs::write(hyps.join("en_003.json"), r#"{"detail": "server error"}"#).unwrap();

    // No reference for this one
    std::fs::write(hyps.join("orphan_999.json"), response(&["lost"])).unwrap();

    (refs, hyps)
}

fn quiet() -> EvaluatorConfig {
    EvaluatorConfig {
        show_progress: false,
        ..Default::default()
    }
}

#[test]
fn test_evaluate_corpus_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("error_statistics.csv");

    let outcome = evaluate_corpus(&refs, &hyps, &report, &quiet()).unwrap();

    assert_eq!(outcome.rows_written, 3);
    assert_eq!(
        outcome.skipped,
        vec![("orphan_999".to_string(), SkipReason::NoReference)]
    );
    assert_eq!(outcome.degraded.len(), 1);
    assert_eq!(outcome.degraded[0].0, "en_003");

    let rows = read_report(&report).unwrap();
    assert_eq!(rows.len(), 3);

    let bengali = &rows[0];
    assert_eq!(bengali.file_name, "bn_001");
    assert_eq!(bengali.annotated, "আমি ভালো আছি");
    assert_eq!(bengali.generated, "আমি ভালো আছি");
    assert_eq!(bengali.cer, 0);
    assert_eq!(bengali.wer, 0);
    assert_eq!(bengali.missed_characters, "[]");

    let english = &rows[1];
    assert_eq!(english.file_name, "en_002");
    assert_eq!(english.generated, "the cat");
    assert_eq!(english.total_words, 3);
    assert_eq!(english.wer, 1);
    assert_eq!(english.cer, 4);
    let missed: Vec<String> = serde_json::from_str(&english.missed_characters).unwrap();
    assert_eq!(missed, vec![" ", "s", "a", "t"]);

    let malformed = &rows[2];
    assert_eq!(malformed.generated, "");
    assert_eq!(malformed.cer, 5);
    assert_eq!(malformed.wer, 1);

    assert_eq!(outcome.summary.rows, 3);
    assert_eq!(outcome.summary.char_errors, 9);
}

#[test]
fn test_limit_then_resume() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("report.csv");

    let first = evaluate_corpus(
        &refs,
        &hyps,
        &report,
        &EvaluatorConfig {
            limit: Some(1),
            ..quiet()
        },
    )
    .unwrap();
    assert_eq!(first.rows_written, 1);
    assert!(first.stopped_at_limit);
    assert_eq!(read_report(&report).unwrap().len(), 1);

    let second = evaluate_corpus(
        &refs,
        &hyps,
        &report,
        &EvaluatorConfig {
            resume: true,
            ..quiet()
        },
    )
    .unwrap();
    assert_eq!(second.resumed, 1);
    assert_eq!(second.rows_written, 2);

    let ids: Vec<_> = read_report(&report)
        .unwrap()
        .into_iter()
        .map(|r| r.file_name)
        .collect();
    assert_eq!(ids, vec!["bn_001", "en_002", "en_003"]);
}

fn run_one_row(refs: &Path, hyps: &Path, report: &Path) {
    let first = evaluate_corpus(
        refs,
        hyps,
        report,
        &EvaluatorConfig {
            limit: Some(1),
            ..quiet()
        },
    )
    .unwrap();
    assert_eq!(first.rows_written, 1);
}

fn resume() -> EvaluatorConfig {
    EvaluatorConfig {
        resume: true,
        ..quiet()
    }
}

#[test]
fn test_resume_after_interrupted_write() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("report.csv");
    run_one_row(&refs, &hyps, &report);

    // Killed halfway through the second row
    let mut file = OpenOptions::new().append(true).open(&report).unwrap();
    file.write_all(b"en_002,\"the cat").unwrap();
    drop(file);

    let second = evaluate_corpus(&refs, &hyps, &report, &resume()).unwrap();
    assert_eq!(second.resumed, 1);
    assert_eq!(second.rows_written, 2);

    let rows = read_report(&report).unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(ids, vec!["bn_001", "en_002", "en_003"]);
    assert_eq!(rows[1].annotated, "the cat sat");
}

#[test]
fn test_resume_rejects_damaged_middle_record() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("report.csv");
    run_one_row(&refs, &hyps, &report);

    let content = std::fs::read_to_string(&report).unwrap();
    let (header, rows) = content.split_once('\n').unwrap();
    std::fs::write(&report, format!("{}\nbroken\n{}", header, rows)).unwrap();

    assert!(evaluate_corpus(&refs, &hyps, &report, &resume()).is_err());
    assert_eq!(
        std::fs::read_to_string(&report).unwrap(),
        format!("{}\nbroken\n{}", header, rows)
    );
}

#[test]
fn test_rerun_without_resume_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("report.csv");

    evaluate_corpus(&refs, &hyps, &report, &quiet()).unwrap();
    evaluate_corpus(&refs, &hyps, &report, &quiet()).unwrap();

    assert_eq!(read_report(&report).unwrap().len(), 3);
}

#[test]
fn test_unwritable_report_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (refs, hyps) = setup_corpus(dir.path());
    let report = dir.path().join("missing_dir").join("report.csv");

    assert!(evaluate_corpus(&refs, &hyps, &report, &quiet()).is_err());
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.csv");

    let result = evaluate_corpus(
        &dir.path().join("nope"),
        &dir.path().join("nope_either"),
        &report,
        &quiet(),
    );
    assert!(result.is_err());
}
