use std::process::{self, Command, Output};
use std::{env, fs};

use conformance::REGRESSION_FEN;

fn conformance(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_conformance"))
        .args(args)
        .output()
        .unwrap()
}

fn illegal_move_check(mode: &str) -> Output {
    conformance(&[
        "illegal-move",
        "--engine",
        env!("CARGO_BIN_EXE_mock-engine"),
        "--engine-arg",
        mode,
        "--move-timeout-ms",
        "2000",
    ])
}

// Verdict lines on stdout, ignoring log output.
fn verdicts(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| {
            line.starts_with("PASS:") || line.starts_with("FAIL:") || line.starts_with("ERROR:")
        })
        .map(str::to_string)
        .collect()
}

#[test]
fn test_pass_exits_with_zero() {
    let output = illegal_move_check("legal");

    assert_eq!(output.status.code(), Some(0));
    let verdicts = verdicts(&output);
    assert_eq!(verdicts, vec!["PASS: 1 game(s) completed"]);
}

#[test]
fn test_illegal_move_exits_with_one_diagnostic() {
    let output = illegal_move_check("illegal");

    assert_eq!(output.status.code(), Some(1));
    let verdicts = verdicts(&output);
    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].starts_with("FAIL: illegal played illegal move a1a1"));
    assert!(verdicts[0].contains(REGRESSION_FEN));

    // The verdict is not repeated through the terminal logger.
    let all = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(all.matches("FAIL:").count(), 1);
}

#[test]
fn test_log_file_gets_the_verdict_too() {
    let log_file = env::temp_dir().join(format!("conformance-cli-{}.log", process::id()));
    let output = conformance(&[
        "--log-file",
        log_file.to_str().unwrap(),
        "illegal-move",
        "--engine",
        env!("CARGO_BIN_EXE_mock-engine"),
        "--engine-arg",
        "illegal",
    ]);
    let logged = fs::read_to_string(&log_file).unwrap();
    fs::remove_file(&log_file).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(verdicts(&output).len(), 1);
    assert_eq!(logged.matches("FAIL:").count(), 1);
}

#[test]
fn test_reference_arguments_reach_only_the_reference() {
    let output = conformance(&[
        "full-game",
        "--engine",
        env!("CARGO_BIN_EXE_mock-engine"),
        "--engine-arg",
        "legal",
        "--reference",
        env!("CARGO_BIN_EXE_mock-engine"),
        "--reference-arg",
        "null",
        "--max-plies",
        "4",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let verdicts = verdicts(&output);
    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].contains("played illegal move 0000 after 1 plies"));
}

#[test]
fn test_harness_error_exits_with_two() {
    let output = conformance(&["illegal-move", "--engine", "/nonexistent/engine"]);

    assert_eq!(output.status.code(), Some(2));
    let verdicts = verdicts(&output);
    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].starts_with("ERROR: failed to start engine /nonexistent/engine"));
}

#[test]
fn test_bad_fen_exits_with_two() {
    let output = conformance(&[
        "illegal-move",
        "--engine",
        env!("CARGO_BIN_EXE_mock-engine"),
        "--fen",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let verdicts = verdicts(&output);
    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].starts_with("ERROR: invalid position notation"));
}
