//! End-to-end tests of the `qirk` binary.
//!
//! Each test runs the built executable against files in a temporary
//! directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn qirk(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qirk"))
        .args(args)
        .env_remove("QIRK_MAX_STEPS")
        .env_remove("QIRK_MAX_CALL_DEPTH")
        .env_remove("QIRK_ENTRY_POINT")
        .env_remove("QIRK_LOG_LEVEL")
        .output()
        .expect("failed to run qirk")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn generate(dir: &Path, program: &str) -> String {
    let path = dir.join(format!("{program}.ll"));
    let path = path.to_str().unwrap().to_string();
    let output = qirk(&["generate", program, "-o", &path]);
    assert!(output.status.success(), "{}", stderr(&output));
    path
}

// ============================================================================
// generate / verify / fmt
// ============================================================================

mod programs {
    use super::*;

    #[test]
    fn test_generate_to_stdout() {
        let output = qirk(&["generate", "bell"]);
        assert!(output.status.success());
        let ir = stdout(&output);
        assert!(ir.starts_with("; ModuleID = 'bell'"));
        assert!(ir.contains("__quantum__qis__mz__body"));
    }

    #[test]
    fn test_generate_rejects_qubits_for_bell() {
        let output = qirk(&["generate", "bell", "--qubits", "3"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("bernstein-vazirani"));
    }

    #[test]
    fn test_verify_generated() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "teleport");

        let output = qirk(&["verify", &path]);
        assert!(output.status.success(), "{}", stderr(&output));
        let text = stdout(&output);
        assert!(text.contains("Entry point: main"));
        assert!(text.contains("Qubits:      3"));
        assert!(text.contains("Results:     2"));
    }

    #[test]
    fn test_verify_reports_missing_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.ll");
        fs::write(&path, "define void @f() {\nentry:\n  ret void\n}\n").unwrap();

        let output = qirk(&["verify", path.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Error:"));
    }

    #[test]
    fn test_fmt_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bernstein-vazirani");
        let generated = fs::read_to_string(&path).unwrap();

        let out_path = dir.path().join("formatted.ll");
        let output = qirk(&["fmt", &path, "-o", out_path.to_str().unwrap()]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert_eq!(fs::read_to_string(&out_path).unwrap(), generated);
    }

    #[test]
    fn test_missing_input_file() {
        let output = qirk(&["verify", "/tmp/qirk_test_nonexistent_file_12345.ll"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("File not found"));
    }
}

// ============================================================================
// eval
// ============================================================================

mod evaluation {
    use super::*;

    #[test]
    fn test_eval_bell_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = qirk(&["eval", &path, "--results", "10"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let text = stdout(&output);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[..6],
            &[
                "qubits[2]",
                "out[2]",
                "h qubit[0]",
                "cx qubit[0], qubit[1]",
                "m qubit[0] => out[0]",
                "m qubit[1] => out[1]",
            ]
        );
        assert!(text.contains("OUTPUT\tRESULT\t1\tr0"));
        assert!(text.contains("OUTPUT\tRESULT\t0\tr1"));
    }

    #[test]
    fn test_eval_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "teleport");

        let output = qirk(&["eval", &path, "-r", "true,false", "--format", "json"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["metadata"]["consumed"], 2);
        assert_eq!(report["metadata"]["entry_point"], "main");
        assert_eq!(report["trace"][0]["op"], "h");
        let log = report["instructions"].as_array().unwrap();
        assert!(log.iter().any(|l| l == "z qubit[1]"));
        assert!(!log.iter().any(|l| l == "x qubit[1]"));
    }

    #[test]
    fn test_eval_stream_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = qirk(&["eval", &path, "--results", "1"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("exhausted"));
    }

    #[test]
    fn test_eval_invalid_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = qirk(&["eval", &path, "--results", "1x"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Invalid result bit"));
    }

    #[test]
    fn test_eval_step_limit_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = qirk(&["eval", &path, "--max-steps", "2"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Step limit of 2 exceeded"));
    }

    #[test]
    fn test_eval_step_limit_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");
        let config = dir.path().join("qirk.yaml");
        fs::write(&config, "eval:\n  max_steps: 3\n").unwrap();

        let output = qirk(&["eval", &path, "--config", config.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Step limit of 3 exceeded"));

        // Flags win over the file.
        let output = qirk(&[
            "eval",
            &path,
            "--config",
            config.to_str().unwrap(),
            "--max-steps",
            "1000",
        ]);
        assert!(output.status.success(), "{}", stderr(&output));
    }

    #[test]
    fn test_eval_step_limit_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = Command::new(env!("CARGO_BIN_EXE_qirk"))
            .args(["eval", &path])
            .env("QIRK_MAX_STEPS", "4")
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Step limit of 4 exceeded"));
    }

    #[test]
    fn test_eval_unknown_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");

        let output = qirk(&["eval", &path, "--entry-point", "kernel"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Entry point not found"));
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate(dir.path(), "bell");
        let config = dir.path().join("qirk.yaml");
        fs::write(&config, "logging:\n  level: loud\n").unwrap();

        let output = qirk(&["eval", &path, "-c", config.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Invalid log level"));
    }
}

#[test]
fn test_version() {
    let output = qirk(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}
