//! End-to-end tests for the gdm-risk binary.
//!
//! Every invocation runs with a private XDG config dir and no models-file
//! environment, so only built-in presets (or an explicit --models) apply.

use assert_cmd::Command;
use gdm_config::{get_preset, ModelCatalog, PresetName, CONFIG_SCHEMA_VERSION};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Sandbox {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gdm-risk").expect("gdm-risk binary should exist");
        cmd.env_remove("GDM_MODELS")
            .env_remove("GDM_CONFIG_DIR")
            .env_remove("GDM_LOG")
            .env_remove("GDM_LOG_FORMAT")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"));
        cmd
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Single-source scoring
// ============================================================================

mod scoring {
    use super::*;

    #[test]
    fn clinical_json_result() {
        let sb = Sandbox::new();
        let output = sb
            .cmd()
            .args(["clinical", "--bmi", "27", "--family-history", "no"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        assert_eq!(v["result"]["category"], "intermediate");
        assert_eq!(v["result"]["source"], "clinical");
        let p = v["result"]["probability"].as_f64().unwrap();
        assert!((p - 0.48328123509086884).abs() < 1e-12);
        assert!(v["run_id"].as_str().unwrap().starts_with("run-"));
    }

    #[test]
    fn clinical_summary_accepts_comma_decimal() {
        Sandbox::new()
            .cmd()
            .args(["-f", "summary", "clinical", "--bmi", "27,0", "--family-history", "0"])
            .assert()
            .success()
            .stdout("Intermediate baseline GDM risk (48.3%)\n");
    }

    #[test]
    fn lipid_summary() {
        Sandbox::new()
            .cmd()
            .args(["-f", "summary", "lipid", "--triglycerides", "2.0", "--hdl", "1,2"])
            .assert()
            .success()
            .stdout("Intermediate complication risk (60.8%)\n");
    }

    #[test]
    fn metabolomic_markdown() {
        Sandbox::new()
            .cmd()
            .args([
                "-f",
                "md",
                "metabolomic",
                "--tyrosine",
                "39",
                "--alpha-aminoadipic-acid",
                "3.5",
                "--mh3",
                "8.9",
                "--phosphoethanolamine",
                "2.3",
                "--phosphoserine",
                "0.64",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("## metabolomic risk:"))
            .stdout(predicate::str::contains("| Tyrosine |"));
    }

    fn refitted_m4_models(sb: &Sandbox) -> std::path::PathBuf {
        let mut m4 = get_preset(PresetName::Metabolomic4);
        m4.provisional = false;
        m4.coefficients.insert("Tyrosine".to_string(), 1.2);
        m4.coefficients.insert("Phosphoserine".to_string(), -1.1);
        let catalog = ModelCatalog {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            models: [("metabolomic4".to_string(), m4)].into_iter().collect(),
        };
        let models = sb.path("models.json");
        fs::write(&models, serde_json::to_string(&catalog).unwrap()).unwrap();
        models
    }

    const M4_ARGS: [&str; 11] = [
        "--metabolomic-preset",
        "metabolomic4",
        "metabolomic",
        "--tyrosine",
        "16",
        "--mh3",
        "20",
        "--phosphoethanolamine",
        "1.4",
        "--phosphoserine",
        "1.7",
    ];

    #[test]
    fn builtin_metabolomic4_is_refused() {
        Sandbox::new()
            .cmd()
            .args(M4_ARGS)
            .assert()
            .code(12)
            .stderr(predicate::str::contains("metabolomic4 requires a refit"));
    }

    #[test]
    fn refitted_metabolomic4_needs_only_four() {
        let sb = Sandbox::new();
        let models = refitted_m4_models(&sb);
        let output = sb.cmd().arg("--models").arg(&models).args(M4_ARGS).output().unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        assert_eq!(v["result"]["model"], "metabolomic4");
        assert!(v["result"].get("provisional").is_none());
        assert_eq!(v["result"]["contributions"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn clinical_unaffected_by_unusable_metabolomic_preset() {
        let sb = Sandbox::new();
        let output = sb
            .cmd()
            .args([
                "--metabolomic-preset",
                "metabolomic4",
                "clinical",
                "--bmi",
                "27",
                "--family-history",
                "no",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(stdout_json(&output)["result"]["model"], "clinical");

        sb.cmd()
            .args(["--metabolomic-preset", "metabolomic4", "lipid"])
            .args(["--triglycerides", "2.0", "--hdl", "1.2"])
            .assert()
            .success();

        // Only the metabolomic part of an assessment needs the preset.
        sb.cmd()
            .args(["--metabolomic-preset", "metabolomic4", "assess"])
            .args(["--bmi", "27", "--family-history", "no"])
            .assert()
            .success();
    }

    #[test]
    fn clamp_flag_accepts_out_of_range() {
        let sb = Sandbox::new();
        sb.cmd()
            .args(["clinical", "--bmi", "75", "--family-history", "1"])
            .assert()
            .code(10);
        sb.cmd()
            .args(["--clamp-ranges", "clinical", "--bmi", "75", "--family-history", "1"])
            .assert()
            .success();
    }
}

// ============================================================================
// Input errors
// ============================================================================

mod input_errors {
    use super::*;

    #[test]
    fn non_numeric_field_is_exit_10_with_feature() {
        let sb = Sandbox::new();
        let output = sb
            .cmd()
            .args(["lipid", "--triglycerides", "abc", "--hdl", "1.2"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(10));
        let err: Value = serde_json::from_slice(&output.stderr).expect("stderr JSON");
        assert_eq!(err["code"], 20);
        assert_eq!(err["context"]["feature"], "triglycerides");
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn zero_metabolite_rejected() {
        Sandbox::new()
            .cmd()
            .args([
                "-f",
                "summary",
                "metabolomic",
                "--tyrosine",
                "16",
                "--alpha-aminoadipic-acid",
                "1.5",
                "--mh3",
                "0",
                "--phosphoethanolamine",
                "1.4",
                "--phosphoserine",
                "1.7",
            ])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("MH3"));
    }

    #[test]
    fn missing_metabolite_named() {
        Sandbox::new()
            .cmd()
            .args(["-f", "summary", "metabolomic", "--tyrosine", "16"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("AlphaAminoadipicAcid"));
    }

    #[test]
    fn bad_flag_rejected() {
        Sandbox::new()
            .cmd()
            .args(["clinical", "--bmi", "25", "--family-history", "2"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("not_binary"));
    }

    #[test]
    fn unknown_command_fails() {
        Sandbox::new()
            .cmd()
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

// ============================================================================
// Assessment and combination
// ============================================================================

mod assessment {
    use super::*;

    #[test]
    fn partial_assessment_combines_available() {
        let sb = Sandbox::new();
        let output = sb
            .cmd()
            .args([
                "assess",
                "--bmi",
                "20",
                "--family-history",
                "no",
                "--triglycerides",
                "2.0",
                "--hdl",
                "1.2",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        assert_eq!(v["assessment"]["status"], "partial");
        assert_eq!(v["assessment"]["overall"], "intermediate");
        assert_eq!(v["assessment"]["missing"][0], "metabolomic");
    }

    #[test]
    fn empty_assessment_reports_incomplete() {
        Sandbox::new()
            .cmd()
            .args(["-f", "summary", "assess"])
            .assert()
            .success()
            .stdout(predicate::str::contains("incomplete"));
    }

    #[test]
    fn half_filled_source_is_an_error() {
        Sandbox::new()
            .cmd()
            .args(["assess", "--bmi", "25"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("family_history"));
    }

    #[test]
    fn combine_labels() {
        Sandbox::new()
            .cmd()
            .args(["-f", "summary", "combine", "low", "Высокий", "intermediate"])
            .assert()
            .success()
            .stdout("Overall: High\n");
    }

    #[test]
    fn combine_nothing_is_exit_11() {
        Sandbox::new()
            .cmd()
            .arg("combine")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("insufficient"));
    }
}

// ============================================================================
// Batch, presets, config
// ============================================================================

mod tables_and_config {
    use super::*;

    #[test]
    fn batch_to_file_prints_summary() {
        let sb = Sandbox::new();
        let input = sb.path("in.csv");
        let output = sb.path("out.csv");
        fs::write(&input, "id,triglycerides,hdl\na,2.0,1.2\nb,0.8,1.9\n").unwrap();

        sb.cmd()
            .args(["-f", "summary", "batch", "--model", "lipid", "-i"])
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("2 rows, 2 scored"));

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("id,triglycerides,hdl,probability,class_at_threshold\n"));
        assert!(written.contains("a,2.0,1.2,0.607639,intermediate"));
    }

    #[test]
    fn batch_from_stdin_to_stdout() {
        Sandbox::new()
            .cmd()
            .args(["batch", "--model", "clinical", "-i", "-"])
            .write_stdin("bmi,family_history\n27,0\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("27,0,0.483281,intermediate"));
    }

    #[test]
    fn batch_abort_reports_row() {
        let sb = Sandbox::new();
        let input = sb.path("in.csv");
        let output = sb.path("out.csv");
        fs::write(&input, "bmi,family_history\n27,0\n27,x\n").unwrap();
        sb.cmd()
            .args(["-f", "summary", "batch", "--model", "clinical", "-i"])
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .code(10)
            .stderr(predicate::str::contains("row 2"));
        assert!(!output.exists(), "aborted batch left a partial table");
        let leftovers: Vec<_> = fs::read_dir(sb.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n != "in.csv" && n != "xdg")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn batch_abort_keeps_previous_output() {
        let sb = Sandbox::new();
        let input = sb.path("in.csv");
        let output = sb.path("out.csv");
        fs::write(&input, "bmi,family_history\n27,0\n27,x\n").unwrap();
        fs::write(&output, "earlier run\n").unwrap();
        sb.cmd()
            .args(["batch", "--model", "clinical", "-i"])
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .code(10);
        assert_eq!(fs::read_to_string(&output).unwrap(), "earlier run\n");
    }

    #[test]
    fn batch_mark_invalid_survives_short_row() {
        let sb = Sandbox::new();
        let input = sb.path("in.csv");
        let output = sb.path("out.csv");
        fs::write(&input, "id,triglycerides,hdl\n1,2.0,1.2\n2,2.0\n3,1.0,1.5\n").unwrap();
        sb.cmd()
            .args(["-f", "summary", "batch", "--model", "lipid", "--mark-invalid", "-i"])
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("3 rows, 2 scored"));
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("2,2.0,,,invalid"), "{written}");
    }

    #[test]
    fn presets_listed() {
        let sb = Sandbox::new();
        let output = sb.cmd().arg("presets").output().unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        let names: Vec<&str> = v["presets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["clinical", "lipid", "metabolomic5", "metabolomic4"]);
    }

    #[test]
    fn models_file_overrides_metabolomic4() {
        let sb = Sandbox::new();
        let mut m4 = get_preset(PresetName::Metabolomic4);
        m4.provisional = false;
        m4.coefficients.insert("MH3".to_string(), 0.5);
        let catalog = ModelCatalog {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            models: [("metabolomic4".to_string(), m4)].into_iter().collect(),
        };
        let models = sb.path("models.json");
        fs::write(&models, serde_json::to_string(&catalog).unwrap()).unwrap();

        let output = sb
            .cmd()
            .arg("--models")
            .arg(&models)
            .args(["config", "show"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        assert_eq!(v["config"]["overridden"][0], "metabolomic4");
        assert_eq!(v["config"]["source"], "CLI argument");
    }

    #[test]
    fn invalid_models_file_is_exit_12() {
        let sb = Sandbox::new();
        let models = sb.path("models.json");
        fs::write(&models, "{ not json").unwrap();
        sb.cmd()
            .args(["config", "validate"])
            .arg(&models)
            .assert()
            .code(12);
    }

    #[test]
    fn schema_is_json() {
        let sb = Sandbox::new();
        let output = sb.cmd().arg("schema").output().unwrap();
        assert!(output.status.success());
        let v = stdout_json(&output);
        assert!(v.to_string().contains("probability"));
    }
}
