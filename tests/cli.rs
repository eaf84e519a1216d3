use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn artifact(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("artifacts")
        .join(name)
}

fn medcost() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_medcost"));
    cmd.arg("--model")
        .arg(artifact("insurance_model.toml"))
        .arg("--columns")
        .arg(artifact("columns.json"));
    cmd
}

#[test]
fn predict_prints_estimate_and_contributions() {
    let output = medcost()
        .args([
            "predict", "--age", "30", "--bmi", "25", "--children", "0", "--sex", "female",
            "--smoker", "no", "--region", "northeast",
        ])
        .output()
        .expect("run medcost cli");

    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Estimated annual medical charges: $4,246.99"));
    assert!(stdout.contains("Feature contributions"));
}

#[test]
fn predict_json_output() {
    let output = medcost()
        .args(["predict", "--smoker", "yes", "--region", "southeast", "--json"])
        .output()
        .expect("run medcost cli");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["charges"].as_f64().unwrap() > 20000.0);
    assert_eq!(value["contributions"][0]["feature"], "smoker_yes");
}

#[test]
fn predict_rejects_values_outside_control_bounds() {
    for args in [
        ["predict", "--age", "17"],
        ["predict", "--bmi", "61"],
        ["predict", "--children", "11"],
        ["predict", "--region", "midwest"],
    ] {
        let status = medcost()
            .args(args)
            .stderr(Stdio::null())
            .status()
            .expect("run medcost cli");
        assert!(!status.success(), "{args:?} should be rejected");
    }
}

#[test]
fn missing_artifacts_are_fatal() {
    let tmp = tempdir().expect("temporary directory");
    let output = Command::new(env!("CARGO_BIN_EXE_medcost"))
        .current_dir(tmp.path())
        .arg("predict")
        .output()
        .expect("run medcost cli");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error: Could not load column list"));
}

#[test]
fn batch_writes_predictions_tsv() {
    let tmp = tempdir().expect("temporary directory");
    let input_path = tmp.path().join("patients.csv");
    let output_path = tmp.path().join("predictions.tsv");
    fs::write(
        &input_path,
        "id,age,bmi,children,sex,smoker,region\n\
         a,30,25,0,female,no,northeast\n\
         b,18,10,0,male,no,southeast\n",
    )
    .unwrap();

    let status = medcost()
        .arg("batch")
        .arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .stdout(Stdio::null())
        .status()
        .expect("run medcost cli");
    assert!(status.success());

    let text = fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["id\tprediction", "a\t4246.988364", "b\t0.000000"]);
}

#[test]
fn form_reads_answers_from_stdin() {
    let mut child = medcost()
        .arg("form")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn medcost cli");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"30\n25\n0\nfemale\nno\nnortheast\ny\nn\nn\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("$4,246.99"));
}

#[test]
fn distribution_renders_histogram() {
    let tmp = tempdir().expect("temporary directory");
    let dataset = tmp.path().join("insurance.csv");
    let mut csv = String::from("age,sex,bmi,children,smoker,region,charges\n");
    for i in 0..40 {
        csv.push_str(&format!(
            "{},female,30.0,0,no,northeast,{:.2}\n",
            18 + i,
            1500.0 + 900.0 * i as f64
        ));
    }
    fs::write(&dataset, csv).unwrap();

    let output = medcost()
        .arg("--dataset")
        .arg(&dataset)
        .arg("distribution")
        .output()
        .expect("run medcost cli");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Dataset charge distribution (40 records,"));
}

#[test]
fn inspect_lists_coefficients() {
    let output = medcost().arg("inspect").output().expect("run medcost cli");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Model: insurance-ols"));
    assert!(stdout.contains("smoker_yes"));
    assert!(stdout.contains("region_northeast"));
}

#[test]
fn failed_batch_leaves_no_output_file() {
    let tmp = tempdir().expect("temporary directory");
    let input_path = tmp.path().join("patients.csv");
    let output_path = tmp.path().join("predictions.tsv");
    fs::write(
        &input_path,
        "age,bmi,children,sex,smoker,region\n\
         30,25,0,female,no,northeast\n\
         30,25,0,female,no,midwest\n",
    )
    .unwrap();

    let output = medcost()
        .arg("batch")
        .arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("run medcost cli");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Row 2"), "stderr was: {stderr}");
    assert!(!output_path.exists());
}

#[test]
fn form_reports_missing_dataset_file() {
    let tmp = tempdir().expect("temporary directory");
    let missing = tmp.path().join("insurance.csv");
    let mut child = medcost()
        .arg("--dataset")
        .arg(&missing)
        .arg("form")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn medcost cli");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\n\n\n\n\n\nn\ny\nn\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Could not load dataset"));
    assert!(!stdout.contains("No reference dataset configured."));
}

#[test]
fn shipped_config_file_resolves_artifacts() {
    let output = Command::new(env!("CARGO_BIN_EXE_medcost"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .arg("--config")
        .arg(artifact("medcost.toml"))
        .arg("inspect")
        .output()
        .expect("run medcost cli");

    assert!(output.status.success(), "CLI exited with {:?}", output.status);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Model: insurance-ols"));
    assert!(stdout.contains("Column list 'artifacts/columns.json'"));
}
