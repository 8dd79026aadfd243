use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REQUIREMENTS: &str = "RF01. O cliente deve poder registar-se fornecendo nome, email e telefone. \
RF02. Os produtos têm nome, descrição e preço.";

const ENV_VARS: &[&str] = &[
    "REQ2DOM_ANALYZER",
    "REQ2DOM_LOCALE",
    "REQ2DOM_COMPLETION_PROVIDER",
    "REQ2DOM_COMPLETION_ENDPOINT",
    "REQ2DOM_COMPLETION_MODEL",
    "REQ2DOM_COMPLETION_TIMEOUT",
];

/// Runs against an explicit config file so the user's own settings and
/// environment never leak into the test.
fn req2dom(config: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("req2dom").into();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "off");
    cmd.arg("--config").arg(config);
    cmd
}

/// Returns (tempdir_guard, config_path). The guard must be kept alive.
fn workspace(config: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, config).unwrap();
    (tmp, path)
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    let mut cmd: Command = cargo_bin_cmd!("req2dom").into();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("req2dom"));
}

#[test]
fn broken_config_fails() {
    let (_tmp, config) = workspace("analyzer = \"telepathy\"\n");
    req2dom(&config)
        .args(["normalize", "-"])
        .write_stdin("RF01. Anything.")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// --- Normalize ---

#[test]
fn normalize_labels_units_from_stdin() {
    let (_tmp, config) = workspace("");
    req2dom(&config)
        .arg("normalize")
        .write_stdin(REQUIREMENTS)
        .assert()
        .success()
        .stdout(predicate::str::contains("Requisito 01: O cliente deve poder registar-se"))
        .stdout(predicate::str::contains("Requisito 02: Os produtos têm nome"))
        .stdout(predicate::str::contains("RF01").not());
}

#[test]
fn normalize_with_english_labels() {
    let (_tmp, config) = workspace("");
    req2dom(&config)
        .args(["--locale", "en", "normalize"])
        .write_stdin("REQ1. Users borrow books.")
        .assert()
        .success()
        .stdout(predicate::str::contains("Requirement 1: Users borrow books."));
}

#[test]
fn normalize_without_markers_is_unchanged() {
    let (_tmp, config) = workspace("");
    req2dom(&config)
        .arg("normalize")
        .write_stdin("Plain prose with no codes.")
        .assert()
        .success()
        .stdout("Plain prose with no codes.\n");
}

#[test]
fn normalize_missing_file_fails() {
    let (tmp, config) = workspace("");
    req2dom(&config)
        .arg("normalize")
        .arg(tmp.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

// --- Analyze ---

#[test]
fn analyze_writes_xml() {
    let (tmp, config) = workspace("");
    let input = write_file(tmp.path(), "requisitos.txt", REQUIREMENTS);
    req2dom(&config)
        .arg("analyze")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<mxGraphModel"))
        .stdout(predicate::str::contains(r#"value="Cliente""#))
        .stdout(predicate::str::contains(r#"value="Produto""#));
}

#[test]
fn analyze_writes_json() {
    let (_tmp, config) = workspace("");
    let output = req2dom(&config)
        .args(["analyze", "--format", "json"])
        .write_stdin(REQUIREMENTS)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<&str> = value["classes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["nome"].as_str())
        .collect();
    assert!(names.contains(&"Cliente"));
    assert!(names.contains(&"Produto"));
}

#[test]
fn analyze_to_output_file() {
    let (tmp, config) = workspace("");
    let out = tmp.path().join("diagram.xml");
    req2dom(&config)
        .args(["analyze", "--analyzer", "syntactic", "--output"])
        .arg(&out)
        .write_stdin(REQUIREMENTS)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains("</mxGraphModel>"));
}

#[test]
fn analyze_rejects_unknown_analyzer() {
    let (_tmp, config) = workspace("");
    req2dom(&config)
        .args(["analyze", "--analyzer", "telepathy"])
        .write_stdin(REQUIREMENTS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("telepathy"));
}

#[test]
fn analyze_completion_without_key_fails() {
    let (_tmp, config) = workspace("[completion]\nprovider = \"openai\"\n");
    req2dom(&config)
        .env_remove("OPENAI_API_KEY")
        .args(["analyze", "--analyzer", "completion"])
        .write_stdin(REQUIREMENTS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn analyze_hybrid_degrades_when_service_is_down() {
    let (_tmp, config) = workspace(
        "analyzer = \"hybrid\"\n\n[completion]\nprovider = \"ollama\"\nendpoint = \"http://127.0.0.1:9/api/generate\"\nconnect_timeout_seconds = 1\ntimeout_seconds = 2\n",
    );
    req2dom(&config)
        .arg("analyze")
        .write_stdin(REQUIREMENTS)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"value="Cliente""#));
}

// --- Render ---

#[test]
fn render_fenced_json() {
    let (_tmp, config) = workspace("");
    let reply = "Here is the model:\n```json\n{\"classes\": [\
{\"nome\": \"Pedido\", \"atributos\": [{\"nome\": \"data\", \"tipo\": \"Date\"}], \
\"relacionamentos\": [{\"tipo\": \"composicao\", \"alvo\": \"Item\", \"cardinalidade\": \"1..*\"}]}, \
{\"nome\": \"Item\", \"atributos\": [], \"relacionamentos\": []}]}\n```\n";
    req2dom(&config)
        .arg("render")
        .write_stdin(reply)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"value="Pedido""#))
        .stdout(predicate::str::contains(r#"value="data: Date""#))
        .stdout(predicate::str::contains(r#"id="edge-1-target" value="*""#))
        .stdout(predicate::str::contains("startArrow=diamondThin"));
}

#[test]
fn render_malformed_input_yields_diagnostic() {
    let (_tmp, config) = workspace("");
    req2dom(&config)
        .arg("render")
        .write_stdin("the model could not be produced")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<mxGraphModel"))
        .stdout(predicate::str::contains(r#"id="diagnostic""#));
}

#[test]
fn render_drops_unknown_targets() {
    let (tmp, config) = workspace("");
    let model = write_file(
        tmp.path(),
        "model.json",
        r#"{"classes": [{"nome": "Livro", "atributos": [], "relacionamentos": [{"tipo": "associacao", "alvo": "Fantasma", "cardinalidade": "1..1"}]}]}"#,
    );
    req2dom(&config)
        .arg("render")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"value="Livro""#))
        .stdout(predicate::str::contains("edge-").not());
}
