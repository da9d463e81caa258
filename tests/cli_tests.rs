//! Integration tests for the CLI application
//!
//! These tests verify that the CLI commands work correctly with real data files.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Helper to create test data files
struct TestDataFiles {
    pub libsvm_file: NamedTempFile,
    pub csv_file: NamedTempFile,
    pub test_libsvm_file: NamedTempFile,
    pub test_csv_file: NamedTempFile,
}

impl TestDataFiles {
    fn new() -> std::io::Result<Self> {
        // Create LibSVM training data
        let mut libsvm_file = NamedTempFile::new()?;
        writeln!(libsvm_file, "+1 1:2.0 2:1.0")?;
        writeln!(libsvm_file, "-1 1:-2.0 2:-1.0")?;
        writeln!(libsvm_file, "+1 1:1.5 2:0.8")?;
        writeln!(libsvm_file, "-1 1:-1.5 2:-0.8")?;
        writeln!(libsvm_file, "+1 1:1.8 2:0.9")?;
        writeln!(libsvm_file, "-1 1:-1.8 2:-0.9")?;
        writeln!(libsvm_file, "+1 1:2.2 2:1.1")?;
        writeln!(libsvm_file, "-1 1:-2.2 2:-1.1")?;
        writeln!(libsvm_file, "+1 1:1.6 2:1.2")?;
        writeln!(libsvm_file, "-1 1:-1.6 2:-1.2")?;
        libsvm_file.flush()?;

        // Create CSV training data with 0/1 labels
        let mut csv_file = NamedTempFile::with_suffix(".csv")?;
        writeln!(csv_file, "feature1,feature2,label")?;
        writeln!(csv_file, "2.0,1.0,1")?;
        writeln!(csv_file, "-2.0,-1.0,0")?;
        writeln!(csv_file, "1.5,0.8,1")?;
        writeln!(csv_file, "-1.5,-0.8,0")?;
        writeln!(csv_file, "1.8,0.9,1")?;
        writeln!(csv_file, "-1.8,-0.9,0")?;
        csv_file.flush()?;

        // Create LibSVM test data
        let mut test_libsvm_file = NamedTempFile::new()?;
        writeln!(test_libsvm_file, "+1 1:1.6 2:0.7")?;
        writeln!(test_libsvm_file, "-1 1:-1.6 2:-0.7")?;
        test_libsvm_file.flush()?;

        // Create CSV test data
        let mut test_csv_file = NamedTempFile::with_suffix(".csv")?;
        writeln!(test_csv_file, "feature1,feature2,label")?;
        writeln!(test_csv_file, "1.6,0.7,1")?;
        writeln!(test_csv_file, "-1.6,-0.7,-1")?;
        test_csv_file.flush()?;

        Ok(TestDataFiles {
            libsvm_file,
            csv_file,
            test_libsvm_file,
            test_csv_file,
        })
    }
}

/// Path to the compiled CLI binary
fn get_cli_binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_rpcf")
}

fn run(args: &[&str]) -> Output {
    Command::new(get_cli_binary_path())
        .args(args)
        .output()
        .expect("Failed to run CLI")
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().expect("non UTF-8 temp path")
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Train a seeded model on the LibSVM training file and return its path
fn train_model(test_data: &TestDataFiles, dir: &TempDir, extra: &[&str]) -> std::path::PathBuf {
    let model_path = dir.path().join("model.json");
    let mut args = vec![
        "train",
        "--data",
        path_str(test_data.libsvm_file.path()),
        "--output",
        path_str(&model_path),
        "--format",
        "libsvm",
        "--seed",
        "42",
    ];
    args.extend_from_slice(extra);

    let output = run(&args);
    assert_success(&output, "Train command");
    assert!(model_path.exists(), "Model file was not created");
    model_path
}

#[test]
fn test_cli_train_command_libsvm() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    train_model(
        &test_data,
        &temp_dir,
        &["-C", "10.0", "--lambda", "0.01", "--max-iterations", "5000"],
    );
}

#[test]
fn test_cli_train_command_vns() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let model_path = train_model(
        &test_data,
        &temp_dir,
        &["--strategy", "vns", "--k-neighbors", "3", "--max-vns-iter", "2"],
    );

    let content = std::fs::read_to_string(model_path).expect("Failed to read model");
    assert!(content.contains("Vns"));
    assert!(content.contains("k_neighbors"));
}

#[test]
fn test_cli_train_command_csv() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = temp_dir.path().join("model.json");

    let output = run(&[
        "train",
        "--data",
        path_str(test_data.csv_file.path()),
        "--output",
        path_str(&model_path),
        "-C",
        "2.0",
        "--seed",
        "1",
    ]);

    assert_success(&output, "CSV train command");
    assert!(model_path.exists(), "Model file was not created");
}

#[test]
fn test_cli_info_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = train_model(&test_data, &temp_dir, &[]);

    let output = run(&["info", path_str(&model_path), "--cones"]);
    assert_success(&output, "Info command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RPCF Model Summary"));
    assert!(stdout.contains("Cones:"));
    assert!(stdout.contains("gamma"));
}

#[test]
fn test_cli_predict_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = train_model(&test_data, &temp_dir, &[]);

    let output = run(&[
        "predict",
        "--model",
        path_str(&model_path),
        "--data",
        path_str(test_data.test_libsvm_file.path()),
        "--confidence",
    ]);
    assert_success(&output, "Predict command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Predictions for 2 samples"));
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.split_whitespace().count(), 3);
    }
}

#[test]
fn test_cli_predict_to_file() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = train_model(&test_data, &temp_dir, &[]);
    let predictions_path = temp_dir.path().join("predictions.txt");

    let output = run(&[
        "predict",
        "--model",
        path_str(&model_path),
        "--data",
        path_str(test_data.test_csv_file.path()),
        "--output",
        path_str(&predictions_path),
    ]);
    assert_success(&output, "Predict command");

    let content = std::fs::read_to_string(&predictions_path).expect("Failed to read predictions");
    assert!(content.starts_with("# Predictions for 2 samples"));
}

#[test]
fn test_cli_evaluate_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = train_model(&test_data, &temp_dir, &[]);

    let output = run(&[
        "evaluate",
        "--model",
        path_str(&model_path),
        "--data",
        path_str(test_data.test_libsvm_file.path()),
        "--detailed",
    ]);
    assert_success(&output, "Evaluate command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Accuracy:"));
    assert!(stdout.contains("Specificity:"));
    assert!(stdout.contains("Undecided:"));
}

#[test]
fn test_cli_grid_search_command() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = temp_dir.path().join("best.json");

    let output = run(&[
        "grid-search",
        "--data",
        path_str(test_data.libsvm_file.path()),
        "--validation",
        path_str(test_data.test_libsvm_file.path()),
        "--c-values",
        "1,10",
        "--lambda-values",
        "0.01",
        "--seed",
        "3",
        "--output",
        path_str(&model_path),
    ]);
    assert_success(&output, "Grid search command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Grid Search Results"));
    assert!(stdout.contains("Best: C="));
    assert!(model_path.exists(), "Best model was not saved");
}

/// Train on raw labels 1/2 where only the training file uses feature 3
fn write_raw_label_files() -> std::io::Result<(NamedTempFile, NamedTempFile)> {
    let mut train = NamedTempFile::with_suffix(".libsvm")?;
    writeln!(train, "1 1:0.0 2:0.0 3:0.0")?;
    writeln!(train, "1 1:0.0 2:1.0")?;
    writeln!(train, "2 1:5.0 2:5.0")?;
    writeln!(train, "2 1:5.0 2:6.0")?;
    train.flush()?;

    // Positive class only, no feature 3
    let mut test = NamedTempFile::with_suffix(".libsvm")?;
    writeln!(test, "2 1:5.0 2:5.0")?;
    writeln!(test, "2 1:5.0 2:6.0")?;
    test.flush()?;

    Ok((train, test))
}

#[test]
fn test_cli_evaluate_sparse_single_class_file() {
    let (train, test) = write_raw_label_files().expect("Failed to create test data");
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = temp_dir.path().join("model.json");

    let output = run(&[
        "train",
        "--data",
        path_str(train.path()),
        "--output",
        path_str(&model_path),
        "--seed",
        "0",
    ]);
    assert_success(&output, "Train command");

    let output = run(&[
        "evaluate",
        "--model",
        path_str(&model_path),
        "--data",
        path_str(test.path()),
    ]);
    assert_success(&output, "Evaluate command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Accuracy: 100.00%"), "{}", stdout);

    let output = run(&[
        "predict",
        "--model",
        path_str(&model_path),
        "--data",
        path_str(test.path()),
    ]);
    assert_success(&output, "Predict command");
}

#[test]
fn test_cli_grid_search_sparse_validation_file() {
    let (train, validation) = write_raw_label_files().expect("Failed to create test data");

    let output = run(&[
        "grid-search",
        "--data",
        path_str(train.path()),
        "--validation",
        path_str(validation.path()),
        "--c-values",
        "1",
        "--lambda-values",
        "0.01",
        "--seed",
        "0",
    ]);
    assert_success(&output, "Grid search command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("failed"), "{}", stdout);
    assert!(stdout.contains("accuracy=1.0000"), "{}", stdout);
}

#[test]
fn test_cli_grid_search_with_split() {
    let test_data = TestDataFiles::new().expect("Failed to create test data");

    let output = run(&[
        "grid-search",
        "--data",
        path_str(test_data.libsvm_file.path()),
        "--c-values",
        "1",
        "--lambda-values",
        "0.01,0.1",
        "--validation-fraction",
        "0.4",
        "--seed",
        "8",
    ]);
    assert_success(&output, "Grid search command");
}

#[test]
fn test_cli_error_handling() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let model_path = temp_dir.path().join("model.json");

    // Missing data file
    let output = run(&[
        "train",
        "--data",
        "/non/existent/file.libsvm",
        "--output",
        path_str(&model_path),
    ]);
    assert!(!output.status.success());

    // Unsupported format
    let mut data = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(data, "+1 1:1.0").expect("Failed to write");
    data.flush().expect("Failed to flush");
    let output = run(&[
        "train",
        "--data",
        path_str(data.path()),
        "--output",
        path_str(&model_path),
        "--format",
        "arff",
    ]);
    assert!(!output.status.success());

    // Invalid hyperparameter
    let output = run(&[
        "train",
        "--data",
        path_str(data.path()),
        "--output",
        path_str(&model_path),
        "-C",
        "-1",
    ]);
    assert!(!output.status.success());

    // Missing model
    let output = run(&["info", "/non/existent/model.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_help_and_version() {
    let output = run(&["--help"]);
    assert_success(&output, "Help");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("grid-search"));

    let output = run(&["--version"]);
    assert_success(&output, "Version");
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
