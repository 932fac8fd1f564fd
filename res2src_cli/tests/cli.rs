use std::{fs, path::Path, process::Command};

use tempfile::tempdir;

fn res2src(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_res2src"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_single_file_without_compression() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bytes.bin"), [0u8, 1, 2, 3, 4, 5]).unwrap();

    let output = res2src(dir.path(), &["bytes.bin", "--length", "1000"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = fs::read_to_string(dir.path().join("resources.cpp")).unwrap();
    assert!(source.contains("const uint8_t bytes_bin_data[6] = {0,1,2,3,4,5};"));
    assert!(source.contains("const size_t bytes_bin_size = 6;"));
    let header = fs::read_to_string(dir.path().join("resources.h")).unwrap();
    assert!(header.contains("extern const uint8_t bytes_bin_data[6];"));
}

#[test]
fn test_collision_fails_without_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.png"), b"1").unwrap();
    fs::write(dir.path().join("a-png"), b"2").unwrap();

    let output = res2src(dir.path(), &["a.png", "a-png"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a_png"), "{stderr}");
    assert!(stderr.contains("a.png") && stderr.contains("a-png"), "{stderr}");
    assert!(!dir.path().join("resources.cpp").exists());
    assert!(!dir.path().join("resources.h").exists());
}

#[test]
fn test_registry_table() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"xx").unwrap();
    fs::write(dir.path().join("y"), b"y").unwrap();

    let output = res2src(dir.path(), &["x", "y", "--array", "RES"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let header = fs::read_to_string(dir.path().join("resources.h")).unwrap();
    assert!(header.contains("extern const resource_t RES[];"));
    assert!(header.contains("extern const size_t RES_SIZE;"));
    let source = fs::read_to_string(dir.path().join("resources.cpp")).unwrap();
    let x = source.find(r#"resource_t("x", x_data, x_size),"#).unwrap();
    let y = source.find(r#"resource_t("y", y_data, y_size),"#).unwrap();
    assert!(x < y);
    assert!(source.contains("const size_t RES_SIZE = 2;"));
}

#[test]
fn test_pairs_and_output_options() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets/logo.png"), b"png").unwrap();

    let output = res2src(
        dir.path(),
        &[
            "--pairs", "logo.png", "logo", "--cd", "assets", "-o", "gen", "-n", "embedded", "-a",
            "ALL", "--sn", "asset_t", "-c", "gzip", "--verify",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = fs::read_to_string(dir.path().join("gen/embedded.cpp")).unwrap();
    assert!(source.starts_with("#include \"embedded.h\""));
    assert!(source.contains(r#"asset_t("logo", logo_data, logo_size),"#));
    assert!(dir.path().join("gen/embedded.h").exists());
}

#[test]
fn test_odd_pairs_are_rejected() {
    let dir = tempdir().unwrap();
    let output = res2src(dir.path(), &["--pairs", "a.bin", "a", "b.bin"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("pairs"));
}

#[test]
fn test_scaled_discovery() {
    let dir = tempdir().unwrap();
    for name in ["icon.png", "icon@2.png", "icon@3.png", "iconic.png"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let output = res2src(dir.path(), &["--scaled", "icon.png", "-a", "ICONS"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = fs::read_to_string(dir.path().join("resources.cpp")).unwrap();
    assert!(source.contains("const size_t ICONS_SIZE = 3;"));
    let positions: Vec<_> = ["\"icon.png\"", "\"icon@2.png\"", "\"icon@3.png\""]
        .iter()
        .map(|n| source.find(n).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!source.contains("iconic"));
}

#[test]
fn test_array_requires_header() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"x").unwrap();
    let output = res2src(dir.path(), &["x", "--no-header", "-a", "RES"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("resources.cpp").exists());
}

#[test]
fn test_unknown_compression_method() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"x").unwrap();
    let output = res2src(dir.path(), &["x", "-c", "lz4"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("resources.cpp").exists());
}

#[test]
fn test_missing_input() {
    let dir = tempdir().unwrap();
    let output = res2src(dir.path(), &["missing.bin"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.bin"));
}

#[test]
fn test_struct_name_must_not_collide() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"x").unwrap();
    let output = res2src(dir.path(), &["x", "-a", "RES", "--sn", "RES"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("RES"));
    assert!(!dir.path().join("resources.h").exists());
}
