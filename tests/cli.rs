use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn rocketdoo(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rocketdoo").unwrap();
    cmd.arg("--project-dir").arg(dir).env_remove("ROCKETDOO_LOG");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "project_name: acme\nodoo_version: '17.0'\nedition: ee\n").unwrap();
    rocketdoo(dir.path())
        .arg("init")
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next steps"))
        .stderr(predicate::str::contains("No 'enterprise/' folder found"));
    dir
}

fn conf(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("config/odoo.conf")).unwrap()
}

#[test]
fn version_flag() {
    Command::cargo_bin("rocketdoo")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rocketdoo "));
}

#[test]
fn init_from_answers_file_writes_environment() {
    let dir = initialized();
    for file in [
        "Dockerfile",
        "docker-compose.yaml",
        "config/odoo.conf",
        "odoo_pg_pass",
        ".vscode/launch.json",
        "gitman.yml",
        "rocketdoo.yml",
    ] {
        assert!(dir.path().join(file).is_file(), "missing {}", file);
    }
    assert!(!dir.path().join("bin").exists());
    let dockerfile = fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
    assert!(dockerfile.contains("\nFROM odoo:17.0\n"));
    assert!(dockerfile.contains("COPY --from=rocketdoo "));
    assert!(conf(&dir).contains("/usr/lib/python3/dist-packages/odoo/enterprise,"));
}

#[test]
fn render_is_byte_identical() {
    let dir = initialized();
    let before = fs::read(dir.path().join("docker-compose.yaml")).unwrap();
    rocketdoo(dir.path()).arg("render").assert().success();
    let after = fs::read(dir.path().join("docker-compose.yaml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn info_json_masks_secrets() {
    let dir = initialized();
    let output = rocketdoo(dir.path()).args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["answers"]["project_name"], "acme");
    assert_eq!(info["answers"]["db_password"], "********");
}

#[test]
fn info_requires_init() {
    let dir = TempDir::new().unwrap();
    rocketdoo(dir.path())
        .arg("info")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("rocketdoo init"));
}

#[test]
fn deps_add_duplicate_and_remove() {
    let dir = initialized();
    rocketdoo(dir.path())
        .args(["deps", "add", "https://github.com/OCA/web.git", "--rev", "17.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added web"));
    assert!(conf(&dir).contains("external_addons/web"));

    let manifest_before = fs::read_to_string(dir.path().join("gitman.yml")).unwrap();
    rocketdoo(dir.path())
        .args(["deps", "add", "https://github.com/fork/web.git", "--rev", "17.0", "--target", "web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already declared"));
    assert_eq!(fs::read_to_string(dir.path().join("gitman.yml")).unwrap(), manifest_before);

    rocketdoo(dir.path())
        .args(["deps", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/OCA/web.git"));

    rocketdoo(dir.path()).args(["deps", "remove", "web"]).assert().success();
    assert!(!conf(&dir).contains("external_addons/web"));
    assert_eq!(conf(&dir).matches("addons_path").count(), 1);
}

#[test]
fn deps_add_rejects_floating_revision() {
    let dir = initialized();
    rocketdoo(dir.path())
        .args(["deps", "add", "https://github.com/OCA/web.git", "--rev", "latest"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("floating revision"));
}

#[test]
fn deps_apply_with_empty_manifest() {
    let dir = initialized();
    rocketdoo(dir.path())
        .args(["deps", "apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependencies declared."));
}

#[test]
fn install_deps_skips_without_requirements() {
    let dir = TempDir::new().unwrap();
    rocketdoo(dir.path())
        .args(["install-deps", "--system-packages", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
}

#[cfg(unix)]
#[test]
fn install_deps_failure_follows_force() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("requirements.txt"), "doesnotexist==0.0.0\n").unwrap();

    rocketdoo(dir.path())
        .args(["install-deps", "--system-packages", "never", "--pip", "false"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"))
        .stderr(predicate::str::contains("--force"));

    rocketdoo(dir.path())
        .args(["install-deps", "--system-packages", "never", "--pip", "false", "--force"])
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn generated_files_are_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = initialized();
    for file in ["config/odoo.conf", "odoo_pg_pass", "docker-compose.yaml", "Dockerfile"] {
        let mode = fs::metadata(dir.path().join(file)).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644, "{}", file);
    }
}

#[test]
fn up_requires_compose_file() {
    let dir = TempDir::new().unwrap();
    rocketdoo(dir.path())
        .args(["up", "-d"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("docker-compose.yaml"));
}
