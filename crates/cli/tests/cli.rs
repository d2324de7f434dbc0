use assert_cmd::Command;

fn catalog() -> Command {
    let mut cmd = Command::cargo_bin("catalog-cli").unwrap();
    cmd.env("CATALOG_CONFIG_DIR", std::env::temp_dir().join("catalog-cli-no-config"))
        .env_remove("CATALOG_ENV")
        .env_remove("CATALOG_DATABASE__URL");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = catalog().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("migrate"));
    assert!(stdout.contains("serve"));
}

#[test]
fn migrate_against_in_memory_database_succeeds() {
    catalog()
        .args(["--database-url", "sqlite::memory:", "migrate"])
        .assert()
        .success();
}

#[test]
fn unknown_environment_fails_fast() {
    catalog()
        .env("CATALOG_ENV", "qa")
        .args(["--database-url", "sqlite::memory:", "migrate"])
        .assert()
        .failure();
}
