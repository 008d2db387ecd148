use assert_fs::TempDir;
use assert_fs::prelude::*;
use kca_e2e_tests::{
    FakeToolchain, TestRepositoryServer, apache_listing, init_tracing, package_bytes,
};
use kca_lib::cli::{AnalyzeParams, Command, analyze_with, resolve_command};
use kca_lib::error::KcaError;
use kca_lib::fetch::{FetchOutcome, build_http_client};
use kca_lib::listing::{Architecture, MatchPolicy};
use predicates::prelude::*;

const VERSION: &str = "5.4.0-42-generic";
const PACKAGE: &str = "linux-image-5.4.0-42-generic-dbgsym_amd64.ddeb";

fn build_params(
    server: &TestRepositoryServer,
    temp: &TempDir,
    architecture: Architecture,
) -> AnalyzeParams {
    let command = Command {
        architecture,
        kernel_version: VERSION.to_string(),
        directory: temp.child("dest").path().to_string_lossy().into_owned(),
        config_path: None,
        index_url: Some(server.index_url().to_string()),
    };
    let mut params = resolve_command(command).expect("Failed to resolve command");
    params.app_config.output.disassembly_path = temp.child("debug.S").path().to_path_buf();
    params
}

#[tokio::test]
async fn test_single_match_runs_one_full_cycle() {
    init_tracing();

    let content = package_bytes(5000);
    let server = TestRepositoryServer::builder()
        .file(PACKAGE, content.clone())
        .file(
            "linux-image-5.4.0-42-generic-dbgsym_arm64.ddeb",
            package_bytes(10),
        )
        .file(
            "linux-image-5.4.0-48-generic-dbgsym_amd64.ddeb",
            package_bytes(10),
        )
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let params = build_params(&server, &temp, Architecture::Amd64);
    let client = build_http_client(&params.app_config.http).unwrap();
    let tools = FakeToolchain::default();

    let summary = analyze_with(&params, &client, &tools)
        .await
        .expect("Analysis should succeed");

    assert_eq!(summary.packages.len(), 1);
    let package = &summary.packages[0];
    assert_eq!(package.file_name, PACKAGE);
    assert_eq!(
        package.fetch,
        FetchOutcome::Downloaded {
            resumed_from: 0,
            bytes_written: 5000
        }
    );

    assert_eq!(
        tools.calls(),
        vec![
            format!("ar x {PACKAGE} data.tar.xz"),
            format!("tar -xJf data.tar.xz usr/lib/debug/boot/vmlinux-{VERSION}"),
            format!("objdump -l -D vmlinux-{VERSION}"),
        ]
    );

    let dest = temp.child("dest");
    dest.child(PACKAGE).assert(predicate::path::is_file());
    assert_eq!(std::fs::read(dest.child(PACKAGE).path()).unwrap(), content);
    dest.child(format!("usr/lib/debug/boot/vmlinux-{VERSION}"))
        .assert(predicate::path::is_file());
    dest.child("data.tar.xz").assert(predicate::path::missing());
    temp.child("debug.S")
        .assert(predicate::str::contains("file format elf64-x86-64"));

    let requests = server.requests();
    assert_eq!(requests.len(), 2, "{requests:?}");
    assert!(requests.iter().all(|request| request.file == PACKAGE));
    assert_eq!(server.body_requests().len(), 1);
}

#[tokio::test]
async fn test_missing_architecture_reports_not_found_without_writes() {
    init_tracing();

    let server = TestRepositoryServer::builder()
        .file(PACKAGE, package_bytes(100))
        .file("linux-image-5.4.0-42-generic-dbgsym_i386.ddeb", package_bytes(100))
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let params = build_params(&server, &temp, Architecture::Arm64);
    let client = build_http_client(&params.app_config.http).unwrap();
    let tools = FakeToolchain::default();

    let result = analyze_with(&params, &client, &tools).await;

    assert!(
        matches!(
            result,
            Err(KcaError::KernelNotFound {
                architecture: Architecture::Arm64,
                ..
            })
        ),
        "{result:?}"
    );
    assert_eq!(result.unwrap_err().quiet_exit_status(), Some(2));
    assert!(server.requests().is_empty());
    assert!(tools.calls().is_empty());
    temp.child("dest").assert(predicate::path::missing());
    temp.child("debug.S").assert(predicate::path::missing());
}

#[tokio::test]
async fn test_every_match_runs_a_full_cycle_in_listing_order() {
    init_tracing();

    let unsigned = "linux-image-unsigned-5.4.0-42-generic-dbgsym_amd64.ddeb";
    // Reverse alphabetical order, so listing order is observable.
    let listing = apache_listing([
        unsigned,
        "linux-image-5.4.0-42-generic-dbgsym_arm64.ddeb",
        PACKAGE,
    ]);
    let server = TestRepositoryServer::builder()
        .file(PACKAGE, package_bytes(700))
        .file(unsigned, package_bytes(300))
        .listing(listing)
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let params = build_params(&server, &temp, Architecture::Amd64);
    let client = build_http_client(&params.app_config.http).unwrap();
    let tools = FakeToolchain::default();

    let summary = analyze_with(&params, &client, &tools)
        .await
        .expect("Analysis should succeed");

    let processed: Vec<&str> = summary
        .packages
        .iter()
        .map(|package| package.file_name.as_str())
        .collect();
    assert_eq!(processed, vec![unsigned, PACKAGE]);

    let unpack_and_dump = |package: &str| {
        vec![
            format!("ar x {package} data.tar.xz"),
            format!("tar -xJf data.tar.xz usr/lib/debug/boot/vmlinux-{VERSION}"),
            format!("objdump -l -D vmlinux-{VERSION}"),
        ]
    };
    assert_eq!(
        tools.calls(),
        [unpack_and_dump(unsigned), unpack_and_dump(PACKAGE)].concat()
    );

    let files: Vec<String> = server
        .requests()
        .into_iter()
        .map(|request| request.file)
        .collect();
    assert_eq!(files, vec![unsigned, unsigned, PACKAGE, PACKAGE]);
    assert_eq!(summary.disassembly_path, temp.child("debug.S").path());
    temp.child("debug.S").assert(predicate::path::is_file());
}

#[tokio::test]
async fn test_empty_package_is_still_downloaded() {
    init_tracing();

    let server = TestRepositoryServer::builder()
        .file(PACKAGE, Vec::new())
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let params = build_params(&server, &temp, Architecture::Amd64);
    let client = build_http_client(&params.app_config.http).unwrap();

    let summary = analyze_with(&params, &client, &FakeToolchain::default())
        .await
        .expect("Analysis should succeed");

    assert_eq!(
        summary.packages[0].fetch,
        FetchOutcome::Downloaded {
            resumed_from: 0,
            bytes_written: 0
        }
    );
    assert_eq!(server.body_requests().len(), 1);
    temp.child("dest")
        .child(PACKAGE)
        .assert(predicate::path::is_file());
}

#[tokio::test]
async fn test_stop_at_first_miss_policy_gives_up_early() {
    init_tracing();

    let listing = apache_listing([
        "linux-image-5.4.0-40-generic-dbgsym_amd64.ddeb",
        PACKAGE,
    ]);
    let server = TestRepositoryServer::builder()
        .file(PACKAGE, package_bytes(100))
        .listing(listing)
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let client = build_http_client(&Default::default()).unwrap();

    let mut legacy = build_params(&server, &temp, Architecture::Amd64);
    legacy.app_config.match_policy = MatchPolicy::StopAtFirstMiss;
    let result = analyze_with(&legacy, &client, &FakeToolchain::default()).await;
    assert!(matches!(result, Err(KcaError::KernelNotFound { .. })), "{result:?}");
    assert!(server.requests().is_empty());

    let scan_all = build_params(&server, &temp, Architecture::Amd64);
    let summary = analyze_with(&scan_all, &client, &FakeToolchain::default())
        .await
        .expect("Scan-all policy should find the package");
    assert_eq!(summary.packages.len(), 1);
}

#[tokio::test]
async fn test_second_run_reuses_downloaded_package() {
    init_tracing();

    let server = TestRepositoryServer::builder()
        .file(PACKAGE, package_bytes(3000))
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let params = build_params(&server, &temp, Architecture::Amd64);
    let client = build_http_client(&params.app_config.http).unwrap();

    analyze_with(&params, &client, &FakeToolchain::default())
        .await
        .expect("First run should succeed");
    let summary = analyze_with(&params, &client, &FakeToolchain::default())
        .await
        .expect("Second run should succeed");

    assert_eq!(summary.packages[0].fetch, FetchOutcome::AlreadyComplete);
    assert_eq!(server.body_requests().len(), 1);
}

#[tokio::test]
async fn test_config_file_supplies_index_and_output() {
    init_tracing();

    let server = TestRepositoryServer::builder()
        .file(PACKAGE, package_bytes(64))
        .spawn()
        .await;
    let temp = TempDir::new().unwrap();
    let output = temp.child("vmlinux.S");
    let config_file = temp.child("kca.json");
    config_file
        .write_str(
            &serde_json::json!({
                "index_url": server.index_url().as_str(),
                "output": { "disassembly_path": output.path() },
            })
            .to_string(),
        )
        .unwrap();

    let params = resolve_command(Command {
        architecture: Architecture::Amd64,
        kernel_version: VERSION.to_string(),
        directory: temp.child("dest").path().to_string_lossy().into_owned(),
        config_path: Some(config_file.path().to_string_lossy().into_owned()),
        index_url: None,
    })
    .expect("Config should resolve");
    let client = build_http_client(&params.app_config.http).unwrap();

    let summary = analyze_with(&params, &client, &FakeToolchain::default())
        .await
        .expect("Analysis should succeed");

    assert_eq!(summary.disassembly_path, output.path());
    output.assert(predicate::path::is_file());
}

#[tokio::test]
async fn test_unreachable_listing_is_fatal() {
    init_tracing();

    let server = TestRepositoryServer::builder().spawn().await;
    let temp = TempDir::new().unwrap();
    let mut params = build_params(&server, &temp, Architecture::Amd64);
    params.app_config.index_url = server.index_url().join("../missing/").unwrap();
    let client = build_http_client(&params.app_config.http).unwrap();

    let result = analyze_with(&params, &client, &FakeToolchain::default()).await;
    assert!(matches!(result, Err(KcaError::Listing(_))), "{result:?}");
}
