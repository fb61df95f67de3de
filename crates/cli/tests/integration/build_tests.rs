//! Build command integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn single_target_produces_exactly_three_artifacts() {
  let env = TestEnv::succeeding();

  env
    .exbuild_cmd()
    .args(["build", "--target", "core_basic_window"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 1 target in 3 passes"));

  assert_eq!(
    env.produced_files(),
    vec![
      "build/core_basic_window",
      "wasm/core_basic_window.native.wasm",
      "wasm/core_basic_window.wasm",
    ]
  );
}

#[test]
fn build_is_the_default_command() {
  let env = TestEnv::succeeding();

  env.exbuild_cmd().assert().success();

  assert_eq!(env.invocations().len(), 27);
  assert_eq!(env.produced_files().len(), 27);
}

#[test]
fn invocations_follow_pass_then_registration_order() {
  let env = TestEnv::succeeding();

  env
    .exbuild_cmd()
    .args(["build", "--target", "tsoding_ball", "--target", "core_input_keys"])
    .assert()
    .success();

  let calls = env.invocations();
  assert_eq!(calls.len(), 6);
  assert!(calls[0].contains("-o ./build/core_input_keys"));
  assert!(calls[1].contains("-o ./build/tsoding_ball"));
  assert!(calls[2].ends_with("-DPLATFORM_WEB"));
  assert!(calls[4].contains("-o ./wasm/core_input_keys.native.wasm"));
  assert!(!calls[5].contains("-DPLATFORM_WEB"));
}

#[test]
fn failing_toolchain_stops_at_first_invocation() {
  let env = TestEnv::failing();

  env
    .exbuild_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("native build of core_basic_window failed"));

  let calls = env.invocations();
  assert_eq!(calls.len(), 1);
  assert!(!calls[0].contains("--target=wasm32"));
  assert!(env.produced_files().is_empty());
}

#[test]
fn output_directories_may_already_exist() {
  let env = TestEnv::succeeding();
  std::fs::create_dir_all(env.root().join("build")).unwrap();
  std::fs::create_dir_all(env.root().join("wasm")).unwrap();

  env
    .exbuild_cmd()
    .args(["build", "--pass", "native"])
    .assert()
    .success();

  assert_eq!(env.invocations().len(), 9);
}

#[test]
fn file_in_place_of_output_directory_fails_before_compiling() {
  let env = TestEnv::succeeding();
  std::fs::write(env.root().join("wasm"), "").unwrap();

  env
    .exbuild_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a directory"));

  assert!(env.invocations().is_empty());
}

#[test]
fn dry_run_spawns_nothing() {
  let env = TestEnv::succeeding();

  env
    .exbuild_cmd()
    .args(["build", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Would run 27 commands"));

  assert!(env.invocations().is_empty());
  assert!(!env.root().join("build").exists());
}

#[test]
fn unknown_target_is_rejected() {
  let env = TestEnv::succeeding();

  env
    .exbuild_cmd()
    .args(["build", "--target", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown target: nope"));

  assert!(env.invocations().is_empty());
}

#[test]
fn relative_compiler_resolves_against_invoking_directory() {
  let env = TestEnv::succeeding();

  cargo_bin_cmd!("exbuild")
    .current_dir(env.temp.path())
    .args(["--no-rebuild", "--cc", "./stub-cc", "--root"])
    .arg(env.root())
    .args(["build", "--target", "core_basic_window", "--pass", "native"])
    .env_remove("RUST_LOG")
    .assert()
    .success();

  assert_eq!(env.invocations().len(), 1);
  assert_eq!(env.produced_files(), vec!["build/core_basic_window"]);
}
