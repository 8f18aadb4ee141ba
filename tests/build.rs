//! Integration tests for the `build` command.
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use uc_reserve::cli::{BuildOpts, handle_build_command};
use uc_reserve::settings::Settings;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `build` command.
#[test]
fn test_handle_build_command() {
    unsafe { std::env::set_var("UC_RESERVE_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        let opts = BuildOpts {
            output_dir: Some(output_dir.clone()),
            overwrite: false,
        };
        handle_build_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

        let constraints =
            fs::read_to_string(output_dir.join("reserve_constraints.csv")).unwrap();
        assert_eq!(constraints.lines().count(), 1 + 4);
        assert!(output_dir.join("variables.csv").is_file());
        assert!(output_dir.join("uc_reserve_info.log").is_file());
    }

    // Second time will fail because the logging is already initialised
    let tempdir = tempdir().unwrap();
    let opts = BuildOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
    };
    assert_eq!(
        handle_build_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
