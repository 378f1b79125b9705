//! Integration tests for Laminar

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::path::Path;
    use tempfile::TempDir;

    const DESCRIPTOR: &str =
        "[package]\nname = \"app\"\n\n[[bin]]\nname = \"app\"\npath = \"src/main.rs\"\n";

    fn laminar() -> Command {
        cargo_bin_cmd!("laminar")
    }

    /// A project directory with a manifest, a descriptor, and a
    /// pre-created artifact so `true` can stand in for the compiler.
    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(manifest: &str) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("deps.toml"), manifest).unwrap();
            std::fs::write(dir.path().join("build.toml"), DESCRIPTOR).unwrap();
            std::fs::write(dir.path().join("deps.out"), b"layer bytes").unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> String {
            self.dir.path().join(name).display().to_string()
        }

        fn cache_dir(&self) -> String {
            self.dir.path().join("cache").display().to_string()
        }

        fn descriptor_content(&self) -> String {
            std::fs::read_to_string(self.dir.path().join("build.toml")).unwrap()
        }

        /// Build invocation with `true` as the dependency compiler
        fn build_cmd(&self) -> Command {
            self.build_cmd_with(&[])
        }

        /// Build invocation with extra flags placed before the trailing
        /// compiler command (flags after `--` belong to the compiler).
        fn build_cmd_with(&self, extra: &[&str]) -> Command {
            let mut cmd = laminar();
            cmd.args([
                "--config",
                &self.path("no-config.toml"),
                "build",
                "--manifest",
                &self.path("deps.toml"),
                "--descriptor",
                &self.path("build.toml"),
                "--target-kind",
                "binary",
                "--cache-dir",
                &self.cache_dir(),
                "--artifact",
                "deps.out",
            ]);
            cmd.args(extra);
            cmd.args(["--", "true"]);
            cmd
        }
    }

    #[test]
    fn help_displays() {
        laminar()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dependency-Cache Build Orchestrator"));
    }

    #[test]
    fn version_displays() {
        laminar()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("laminar"));
    }

    #[test]
    fn fingerprint_ignores_formatting() {
        let a = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\nlibbar = \"0.4\"\n");
        let b = Project::new("[dependencies]\n\n  libbar = \"0.4\"\n  libfoo   =   \"1.2.0\"\n");

        let out_a = laminar()
            .args(["fingerprint", "--manifest", &a.path("deps.toml")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let out_b = laminar()
            .args(["fingerprint", "--manifest", &b.path("deps.toml")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(out_a, out_b);
        assert_eq!(String::from_utf8(out_a).unwrap().trim().len(), 64);
    }

    #[test]
    fn fingerprint_tracks_version_changes() {
        let a = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");
        let b = Project::new("[dependencies]\nlibfoo = \"1.3.0\"\n");

        let out_a = laminar()
            .args(["fingerprint", "--manifest", &a.path("deps.toml")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let out_b = laminar()
            .args(["fingerprint", "--manifest", &b.path("deps.toml")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_ne!(out_a, out_b);
    }

    #[test]
    fn fingerprint_invalid_manifest_fails() {
        let project = Project::new("[dependencies]\nlibfoo = \"not-a-version\"\n");
        laminar()
            .args(["fingerprint", "--manifest", &project.path("deps.toml")])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid manifest"));
    }

    #[test]
    fn build_populates_cache_and_restores_descriptor() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        project
            .build_cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("built and cached layer"));

        assert_eq!(project.descriptor_content(), DESCRIPTOR);
        assert!(Path::new(&project.cache_dir()).exists());
    }

    #[test]
    fn second_build_reuses_cache() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        project.build_cmd().assert().success();
        project
            .build_cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("reused cached layer"));

        assert_eq!(project.descriptor_content(), DESCRIPTOR);
    }

    #[test]
    fn force_rebuild_recompiles() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        project.build_cmd().assert().success();
        project
            .build_cmd_with(&["--force-rebuild"])
            .assert()
            .success()
            .stdout(predicate::str::contains("reused cached layer").not());
    }

    #[test]
    fn build_missing_unit_reference_fails_cleanly() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        project
            .build_cmd_with(&["--unit", "src/other.rs"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Substitution target"));

        assert_eq!(project.descriptor_content(), DESCRIPTOR);
    }

    #[test]
    fn build_failing_compiler_restores_descriptor() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        let mut cmd = laminar();
        cmd.args([
            "--config",
            &project.path("no-config.toml"),
            "build",
            "--manifest",
            &project.path("deps.toml"),
            "--descriptor",
            &project.path("build.toml"),
            "--target-kind",
            "binary",
            "--cache-dir",
            &project.cache_dir(),
            "--artifact",
            "deps.out",
            "--",
            "false",
        ]);
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Dependency build failed"));

        assert_eq!(project.descriptor_content(), DESCRIPTOR);
    }

    #[test]
    fn build_proc_macro_target_unsupported() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        let mut cmd = laminar();
        cmd.args([
            "--config",
            &project.path("no-config.toml"),
            "build",
            "--manifest",
            &project.path("deps.toml"),
            "--descriptor",
            &project.path("build.toml"),
            "--target-kind",
            "proc-macro",
            "--cache-dir",
            &project.cache_dir(),
            "--artifact",
            "deps.out",
            "--",
            "true",
        ]);
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported target kind"));
    }

    #[test]
    fn cache_list_and_info_and_clear() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");
        project.build_cmd().assert().success();

        let key = String::from_utf8(
            laminar()
                .args(["fingerprint", "--manifest", &project.path("deps.toml")])
                .assert()
                .success()
                .get_output()
                .stdout
                .clone(),
        )
        .unwrap()
        .trim()
        .to_string();

        laminar()
            .args(["cache", "--cache-dir", &project.cache_dir(), "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(&key));

        laminar()
            .args(["cache", "--cache-dir", &project.cache_dir(), "info", &key[..12]])
            .assert()
            .success()
            .stdout(predicate::str::contains("layer.blob"));

        laminar()
            .args(["cache", "--cache-dir", &project.cache_dir(), "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed"));

        laminar()
            .args(["cache", "--cache-dir", &project.cache_dir(), "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(&key).not());
    }

    #[test]
    fn cache_list_empty_store() {
        let dir = TempDir::new().unwrap();
        laminar()
            .args([
                "cache",
                "--cache-dir",
                &dir.path().join("cache").display().to_string(),
                "list",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached dependency layers"));
    }

    #[test]
    #[serial]
    fn cache_dir_from_environment() {
        let project = Project::new("[dependencies]\nlibfoo = \"1.2.0\"\n");

        let mut cmd = laminar();
        cmd.env("LAMINAR_CACHE_DIR", project.cache_dir());
        cmd.args([
            "--config",
            &project.path("no-config.toml"),
            "build",
            "--manifest",
            &project.path("deps.toml"),
            "--descriptor",
            &project.path("build.toml"),
            "--target-kind",
            "binary",
            "--artifact",
            "deps.out",
            "--",
            "true",
        ]);
        cmd.assert().success();

        assert!(Path::new(&project.cache_dir()).exists());
    }

    #[test]
    fn config_path_displays() {
        laminar()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_displays_sections() {
        let dir = TempDir::new().unwrap();
        laminar()
            .args([
                "--config",
                &dir.path().join("missing.toml").display().to_string(),
                "config",
                "show",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"));
    }
}
