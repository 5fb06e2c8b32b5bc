//! Integration tests for buildcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn buildcache() -> Command {
        cargo_bin_cmd!("buildcache")
    }

    #[test]
    fn help_displays() {
        buildcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Remote build artifact cache"));
    }

    #[test]
    fn version_displays() {
        buildcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildcache"));
    }

    #[test]
    fn unknown_step_is_rejected() {
        buildcache()
            .args(["context", "compile"])
            .assert()
            .failure();
    }
}

mod build_step_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use url::Url;

    /// A project with a commit marker file, a `file://` cache and a config
    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(commit: &str, config: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("src")).unwrap();
            fs::create_dir_all(dir.path().join("cache")).unwrap();
            fs::write(dir.path().join("src/arc.rc"), commit).unwrap();

            let cache_url = Url::from_directory_path(dir.path().join("cache")).unwrap();
            let config = config.replace("CACHE_URL", cache_url.as_str());
            fs::write(dir.path().join("config.toml"), config).unwrap();

            Self { dir }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        fn publish(&self, commit: &str, target: &str) {
            let artifact = self.path(&format!("cache/file/{}/{}", commit, target));
            fs::create_dir_all(artifact.parent().unwrap()).unwrap();
            fs::write(&artifact, format!("{} archive", target)).unwrap();
            let marker = self.path(&format!("cache/marker/{}", commit));
            fs::create_dir_all(marker.parent().unwrap()).unwrap();
            fs::write(marker, "").unwrap();
        }

        fn command(&self, args: &[&str]) -> Command {
            let mut cmd = cargo_bin_cmd!("buildcache");
            cmd.env_clear()
                .env("HOME", self.dir.path())
                .args(["--no-local", "--config"])
                .arg(self.path("config.toml"))
                .args(args);
            cmd
        }

        fn prebuild(&self, target: &str) -> Command {
            let mut cmd = self.command(&["prebuild"]);
            cmd.env("TARGET_NAME", target)
                .env("TARGET_TEMP_DIR", self.path(&format!("{}.build", target)))
                .env("BUILT_PRODUCTS_DIR", self.path("Products"))
                .env("SRCROOT", self.path("src"));
            cmd
        }

        fn postbuild_env(&self, cmd: &mut Command, target: &str) {
            let temp_dir = self.path(&format!("{}.build", target));
            cmd.env("TARGET_NAME", target)
                .env("TARGET_TEMP_DIR", &temp_dir)
                .env("PLATFORM_PREFERRED_ARCH", "arm64")
                .env("OBJECT_FILE_DIR_normal", temp_dir.join("Objects-normal"))
                .env("CONFIGURATION", "Debug")
                .env("PLATFORM_NAME", "iphonesimulator")
                .env("XCODE_PRODUCT_BUILD_VERSION", "15A240d")
                .env("TARGET_BUILD_DIR", self.path("Products"))
                .env("EXECUTABLE_PATH", format!("lib{}.a", target))
                .env("SRCROOT", self.path("src"))
                .env("DEVELOPER_DIR", "/Applications/Xcode.app/Contents/Developer")
                .env("MACH_O_TYPE", "staticlib")
                .env("DWARF_DSYM_FILE_SHOULD_ACCOMPANY_PRODUCT", "NO")
                .env("DWARF_DSYM_FOLDER_PATH", self.path("Products"))
                .env("DWARF_DSYM_FILE_NAME", format!("{}.dSYM", target))
                .env("BUILT_PRODUCTS_DIR", self.path("Products"))
                .env("DERIVED_SOURCES_DIR", temp_dir.join("DerivedSources"))
                .env("ACTION", "build");
        }
    }

    const CONSUMER: &str = r#"
[cache]
recommended_cache_address = "CACHE_URL"
"#;

    const PRODUCER: &str = r#"
[cache]
mode = "producer"
recommended_cache_address = "CACHE_URL"
cache_addresses = ["CACHE_URL"]
"#;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn prebuild_requires_build_environment() {
        let project = Project::new("abc", CONSUMER);
        project
            .command(&["prebuild"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("TARGET_TEMP_DIR"));
    }

    #[test]
    fn prebuild_rejects_invalid_address() {
        let project = Project::new("abc", "[cache]\nrecommended_cache_address = \"not a url\"\n");
        project
            .prebuild("Core")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a url"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn prebuild_rejects_unsupported_scheme() {
        let project = Project::new(
            "abc",
            "[cache]\nrecommended_cache_address = \"https://cache.example.com\"\n",
        );
        project.prebuild("Core").assert().failure();
    }

    #[test]
    fn prebuild_without_commit_ignores_address_scheme() {
        let project = Project::new(
            "",
            "[cache]\nrecommended_cache_address = \"https://cache.example.com\"\n",
        );
        project
            .prebuild("Core")
            .assert()
            .success()
            .stdout(predicate::str::contains("locally"));
    }

    #[test]
    fn prebuild_downloads_published_artifact() {
        let project = Project::new("abc", CONSUMER);
        project.publish("abc", "Core");

        project
            .prebuild("Core")
            .assert()
            .success()
            .stdout(predicate::str::contains("from remote cache"));

        assert_eq!(
            read(&project.path("Core.build/buildcache/abc/Core")),
            "Core archive"
        );
        assert_eq!(read(&project.path("Core.build/buildcache/rc.enabled")), "abc");
    }

    #[test]
    fn prebuild_without_marker_compiles_locally() {
        let project = Project::new("abc", CONSUMER);

        project
            .prebuild("Core")
            .assert()
            .success()
            .stdout(predicate::str::contains("locally"));

        assert!(!project.path("Core.build/buildcache/rc.enabled").exists());
    }

    #[test]
    fn prebuild_focused_elsewhere_fails_without_cache() {
        let project = Project::new(
            "",
            &format!("{}\n[targets]\nfocused_targets = [\"App\"]\n", CONSUMER),
        );

        project
            .prebuild("Core")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Core"));
    }

    #[test]
    fn thinned_targets_are_downloaded_on_remote_decision() {
        let project = Project::new("abc", CONSUMER);
        project.publish("abc", "Aggregate");
        project.publish("abc", "Core");
        project.publish("abc", "UI");

        project
            .prebuild("Aggregate")
            .env("SPT_XCREMOTE_CACHE_THINNED_TARGETS", "Core,UI")
            .assert()
            .success();

        assert!(project.path("Aggregate.build/buildcache/abc/Core").is_file());
        assert!(project.path("Aggregate.build/buildcache/abc/UI").is_file());
    }

    #[test]
    fn thinning_without_remote_commit_terminates() {
        let project = Project::new("", CONSUMER);

        project
            .prebuild("Aggregate")
            .env("SPT_XCREMOTE_CACHE_THINNED_TARGETS", "Core,UI")
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "plugin has never been run, thinning cannot be supported",
            ));
    }

    #[test]
    fn thinning_failure_reports_cause_and_hint() {
        let project = Project::new(
            "",
            &format!("{}\n[targets]\nfocused_targets = [\"App\"]\n", CONSUMER),
        );

        project
            .prebuild("Aggregate")
            .env("SPT_XCREMOTE_CACHE_THINNED_TARGETS", "Core,UI")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Target Aggregate must use the remote cache"))
            .stderr(predicate::str::contains("targets.focused_targets"))
            .stderr(predicate::str::contains("plugin has never been run"));
    }

    #[test]
    fn context_prebuild_prints_json() {
        let project = Project::new("abc", CONSUMER);
        let mut cmd = project.command(&["context", "prebuild"]);
        cmd.env("TARGET_NAME", "Core")
            .env("TARGET_TEMP_DIR", project.path("Core.build"))
            .env("BUILT_PRODUCTS_DIR", project.path("Products"))
            .env("SRCROOT", project.path("src"))
            .env("SPT_XCREMOTE_CACHE_THINNED_TARGETS", "");

        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"target_name\": \"Core\""))
            .stdout(predicate::str::contains("\"commit\": \"abc\""))
            .stdout(predicate::str::contains("\"thinned_targets\": []"));
    }

    #[test]
    fn context_postbuild_prints_json() {
        let project = Project::new("abc", PRODUCER);
        let mut cmd = project.command(&["context", "postbuild"]);
        project.postbuild_env(&mut cmd, "Core");

        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"mode\": \"producer\""))
            .stdout(predicate::str::contains("\"thinned_targets\": []"));
    }

    #[test]
    fn postbuild_publishes_product() {
        let project = Project::new("abc", PRODUCER);
        fs::create_dir_all(project.path("Products")).unwrap();
        fs::write(project.path("Products/libCore.a"), "compiled").unwrap();

        let mut cmd = project.command(&["postbuild"]);
        project.postbuild_env(&mut cmd, "Core");
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("Published"));

        assert_eq!(read(&project.path("cache/file/abc/Core")), "compiled");
        assert!(!project.path("cache/marker/abc").exists());
    }

    #[test]
    fn commit_is_ready_only_after_mark() {
        let project = Project::new("abc", PRODUCER);
        fs::create_dir_all(project.path("Products")).unwrap();
        fs::write(project.path("Products/libCore.a"), "compiled").unwrap();

        let mut cmd = project.command(&["postbuild"]);
        project.postbuild_env(&mut cmd, "Core");
        cmd.assert().success();

        // UI is not uploaded yet: its consumer must not see a ready commit
        project
            .prebuild("UI")
            .assert()
            .success()
            .stdout(predicate::str::contains("locally"));

        project
            .command(&["mark"])
            .env("SRCROOT", project.path("src"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Marked"));
        assert!(project.path("cache/marker/abc").is_file());

        project
            .prebuild("Core")
            .assert()
            .success()
            .stdout(predicate::str::contains("from remote cache"));
    }

    #[test]
    fn mark_in_consumer_mode_does_nothing() {
        let project = Project::new("abc", CONSUMER);
        project
            .command(&["mark"])
            .env("SRCROOT", project.path("src"))
            .assert()
            .success();

        assert!(!project.path("cache/marker/abc").exists());
    }

    #[test]
    fn postbuild_consumer_publishes_nothing() {
        let project = Project::new("abc", CONSUMER);
        let mut cmd = project.command(&["postbuild"]);
        project.postbuild_env(&mut cmd, "Core");

        cmd.assert().success();

        assert!(!project.path("cache/marker/abc").exists());
    }

    #[test]
    fn config_show_merges_file() {
        let project = Project::new("abc", PRODUCER);
        project
            .command(&["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mode = \"producer\""))
            .stdout(predicate::str::contains("request_timeout_secs = 20"));
    }

    #[test]
    fn config_path_prints_override() {
        let project = Project::new("abc", CONSUMER);
        project
            .command(&["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }
}
