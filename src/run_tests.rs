//! Tests for the run module.

use super::*;
use periphgen::config::Cli;
use periphgen::emit::{BUILD_FLAGS_FILE, PLAN_FILE, SETUP_FILE};

const DOCUMENT: &str = r#"
[target]
platform = "esp32"

[[climate]]
platform = "daikin_312"
id = "ac"
pin = "GPIO4"
"#;

fn settings(args: &[&str], document: &Document) -> Settings {
    let cli = Cli::parse_from_iter(std::iter::once("periphgen").chain(args.iter().copied()));
    Settings::from_raw(&cli, document).unwrap()
}

mod run_error {
    use super::*;

    #[test]
    fn config_error_displays_transparently() {
        let error = RunError::from(ConfigError::missing("target", "Use --target"));
        assert_eq!(error.to_string(), "Missing required setting: target. Use --target");
    }

    #[test]
    fn render_error_displays_path() {
        let error = RunError::from(RenderError::Write {
            path: PathBuf::from("build/setup.cpp"),
            source: std::io::Error::other("disk full"),
        });
        assert!(error.to_string().contains("build/setup.cpp"));
    }
}

mod modes {
    use super::*;

    #[test]
    fn check_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let document = Document::parse(DOCUMENT).unwrap();
        let out_dir = dir.path().join("out");
        let settings = settings(&["-o", out_dir.to_str().unwrap()], &document);

        let mut out = Vec::new();
        let outcome = execute(&settings, &document, true, &mut out).unwrap();

        assert!(matches!(outcome, Outcome::Checked { operations, flags: 3 } if operations > 0));
        assert!(out.is_empty());
        assert!(!out_dir.exists());
    }

    #[test]
    fn dry_run_prints_every_artifact() {
        let document = Document::parse(DOCUMENT).unwrap();
        let settings = settings(&["--dry-run"], &document);

        let mut out = Vec::new();
        let outcome = execute(&settings, &document, false, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();

        assert_eq!(outcome, Outcome::Printed);
        assert!(printed.contains(&format!("==> {SETUP_FILE} <==")));
        assert!(printed.contains(&format!("==> {BUILD_FLAGS_FILE} <==")));
        assert!(printed.contains("auto *ac = new daikin_312::Daikin312Climate();"));
    }

    #[test]
    fn build_writes_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let document = Document::parse(DOCUMENT).unwrap();
        let settings = settings(
            &["-o", dir.path().to_str().unwrap(), "--format", "json"],
            &document,
        );

        let mut out = Vec::new();
        let outcome = execute(&settings, &document, false, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Written(vec![dir.path().join(PLAN_FILE)]));
        assert!(dir.path().join(PLAN_FILE).exists());
    }

    #[test]
    fn resolution_failure_is_a_config_error() {
        let document = Document::parse(&format!("{DOCUMENT}sensor = \"missing\"\n")).unwrap();
        let settings = settings(&[], &document);

        let mut out = Vec::new();
        let err = execute(&settings, &document, false, &mut out).unwrap_err();

        assert!(matches!(err, RunError::Config(ConfigError::UnresolvedReference { .. })));
    }
}
