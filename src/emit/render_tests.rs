//! Tests for artifact rendering and writing.

use super::*;
use crate::config::{Document, defaults};
use crate::pipeline::{ResolveOptions, resolve};

fn plan(toml_str: &str, target: Platform) -> BuildPlan {
    let options = ResolveOptions {
        target,
        ir_library: defaults::ir_library().unwrap(),
    };
    resolve(&Document::parse(toml_str).unwrap(), &options).unwrap()
}

const CLIMATE_AND_DEBUG: &str = r#"
[[climate]]
platform = "daikin_312"
id = "ac"
name = "Living \"Room\" AC"
pin = "GPIO4"

[[climate.on_turn_off]]
then = [{ "logger.log" = "off" }, { delay = "2s" }]

[irremote_debug]
pin = "GPIO14"
"#;

mod setup {
    use super::*;

    #[test]
    fn renders_every_statement_in_order() {
        let plan = plan(CLIMATE_AND_DEBUG, Platform::Esp32);
        let setup = render_setup(&plan).unwrap();

        assert!(setup.starts_with("// Generated by periphgen for esp32. Do not edit."));
        assert!(setup.contains("void setup_peripherals() {"));

        let mut last = 0;
        for statement in plan.statements() {
            let found = setup[last..]
                .find(&statement)
                .unwrap_or_else(|| panic!("missing or out of order: {statement}"));
            last += found + statement.len();
        }
    }

    #[test]
    fn statements_are_not_html_escaped() {
        let setup = render_setup(&plan(CLIMATE_AND_DEBUG, Platform::Esp32)).unwrap();

        assert!(setup.contains(r#"ac->set_name("Living \"Room\" AC");"#));
        assert!(setup.contains("auto *ac = new daikin_312::Daikin312Climate();"));
        assert!(!setup.contains("&quot;"));
        assert!(!setup.contains("&lt;"));
    }

    #[test]
    fn lists_build_flags_as_comments() {
        let setup = render_setup(&plan(CLIMATE_AND_DEBUG, Platform::Esp32)).unwrap();
        assert!(setup.contains("//   -D_IR_ENABLE_DEFAULT_=true"));
    }

    #[test]
    fn omits_flag_block_without_flags() {
        let setup = render_setup(&plan("", Platform::Esp32)).unwrap();
        assert!(!setup.contains("// Build flags:"));
    }

    #[test]
    fn lists_libraries_as_comments() {
        let setup = render_setup(&plan(CLIMATE_AND_DEBUG, Platform::Esp32)).unwrap();
        let block = setup.find("// Libraries:").unwrap();
        let entry = setup
            .find("//   IRremoteESP8266=https://github.com/carl09/IRremoteESP8266.git#daikin_312")
            .unwrap();
        assert!(block < entry);
        assert!(entry < setup.find("void setup_peripherals()").unwrap());
    }

    #[test]
    fn omits_library_block_without_libraries() {
        let setup = render_setup(&plan("", Platform::Esp32)).unwrap();
        assert!(!setup.contains("// Libraries:"));
    }

    #[test]
    fn renders_automation_actions() {
        let setup = render_setup(&plan(CLIMATE_AND_DEBUG, Platform::Esp32)).unwrap();

        assert!(setup.contains(
            "auto *daikin312turnofftrigger_0_automation = new Automation<>(daikin312turnofftrigger_0);"
        ));
        assert!(setup.contains("new DelayAction<>(2000)"));
    }
}

mod build_flags {
    use super::*;

    #[test]
    fn one_define_per_line_then_library() {
        let text = render_build_flags(&plan(CLIMATE_AND_DEBUG, Platform::Esp32));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "; Generated by periphgen for esp32. Do not edit.");
        assert_eq!(lines[1], "build_flags =");
        assert_eq!(
            &lines[2..5],
            &[
                "    -DDECODE_DAIKIN312=true",
                "    -DSEND_DAIKIN312=true",
                "    -D_IR_ENABLE_DEFAULT_=true",
            ]
        );
        assert_eq!(lines[5], "lib_deps =");
        assert_eq!(
            lines[6],
            "    IRremoteESP8266=https://github.com/carl09/IRremoteESP8266.git#daikin_312"
        );
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn serial_override_is_noted_on_esp8266() {
        let text = render_build_flags(&plan(CLIMATE_AND_DEBUG, Platform::Esp8266));
        assert!(text.lines().nth(1).unwrap().starts_with("; IR library keeps the UART enabled"));
    }

    #[test]
    fn no_library_section_without_libraries() {
        let text = render_build_flags(&plan("", Platform::Esp32));
        assert!(!text.contains("lib_deps"));
    }
}

mod json {
    use super::*;

    #[test]
    fn plan_serializes_with_tagged_operations() {
        let text = render_json(&plan(CLIMATE_AND_DEBUG, Platform::Esp32)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["target"], "esp32");
        assert_eq!(value["operations"][0]["op"], "construct");
        assert_eq!(value["operations"][0]["id"], "ac");
        assert_eq!(value["serial_override"], false);
        assert_eq!(value["libraries"][0]["reference"], "daikin_312");
        assert_eq!(value["triggers"][0]["event"], "on_turn_off");
        assert_eq!(value["triggers"][0]["actions"][1]["action"], "delay");
        assert_eq!(value["triggers"][0]["actions"][1]["millis"], 2000);
    }
}

mod writing {
    use super::*;

    #[test]
    fn cpp_format_writes_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("build");
        let plan = plan(CLIMATE_AND_DEBUG, Platform::Esp32);

        let written = write_plan(&plan, &out, OutputFormat::Cpp).unwrap();

        assert_eq!(written, vec![out.join(SETUP_FILE), out.join(BUILD_FLAGS_FILE)]);
        assert_eq!(
            std::fs::read_to_string(out.join(SETUP_FILE)).unwrap(),
            render_setup(&plan).unwrap()
        );
        assert_eq!(
            std::fs::read_to_string(out.join(BUILD_FLAGS_FILE)).unwrap(),
            render_build_flags(&plan)
        );
    }

    #[test]
    fn json_format_writes_plan_only() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(CLIMATE_AND_DEBUG, Platform::Esp32);

        let written = write_plan(&plan, dir.path(), OutputFormat::Json).unwrap();

        assert_eq!(written, vec![dir.path().join(PLAN_FILE)]);
        assert!(!dir.path().join(SETUP_FILE).exists());
    }

    #[test]
    fn existing_artifact_is_replaced_and_no_temp_file_remains() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLAN_FILE), "stale").unwrap();
        let plan = plan(CLIMATE_AND_DEBUG, Platform::Esp32);

        write_plan(&plan, dir.path(), OutputFormat::Json).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![PLAN_FILE.to_string()]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(PLAN_FILE)).unwrap(),
            render_json(&plan).unwrap()
        );
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let err = write_plan(&plan("", Platform::Esp32), &blocker, OutputFormat::Json).unwrap_err();
        assert!(matches!(err, RenderError::Write { ref path, .. } if *path == blocker));
    }
}
