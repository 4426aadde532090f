//! Tests for the climate controller schema.

use super::*;
use crate::build_context::LibraryDeclaration;
use crate::component::Action;
use crate::target::Platform;

fn entry(toml_str: &str) -> toml::Value {
    toml::from_str(toml_str).unwrap()
}

fn path() -> FieldPath {
    FieldPath::entry("climate", 0)
}

fn validate(toml_str: &str, platform: Platform) -> Result<Daikin312Climate, ConfigError> {
    Daikin312Climate::validate(&path(), &entry(toml_str), platform.capabilities())
}

fn options(platform: Platform) -> ResolveOptions {
    ResolveOptions {
        target: platform,
        ir_library: LibraryDeclaration::from_source(
            "IRremoteESP8266",
            "https://github.com/carl09/IRremoteESP8266.git#daikin_312",
        )
        .unwrap(),
    }
}

fn id(raw: &str) -> Identifier {
    Identifier::parse(&path(), raw).unwrap()
}

mod validation {
    use super::*;

    #[test]
    fn minimal_entry() {
        let climate = validate(
            r#"
            platform = "daikin_312"
            pin = "GPIO4"
            "#,
            Platform::Esp32,
        )
        .unwrap();

        assert_eq!(climate.id, None);
        assert_eq!(climate.pin.number, 4);
        assert!(climate.references().is_empty());
        assert!(climate.automations().is_empty());
    }

    #[test]
    fn pin_is_required() {
        let err = validate(r#"platform = "daikin_312""#, Platform::Esp32).unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("climate[0]"));
        assert!(message.contains("pin"));
    }

    #[test]
    fn input_only_pin_is_rejected() {
        let err = validate(
            r#"
            platform = "daikin_312"
            pin = "GPIO34"
            "#,
            Platform::Esp32,
        )
        .unwrap_err();

        assert!(err.to_string().contains("input-only"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = validate(
            r#"
            platform = "daikin_312"
            pin = 4
            swing = true
            "#,
            Platform::Esp32,
        )
        .unwrap_err();

        assert!(err.to_string().contains("swing"));
    }

    #[test]
    fn references_follow_field_order() {
        let climate = validate(
            r#"
            platform = "daikin_312"
            id = "ac"
            pin = 4
            sensor = "room"
            external_mode = "ha_mode"
            external_swing_mode = "ha_swing"
            "#,
            Platform::Esp32,
        )
        .unwrap();

        let references: Vec<_> = climate
            .references()
            .into_iter()
            .map(|r| (r.field, r.expected, r.setter))
            .collect();
        assert_eq!(
            references,
            vec![
                ("sensor".to_string(), ComponentKind::Sensor, "set_sensor"),
                (
                    "external_mode".to_string(),
                    ComponentKind::TextSensor,
                    "set_external_mode_sensor"
                ),
                (
                    "external_swing_mode".to_string(),
                    ComponentKind::TextSensor,
                    "set_external_swing_mode_sensor"
                ),
            ]
        );
    }

    #[test]
    fn turn_off_automations_are_validated() {
        let climate = validate(
            r#"
            platform = "daikin_312"
            pin = 4

            [[on_turn_off]]
            id = "ac_off"
            then = [{ "logger.log" = "off" }]

            [[on_turn_off]]
            then = [{ delay = "1s" }]
            "#,
            Platform::Esp32,
        )
        .unwrap();

        let automations = climate.automations();
        assert_eq!(automations.len(), 2);
        assert_eq!(automations[0].trigger_id, Some(id("ac_off")));
        assert_eq!(automations[0].trigger_kind, ComponentKind::Daikin312TurnOffTrigger);
        assert_eq!(automations[1].actions, vec![Action::Delay { millis: 1000 }]);
    }
}

mod contribution {
    use super::*;
    use crate::build_context::BuildContext;

    fn climate() -> Daikin312Climate {
        validate(
            r#"
            platform = "daikin_312"
            pin = 4
            "#,
            Platform::Esp32,
        )
        .unwrap()
    }

    #[test]
    fn contributes_restrictive_flags_and_library() {
        let mut build = BuildContext::new();
        climate()
            .contribute(&id("ac"), &mut build, &options(Platform::Esp32))
            .unwrap();

        let finalized = build.finalize();
        assert_eq!(finalized.flag(IR_ENABLE_DEFAULT), Some("false"));
        assert_eq!(finalized.flag("SEND_DAIKIN312"), Some("true"));
        assert_eq!(finalized.flag("DECODE_DAIKIN312"), Some("true"));
        assert_eq!(finalized.libraries.len(), 1);
        assert!(!finalized.serial_override);
    }

    #[test]
    fn esp8266_requires_serial_override() {
        let mut build = BuildContext::new();
        climate()
            .contribute(&id("ac"), &mut build, &options(Platform::Esp8266))
            .unwrap();

        assert!(build.finalize().serial_override);
    }

    #[test]
    fn emits_construction_in_order() {
        let mut ops = Vec::new();
        climate().emit(&id("ac"), &mut ops);

        let statements: Vec<_> = ops.iter().map(ToString::to_string).collect();
        assert_eq!(
            statements,
            vec![
                "auto *ac = new daikin_312::Daikin312Climate();",
                "App.register_component(ac);",
                "App.register_climate(ac);",
                "ac->set_pin(new GPIOPin(4, OUTPUT, false));",
            ]
        );
    }
}
