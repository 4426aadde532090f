//! Tests for the parallel-bus display schema.

use super::*;
use crate::target::Platform;

const CUSTOM_BUS: &str = r#"
platform = "st7789_i80"
id = "lcd"
width = 240
height = 320
data_pins = ["GPIO15", "GPIO13", "GPIO12", "GPIO14", "GPIO27", "GPIO25", "GPIO33", "GPIO32"]
dc_pin = "GPIO16"
wr_pin = "GPIO4"
"#;

fn validate(toml_str: &str) -> Result<St7789I80, ConfigError> {
    let value: toml::Value = toml::from_str(toml_str).unwrap();
    St7789I80::validate(
        &FieldPath::entry("display", 0),
        &value,
        Platform::Esp32.capabilities(),
    )
}

mod schema {
    use super::*;

    #[test]
    fn custom_model_with_every_required_field() {
        let display = validate(CUSTOM_BUS).unwrap().display;

        assert_eq!(display.model, "CUSTOM");
        assert_eq!((display.width, display.height), (240, 320));
        assert_eq!((display.offset_width, display.offset_height), (0, 0));
        assert_eq!(display.data_pins.len(), 8);
        assert_eq!(display.data_pins[7].position, Some(7));
        assert!(!display.invert_colors);
        assert_eq!(display.pclk_frequency_hz, DEFAULT_PCLK_FREQUENCY_HZ);
        assert_eq!(display.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
        assert_eq!(display.cs_pin, None);
    }

    #[test]
    fn unsupported_on_esp8266() {
        let value: toml::Value = toml::from_str(CUSTOM_BUS).unwrap();
        let err = St7789I80::validate(
            &FieldPath::entry("display", 0),
            &value,
            Platform::Esp8266.capabilities(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::UnsupportedTarget {
                component: ComponentKind::St7789I80,
                target: Platform::Esp8266,
            }
        ));
    }

    #[test]
    fn seven_data_pins_are_rejected() {
        let err = validate(
            r#"
            platform = "st7789_i80"
            width = 240
            height = 320
            data_pins = [1, 2, 3, 4, 5, 12, 13]
            dc_pin = 16
            wr_pin = 17
            "#,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("display[0].data_pins"));
        assert!(message.contains("got 7"));
    }

    #[test]
    fn missing_required_field_names_it() {
        let err = validate(
            r#"
            platform = "st7789_i80"
            id = "lcd"
            width = 240
            height = 320
            dc_pin = 16
            wr_pin = 17
            "#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingRequiredField {
                field: "data_pins",
                ref id,
                ..
            } if id == "lcd"
        ));
    }

    #[test]
    fn missing_field_without_id_names_the_entry() {
        let err = validate(r#"platform = "st7789_i80""#).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingRequiredField {
                field: "width",
                ref id,
                ..
            } if id == "display[0]"
        ));
    }

    #[test]
    fn empty_data_pins_count_as_absent() {
        let err = validate(
            r#"
            platform = "st7789_i80"
            width = 240
            height = 320
            data_pins = []
            dc_pin = 16
            wr_pin = 17
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingRequiredField { field: "data_pins", .. }));
    }

    #[test]
    fn dimensions_are_bounded() {
        let toml_str = CUSTOM_BUS.replace("width = 240", "width = 481");
        let err = validate(&toml_str).unwrap_err();
        assert!(err.to_string().starts_with("display[0].width"));
    }

    #[test]
    fn frequency_and_transform() {
        let toml_str = format!(
            "{CUSTOM_BUS}\npclk_frequency = \"20MHz\"\nrotation = 90\ntransform = {{ mirror_x = true }}"
        );
        let display = validate(&toml_str).unwrap().display;

        assert_eq!(display.pclk_frequency_hz, 20_000_000);
        assert_eq!(display.rotation, Some(90));
        assert_eq!(
            display.transform,
            Some(Transform {
                swap_xy: false,
                mirror_x: true,
                mirror_y: false,
            })
        );
    }

    #[test]
    fn odd_rotation_is_rejected() {
        let toml_str = format!("{CUSTOM_BUS}\nrotation = 45");
        let err = validate(&toml_str).unwrap_err();
        assert!(err.to_string().contains("0, 90, 180, 270"));
    }
}

mod emission {
    use super::*;

    #[test]
    fn emits_bus_in_data_line_order() {
        let display = validate(CUSTOM_BUS).unwrap();
        let id = display.id.clone().unwrap();

        let mut ops = Vec::new();
        display.emit(&id, &mut ops);
        let statements: Vec<_> = ops.iter().map(ToString::to_string).collect();

        assert_eq!(statements[0], "auto *lcd = new st7789_i80::ST7789I80();");
        assert!(statements.contains(&"lcd->set_dimensions(240, 320);".to_string()));

        let bus: Vec<_> = statements
            .iter()
            .filter(|s| s.starts_with("lcd->add_data_pin"))
            .collect();
        assert_eq!(bus.len(), 8);
        assert_eq!(bus[0], "lcd->add_data_pin(new GPIOPin(15, OUTPUT, false), 0);");
        assert_eq!(bus[7], "lcd->add_data_pin(new GPIOPin(32, OUTPUT, false), 7);");

        assert!(!statements.iter().any(|s| s.contains("set_cs_pin")));
        assert!(statements.contains(&"lcd->set_pclk_frequency(12000000);".to_string()));
    }

    #[test]
    fn lambda_becomes_the_writer() {
        let display = validate(&format!(
            "{CUSTOM_BUS}lambda = \"it.fill(Color::BLACK);\\n\"\n"
        ))
        .unwrap();
        let id = display.id.clone().unwrap();

        let mut ops = Vec::new();
        display.emit(&id, &mut ops);

        assert_eq!(
            ops.last().map(ToString::to_string).as_deref(),
            Some("lcd->set_writer([=](display::Display &it) { it.fill(Color::BLACK); });")
        );
    }

    #[test]
    fn no_writer_without_lambda() {
        let display = validate(CUSTOM_BUS).unwrap();
        let id = display.id.clone().unwrap();

        let mut ops = Vec::new();
        display.emit(&id, &mut ops);

        assert!(display.lambda.is_none());
        assert!(!ops.iter().any(|op| op.to_string().contains("set_writer")));
    }
}
