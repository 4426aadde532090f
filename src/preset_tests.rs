//! Tests for display model presets.

use super::*;
use crate::component::display::St7789I80;
use crate::target::Platform;

fn display(toml_str: &str) -> St7789I80 {
    let value: toml::Value = toml::from_str(toml_str).unwrap();
    St7789I80::validate(
        &FieldPath::entry("display", 0),
        &value,
        Platform::Esp32.capabilities(),
    )
    .unwrap()
}

mod names {
    use super::*;

    #[test]
    fn normalizes_case_and_spaces() {
        assert_eq!(normalize_model_name("esp32 2432s022c"), "ESP32_2432S022C");
        assert_eq!(normalize_model_name(" custom "), "CUSTOM");
    }

    #[test]
    fn lookup_finds_known_models() {
        assert_eq!(lookup("ESP32_2432S022C").name, "ESP32_2432S022C");
        assert_eq!(lookup("CUSTOM"), &CUSTOM);
    }

    #[test]
    fn unknown_model_falls_back_to_custom() {
        assert_eq!(lookup("NOT_A_BOARD"), &CUSTOM);
    }
}

mod merge {
    use super::*;

    #[test]
    fn preset_fills_every_field() {
        let display = display(
            r#"
            platform = "st7789_i80"
            model = "ESP32_2432S022C"
            "#,
        )
        .display;

        assert_eq!(display.model, "ESP32_2432S022C");
        assert_eq!((display.width, display.height), (240, 320));
        assert_eq!((display.offset_width, display.offset_height), (0, 0));
        assert_eq!(display.dc_pin.number, 16);
        assert_eq!(display.wr_pin.number, 4);
        assert_eq!(display.cs_pin.as_ref().map(|p| p.number), Some(17));
        assert_eq!(display.rd_pin.as_ref().map(|p| p.number), Some(2));
        assert!(display.invert_colors);

        let bus: Vec<_> = display.data_pins.iter().map(|p| p.number).collect();
        assert_eq!(bus, vec![15, 13, 12, 14, 27, 25, 33, 32]);
        assert_eq!(display.backlight_pin, None);
    }

    #[test]
    fn model_name_is_normalized_before_lookup() {
        let display = display(
            r#"
            platform = "st7789_i80"
            model = "esp32 2432s022c"
            "#,
        )
        .display;

        assert_eq!(display.model, "ESP32_2432S022C");
        assert_eq!(display.width, 240);
    }

    #[test]
    fn explicit_field_overrides_preset() {
        let display = display(
            r#"
            platform = "st7789_i80"
            model = "ESP32_2432S022C"
            cs_pin = "GPIO5"
            "#,
        )
        .display;

        assert_eq!(display.cs_pin.as_ref().map(|p| p.number), Some(5));
        assert_eq!(display.dc_pin.number, 16);
        assert_eq!(display.wr_pin.number, 4);
        assert_eq!(display.rd_pin.as_ref().map(|p| p.number), Some(2));
        assert_eq!(display.width, 240);
        assert!(display.invert_colors);
    }

    #[test]
    fn explicit_false_is_not_replaced() {
        let display = display(
            r#"
            platform = "st7789_i80"
            model = "ESP32_2432S022C"
            invert_colors = false
            "#,
        )
        .display;

        assert!(!display.invert_colors);
    }

    #[test]
    fn data_bus_is_replaced_whole() {
        let display = display(
            r#"
            platform = "st7789_i80"
            model = "ESP32_2432S022C"
            data_pins = [0, 1, 3, 5, 18, 19, 21, 22]
            "#,
        )
        .display;

        let bus: Vec<_> = display.data_pins.iter().map(|p| p.number).collect();
        assert_eq!(bus, vec![0, 1, 3, 5, 18, 19, 21, 22]);
    }

    #[test]
    fn unknown_model_supplies_nothing() {
        let value: toml::Value = toml::from_str(
            r#"
            platform = "st7789_i80"
            model = "mystery board"
            "#,
        )
        .unwrap();
        let err = St7789I80::validate(
            &FieldPath::entry("display", 0),
            &value,
            Platform::Esp32.capabilities(),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingRequiredField { field: "width", .. }));
    }

    #[test]
    fn custom_preset_leaves_config_untouched() {
        let display = display(
            r#"
            platform = "st7789_i80"
            width = 100
            height = 100
            data_pins = [0, 1, 3, 5, 18, 19, 21, 22]
            dc_pin = 16
            wr_pin = 17
            "#,
        )
        .display;

        assert_eq!(display.model, CUSTOM_MODEL);
        assert_eq!(display.cs_pin, None);
        assert!(!display.invert_colors);
    }
}
