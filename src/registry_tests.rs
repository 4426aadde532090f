//! Tests for the identifier registry.

use super::*;

fn path() -> FieldPath {
    FieldPath::entry("sensor", 0).field("id")
}

fn id(raw: &str) -> Identifier {
    Identifier::parse(&path(), raw).unwrap()
}

mod identifiers {
    use super::*;

    #[test]
    fn accepts_c_identifiers() {
        for raw in ["ac", "_private", "room_temp_2", "Living"] {
            assert_eq!(id(raw).as_str(), raw);
        }
    }

    #[test]
    fn rejects_invalid_identifiers() {
        for raw in ["", "2fast", "has-dash", "has space", "ümlaut"] {
            let result = Identifier::parse(&path(), raw);
            assert!(result.is_err(), "{raw:?} should be rejected");
        }
    }
}

mod declaration {
    use super::*;

    #[test]
    fn declare_then_get() {
        let mut registry = Registry::new();
        registry
            .declare(id("ac"), ComponentKind::Daikin312Climate, 0, false)
            .unwrap();

        let found = registry.get(&id("ac")).unwrap();
        assert_eq!(found.kind, ComponentKind::Daikin312Climate);
        assert_eq!(found.position, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_declaration_fails_and_first_wins() {
        let mut registry = Registry::new();
        registry.declare(id("ac"), ComponentKind::Sensor, 0, false).unwrap();

        let err = registry
            .declare(id("ac"), ComponentKind::Daikin312Climate, 1, false)
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::DuplicateIdentifier {
                first: ComponentKind::Sensor,
                second: ComponentKind::Daikin312Climate,
                ..
            }
        ));
        assert_eq!(registry.get(&id("ac")).unwrap().kind, ComponentKind::Sensor);
        assert_eq!(registry.len(), 1);
    }
}

mod generated_ids {
    use super::*;

    #[test]
    fn generated_ids_count_per_kind() {
        let mut registry = Registry::new();

        assert_eq!(registry.generate_id(ComponentKind::St7789I80).as_str(), "st7789i80_0");
        assert_eq!(registry.generate_id(ComponentKind::St7789I80).as_str(), "st7789i80_1");
        assert_eq!(registry.generate_id(ComponentKind::Sensor).as_str(), "sensor_0");
    }

    #[test]
    fn generated_ids_skip_reserved_names() {
        let mut registry = Registry::new();
        registry.reserve(&id("sensor_0"));

        assert_eq!(registry.generate_id(ComponentKind::Sensor).as_str(), "sensor_1");
    }

    #[test]
    fn generated_ids_skip_declared_names() {
        let mut registry = Registry::new();
        registry.declare(id("sensor_0"), ComponentKind::Sensor, 0, false).unwrap();

        assert_eq!(registry.generate_id(ComponentKind::Sensor).as_str(), "sensor_1");
    }
}

mod resolution {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.declare(id("room"), ComponentKind::Sensor, 0, false).unwrap();
        registry.declare(id("ac"), ComponentKind::Daikin312Climate, 1, false).unwrap();
        registry
            .declare(id("proto"), ComponentKind::IrRemoteProtocolSensor, 2, false)
            .unwrap();
        registry
    }

    #[test]
    fn resolves_earlier_declaration() {
        let registry = registry();
        let found = registry.resolve(&id("room"), ComponentKind::Sensor, 1).unwrap();

        assert_eq!(found.id, id("room"));
    }

    #[test]
    fn unknown_identifier_is_not_declared() {
        let registry = registry();
        let err = registry.resolve(&id("nope"), ComponentKind::Sensor, 3).unwrap_err();

        assert_eq!(
            err,
            ReferenceFailure::NotDeclared {
                expected: ComponentKind::Sensor
            }
        );
    }

    #[test]
    fn forward_reference_is_declared_later() {
        let registry = registry();
        let err = registry
            .resolve(&id("ac"), ComponentKind::Daikin312Climate, 0)
            .unwrap_err();

        assert!(matches!(err, ReferenceFailure::DeclaredLater { .. }));
    }

    #[test]
    fn self_reference_is_declared_later() {
        let registry = registry();
        let err = registry
            .resolve(&id("ac"), ComponentKind::Daikin312Climate, 1)
            .unwrap_err();

        assert!(matches!(err, ReferenceFailure::DeclaredLater { .. }));
    }

    #[test]
    fn wrong_kind_is_reported() {
        let registry = registry();
        let err = registry.resolve(&id("room"), ComponentKind::TextSensor, 5).unwrap_err();

        assert_eq!(
            err,
            ReferenceFailure::WrongKind {
                expected: ComponentKind::TextSensor,
                actual: ComponentKind::Sensor,
            }
        );
    }

    #[test]
    fn protocol_sensor_satisfies_text_sensor_reference() {
        let registry = registry();
        assert!(registry.resolve(&id("proto"), ComponentKind::TextSensor, 3).is_ok());
    }

    #[test]
    fn candidates_respect_position_and_kind() {
        let registry = registry();

        assert!(registry.candidates(ComponentKind::TextSensor, 2).is_empty());
        assert_eq!(registry.candidates(ComponentKind::TextSensor, 3).len(), 1);
        assert_eq!(registry.candidates(ComponentKind::Sensor, 3).len(), 1);
    }
}
