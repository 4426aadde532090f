//! Tests for time and frequency literals.

use std::time::Duration;

use super::{
    FieldPath, Literal, MAX_TIME_PERIOD, frequency_hz, positive_millis, time_period, whole_millis,
};

fn path() -> FieldPath {
    FieldPath::entry("irremote_debug", 0).field("timeout")
}

fn text(s: &str) -> Literal {
    Literal::Text(s.to_string())
}

mod time_literals {
    use super::*;

    #[test]
    fn unit_suffixes() {
        let cases = [
            ("500us", Duration::from_micros(500)),
            ("15ms", Duration::from_millis(15)),
            ("1s", Duration::from_secs(1)),
            ("1.5s", Duration::from_millis(1500)),
            ("2min", Duration::from_secs(120)),
            ("1h", Duration::from_secs(3600)),
            ("100 MS", Duration::from_millis(100)),
        ];

        for (raw, expected) in cases {
            assert_eq!(time_period(&path(), &text(raw)).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn numbers_without_unit_are_rejected() {
        let err = time_period(&path(), &Literal::Integer(15)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "irremote_debug[0].timeout: time period '15' has no unit; did you mean '15ms'?"
        );

        assert!(time_period(&path(), &Literal::Float(1.5)).is_err());
        assert!(time_period(&path(), &text("250")).unwrap_err().to_string().contains("no unit"));
    }

    #[test]
    fn rejects_unknown_unit() {
        let err = time_period(&path(), &text("3 fortnights")).unwrap_err();
        assert!(err.to_string().contains("invalid time period"));
    }

    #[test]
    fn rejects_negative() {
        assert!(time_period(&path(), &text("-5ms")).is_err());
    }

    #[test]
    fn bounded_to_maximum() {
        assert_eq!(time_period(&path(), &text("24h")).unwrap(), MAX_TIME_PERIOD);

        let err = time_period(&path(), &text("25h")).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn positive_millis_requires_non_zero_whole_ms() {
        assert_eq!(positive_millis(&path(), Duration::from_millis(15)).unwrap(), 15);
        assert!(positive_millis(&path(), Duration::ZERO).is_err());
        assert!(positive_millis(&path(), Duration::from_micros(1500)).is_err());
    }

    #[test]
    fn whole_millis_accepts_zero() {
        assert_eq!(whole_millis(&path(), Duration::ZERO).unwrap(), 0);
        assert_eq!(whole_millis(&path(), Duration::from_secs(2)).unwrap(), 2000);
        assert!(whole_millis(&path(), Duration::from_micros(1500)).is_err());
    }
}

mod frequency_literals {
    use super::*;

    #[test]
    fn unit_suffixes() {
        assert_eq!(frequency_hz(&path(), &text("12MHz")).unwrap(), 12_000_000);
        assert_eq!(frequency_hz(&path(), &text("400kHz")).unwrap(), 400_000);
        assert_eq!(frequency_hz(&path(), &text("2.5 mhz")).unwrap(), 2_500_000);
        assert_eq!(frequency_hz(&path(), &text("8000Hz")).unwrap(), 8_000);
    }

    #[test]
    fn bare_numbers_are_hertz() {
        assert_eq!(frequency_hz(&path(), &Literal::Integer(20_000_000)).unwrap(), 20_000_000);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(frequency_hz(&path(), &Literal::Integer(0)).is_err());
        assert!(frequency_hz(&path(), &text("fast")).is_err());
    }

    #[test]
    fn rejects_overflow() {
        let err = frequency_hz(&path(), &text("5GHz")).unwrap_err();
        assert!(err.to_string().contains("too high"));
    }
}
