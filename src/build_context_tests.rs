//! Tests for build flag arbitration.

use super::*;

const IR_DEFAULT: &str = "_IR_ENABLE_DEFAULT_";
const FORK: &str = "https://github.com/carl09/IRremoteESP8266.git#daikin_312";

fn library() -> LibraryDeclaration {
    LibraryDeclaration::from_source("IRremoteESP8266", FORK).unwrap()
}

mod arbitration {
    use super::*;

    #[test]
    fn debug_override_wins_when_contributed_last() {
        let mut build = BuildContext::new();
        build.contribute("ac", IR_DEFAULT, "false", Precedence::RestrictiveOptimization);
        build.contribute("ir_debug", IR_DEFAULT, "true", Precedence::OverrideForDebug);

        assert_eq!(build.finalize().flag(IR_DEFAULT), Some("true"));
    }

    #[test]
    fn debug_override_wins_when_contributed_first() {
        let mut build = BuildContext::new();
        build.contribute("ir_debug", IR_DEFAULT, "true", Precedence::OverrideForDebug);
        build.contribute("ac", IR_DEFAULT, "false", Precedence::RestrictiveOptimization);

        assert_eq!(build.finalize().flag(IR_DEFAULT), Some("true"));
    }

    #[test]
    fn latest_contribution_wins_within_a_class() {
        let mut build = BuildContext::new();
        build.contribute("a", "X", "1", Precedence::RestrictiveOptimization);
        build.contribute("b", "X", "2", Precedence::RestrictiveOptimization);

        assert_eq!(build.finalize().flag("X"), Some("2"));
    }

    #[test]
    fn restrictive_value_stands_alone() {
        let mut build = BuildContext::new();
        build.contribute("ac", IR_DEFAULT, "false", Precedence::RestrictiveOptimization);
        build.contribute("ac", "SEND_DAIKIN312", "true", Precedence::RestrictiveOptimization);

        let finalized = build.finalize();
        assert_eq!(finalized.flag(IR_DEFAULT), Some("false"));
        assert_eq!(finalized.flag("SEND_DAIKIN312"), Some("true"));
    }

    #[test]
    fn flags_are_sorted_by_name() {
        let mut build = BuildContext::new();
        build.contribute("ac", "SEND_DAIKIN312", "true", Precedence::RestrictiveOptimization);
        build.contribute("ac", "DECODE_DAIKIN312", "true", Precedence::RestrictiveOptimization);
        build.contribute("ac", IR_DEFAULT, "false", Precedence::RestrictiveOptimization);

        let names: Vec<_> = build.finalize().flags.into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["DECODE_DAIKIN312", "SEND_DAIKIN312", IR_DEFAULT]);
    }

    #[test]
    fn requirements_keep_contribution_order() {
        let mut build = BuildContext::new();
        build.contribute("a", "X", "1", Precedence::OverrideForDebug);
        build.contribute("b", "Y", "2", Precedence::RestrictiveOptimization);

        let sequences: Vec<_> = build.requirements().iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
        assert_eq!(build.requirements()[1].contributor, "b");
    }

    #[test]
    fn define_formats_compiler_flag() {
        let flag = BuildFlag {
            name: "SEND_DAIKIN312".to_string(),
            value: "true".to_string(),
        };
        assert_eq!(flag.define(), "-DSEND_DAIKIN312=true");
    }
}

mod libraries {
    use super::*;

    #[test]
    fn source_splits_reference() {
        let library = library();

        assert_eq!(library.repository, "https://github.com/carl09/IRremoteESP8266.git");
        assert_eq!(library.reference.as_deref(), Some("daikin_312"));
        assert_eq!(library.source(), FORK);
        assert_eq!(library.lib_dep(), format!("IRremoteESP8266={FORK}"));
    }

    #[test]
    fn source_without_reference() {
        let library =
            LibraryDeclaration::from_source("Lib", "https://example.com/lib.git").unwrap();
        assert_eq!(library.reference, None);
    }

    #[test]
    fn rejects_relative_source() {
        let err = LibraryDeclaration::from_source("Lib", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = LibraryDeclaration::from_source("Lib", "ftp://example.com/lib").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn identical_declarations_collapse() {
        let mut build = BuildContext::new();
        build.declare_library(library()).unwrap();
        build.declare_library(library()).unwrap();

        assert_eq!(build.finalize().libraries.len(), 1);
    }

    #[test]
    fn different_source_conflicts() {
        let mut build = BuildContext::new();
        build.declare_library(library()).unwrap();

        let other = LibraryDeclaration::from_source(
            "IRremoteESP8266",
            "https://github.com/crankyoldgit/IRremoteESP8266.git",
        )
        .unwrap();
        let err = build.declare_library(other).unwrap_err();

        assert!(matches!(err, ConfigError::LibraryConflict { ref name, .. } if name == "IRremoteESP8266"));
    }
}

mod serial {
    use super::*;

    #[test]
    fn serial_override_is_off_by_default() {
        assert!(!BuildContext::new().finalize().serial_override);
    }

    #[test]
    fn serial_override_is_sticky() {
        let mut build = BuildContext::new();
        build.require_serial_override();
        build.require_serial_override();

        assert!(build.finalize().serial_override);
    }
}
