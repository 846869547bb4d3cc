//! Property tests for the A1 address codec

use cellgrid_core::{format_address, parse_address, Position, DEFAULT_COLS, DEFAULT_ROWS};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_round_trip_within_default_grid(row in 0..DEFAULT_ROWS, col in 0..DEFAULT_COLS) {
        let pos = Position::new(row, col);
        prop_assert_eq!(parse_address(&format_address(pos)).unwrap(), pos);
    }

    #[test]
    fn prop_round_trip_any_position(row in any::<u32>(), col in any::<u32>()) {
        let pos = Position::new(row, col);
        prop_assert_eq!(parse_address(&format_address(pos)).unwrap(), pos);
    }

    #[test]
    fn prop_lowercase_parses_the_same(row in 0..DEFAULT_ROWS, col in 0..DEFAULT_COLS) {
        let text = format_address(Position::new(row, col));
        prop_assert_eq!(
            parse_address(&text.to_ascii_lowercase()).unwrap(),
            parse_address(&text).unwrap()
        );
    }

    #[test]
    fn prop_format_shape(row in any::<u32>(), col in any::<u32>()) {
        let text = format_address(Position::new(row, col));
        let letters = text.chars().take_while(|c| c.is_ascii_uppercase()).count();
        prop_assert!(letters >= 1);
        prop_assert!(text[letters..].chars().all(|c| c.is_ascii_digit()));
        prop_assert!(!text[letters..].starts_with('0'));
    }
}

#[test]
fn test_column_encoding_examples() {
    let cases = [(0, "A1"), (25, "Z1"), (26, "AA1"), (701, "ZZ1"), (702, "AAA1")];
    for (col, expected) in cases {
        assert_eq!(format_address(Position::new(0, col)), expected);
    }
}
