//! Property tests: incidental detail never changes the normalized pattern.

use deployiq_core::patterns::normalize_error;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,7}"
}

fn literal() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._@-]{0,16}"
}

proptest! {
    #[test]
    fn paths_lines_positions_and_literals_collapse(
        dir_a in segment(), file_a in segment(), line_a in 0u32..100_000, row_a in 0u32..5_000, col_a in 0u32..500, lit_a in literal(),
        dir_b in segment(), file_b in segment(), line_b in 0u32..100_000, row_b in 0u32..5_000, col_b in 0u32..500, lit_b in literal(),
    ) {
        let a = format!(
            "Build failed in /app/{dir_a}/{file_a}.ts at line {line_a}: cannot resolve '{lit_a}' ({row_a}:{col_a})"
        );
        let b = format!(
            "Build failed in /app/{dir_b}/{file_b}.ts at line {line_b}: cannot resolve '{lit_b}' ({row_b}:{col_b})"
        );
        prop_assert_eq!(normalize_error(&a), normalize_error(&b));
    }

    #[test]
    fn back_to_back_literals_each_collapse(parts in prop::collection::vec(literal(), 1..5)) {
        let quoted: String = parts.iter().map(|p| format!("'{p}'")).collect();
        let message = format!("unexpected {quoted} in config");
        let expected = format!("unexpected {} in config", "<STR>".repeat(parts.len()));
        prop_assert_eq!(normalize_error(&message), expected);
    }

    #[test]
    fn normalization_is_idempotent(message in "[a-zA-Z0-9 :/.(),_-]{0,80}") {
        let once = normalize_error(&message);
        prop_assert_eq!(normalize_error(&once), once.clone());
    }
}
