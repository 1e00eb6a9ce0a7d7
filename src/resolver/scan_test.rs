use super::*;

fn word(key: &str, value: &str) -> WordEntry {
    WordEntry {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[test]
fn test_boundary_rule_is_ascii_letters_only() {
    assert!(is_whole_word("a cat ran", 2, 5));
    assert!(!is_whole_word("cats", 0, 3));
    assert!(!is_whole_word("bobcat", 3, 6));
    // Digits, punctuation and non-ASCII letters are all boundaries
    assert!(is_whole_word("cat1", 0, 3));
    assert!(is_whole_word("(cat)", 1, 4));
    assert!(is_whole_word("猫cat猫", 3, 6));
    assert!(is_whole_word("écat", 2, 5));
}

#[test]
fn test_occurrences_skip_embedded_hits() {
    assert_eq!(whole_word_occurrences("cat cats cat", "cat"), vec![0, 9]);
    assert!(whole_word_occurrences("concatenate", "cat").is_empty());
    assert!(whole_word_occurrences("anything", "").is_empty());
}

#[test]
fn test_occurrences_may_overlap() {
    // "a a" occurs at 0 and again at 2 inside "a a a"
    assert_eq!(whole_word_occurrences("a a a", "a a"), vec![0, 2]);
}

#[test]
fn test_occurrences_step_over_multibyte_text() {
    assert_eq!(whole_word_occurrences("猫 ok 猫 ok", "ok"), vec![4, 11]);
    assert_eq!(whole_word_occurrences("猫猫猫", "猫猫"), vec![0, 3]);
}

#[test]
fn test_ignore_spans_record_literal_text() {
    let ignores = vec!["Auto Save".to_string(), "HP".to_string()];
    let spans = ignore_spans(&ignores, "Auto Save HP HPMax");

    assert_eq!(
        spans,
        vec![
            IgnoreSpan {
                text: "Auto Save",
                index: 0,
                length: 9
            },
            IgnoreSpan {
                text: "HP",
                index: 10,
                length: 2
            },
        ]
    );
    assert!(spans[0].contains(0));
    assert!(spans[0].contains(8));
    assert!(!spans[0].contains(9));
}

#[test]
fn test_candidate_starting_inside_span_is_dropped() {
    let words = vec![word("Save", "保存"), word("Auto", "自动")];
    let ignores = vec!["Auto Save".to_string()];
    let text = "Auto Save now";
    let spans = ignore_spans(&ignores, text);

    let found = candidates(&words, &spans, text);
    assert!(found.is_empty(), "got {:?}", found);
}

#[test]
fn test_candidate_starting_before_span_is_kept() {
    // Only the start index is tested against ignore spans
    let words = vec![word("big red", "大红")];
    let ignores = vec!["red".to_string()];
    let text = "big red";
    let spans = ignore_spans(&ignores, text);

    let found = candidates(&words, &spans, text);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].key, "big red");
    assert!(found[0].full_span);
}

#[test]
fn test_order_puts_full_span_last_and_longer_first() {
    let words = vec![
        word("ab", "X"),
        word("ab cd", "Y"),
        word("cd", "Z"),
        word("ab cd ef", "W"),
    ];
    let text = "ab cd ef";
    let mut found = candidates(&words, &[], text);
    order_candidates(&mut found);

    let order: Vec<(&str, usize, bool)> = found
        .iter()
        .map(|c| (c.key, c.index, c.full_span))
        .collect();
    assert_eq!(
        order,
        vec![
            ("ab cd", 0, false),
            ("ab", 0, false),
            ("cd", 3, false),
            ("ab cd ef", 0, true),
        ]
    );
}
