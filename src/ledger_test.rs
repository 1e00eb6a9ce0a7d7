// Tests for UnresolvedLedger
// Test cases:
// - Ledger lines survive encode/parse, including '(' in the partial text
// - record() only overwrites when asked
// - Empty original text is rejected
// - reconcile() removes entries that now resolve and refreshes the rest
// - flush() rewrites the file, append() adds one line
// - Concurrent records from many threads all land
// - Originals with a leading `//` or edge whitespace survive flush and reload
// - record_and_append() writes once and loses nothing to concurrent reloads

use super::*;
use crate::dictionary::load_str;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_line_round_trip() {
    let entries = [
        LedgerEntry::new("Hello, traveler", "你好, traveler", tokens(&["traveler"])),
        LedgerEntry::new("a=b (c)", "甲=乙 (c)", tokens(&["c"])),
        LedgerEntry::new("two\nlines", "two\n行", tokens(&["two", "lines"])),
        LedgerEntry::new("no tokens", "partial(", Vec::new()),
    ];

    for entry in entries {
        let line = entry.to_line();
        assert_eq!(LedgerEntry::from_line(&line), Some(entry.clone()), "line: {line:?}");
    }
}

#[test]
fn test_line_format() {
    let entry = LedgerEntry::new("Go north", "走 north", tokens(&["north"]));
    assert_eq!(entry.to_line(), "Go north=走 north(north)");

    let entry = LedgerEntry::new("x", "y", tokens(&["a", "b"]));
    assert_eq!(entry.to_line(), "x=y(a,b)");
}

#[test]
fn test_value_without_token_list_is_all_partial() {
    let entry = LedgerEntry::from_line("key=just text").unwrap();
    assert_eq!(entry.partial, "just text");
    assert!(entry.tokens.is_empty());
}

#[test]
fn test_invalid_lines_are_skipped() {
    assert_eq!(LedgerEntry::from_line(""), None);
    assert_eq!(LedgerEntry::from_line("   "), None);
    assert_eq!(LedgerEntry::from_line("no separator"), None);
    assert_eq!(LedgerEntry::from_line("=value"), None);
    assert_eq!(LedgerEntry::from_line("key="), None);
}

#[test]
fn test_record_respects_overwrite_flag() {
    let ledger = UnresolvedLedger::new();
    let first = LedgerEntry::new("t", "first", tokens(&["t"]));
    let second = LedgerEntry::new("t", "second", tokens(&["t"]));

    assert_eq!(ledger.record(first.clone(), false), Ok(true));
    assert_eq!(ledger.record(second.clone(), false), Ok(false));
    assert_eq!(ledger.get("t"), Some(first));

    assert_eq!(ledger.record(second.clone(), true), Ok(true));
    assert_eq!(ledger.get("t"), Some(second));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_record_rejects_empty_original() {
    let ledger = UnresolvedLedger::new();
    let result = ledger.record(LedgerEntry::new("", "x", Vec::new()), true);
    assert_eq!(result, Err(LedgerError::EmptyOriginal));
    assert!(ledger.is_empty());
}

#[test]
fn test_reconcile_prunes_and_refreshes() {
    let ledger = UnresolvedLedger::new();
    ledger
        .record(LedgerEntry::new("big cat", "big cat", tokens(&["big", "cat"])), false)
        .unwrap();
    ledger
        .record(LedgerEntry::new("small dog", "small dog", tokens(&["small", "dog"])), false)
        .unwrap();

    let dict = load_str("big=大\ncat=猫\ndog=狗").unwrap();
    let summary = ledger.reconcile(&dict);

    assert_eq!(summary, ReconcileSummary { resolved: 1, remaining: 1 });
    assert!(!ledger.contains("big cat"));

    let remaining = ledger.get("small dog").unwrap();
    assert_eq!(remaining.partial, "small 狗");
    assert_eq!(remaining.tokens, tokens(&["small"]));
}

#[test]
fn test_flush_rewrites_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chs").join("notMatch.txt");

    let ledger = UnresolvedLedger::new();
    ledger
        .record(LedgerEntry::new("b text", "b text", tokens(&["b", "text"])), false)
        .unwrap();
    ledger
        .record(LedgerEntry::new("a text", "a text", tokens(&["a", "text"])), false)
        .unwrap();
    ledger.flush(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "a text=a text(a,text)\nb text=b text(b,text)\n");

    // A second flush replaces rather than appends
    ledger.reconcile(&load_str("a=甲\ntext=文").unwrap());
    ledger.flush(&path).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "b text=b 文(b)\n");
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_append_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notMatch.txt");

    let ledger = UnresolvedLedger::new();
    let entry = LedgerEntry::new("Go north", "走 north", tokens(&["north"]));
    ledger.append(&path, &entry).unwrap();
    ledger
        .append(&path, &LedgerEntry::new("Go south", "走 south", tokens(&["south"])))
        .unwrap();

    let loaded = UnresolvedLedger::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("Go north"), Some(entry));
}

#[test]
fn test_load_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = UnresolvedLedger::load(&temp_dir.path().join("missing.txt")).unwrap();
    assert!(ledger.is_empty());
}

#[test]
fn test_replace_from_discards_memory_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notMatch.txt");
    fs::write(&path, "from file=from file(from,file)\n").unwrap();

    let ledger = UnresolvedLedger::new();
    ledger
        .record(LedgerEntry::new("in memory", "in memory", tokens(&["in", "memory"])), false)
        .unwrap();

    assert_eq!(ledger.replace_from(&path), Ok(1));
    assert!(ledger.contains("from file"));
    assert!(!ledger.contains("in memory"));
}

#[test]
fn test_concurrent_records() {
    let ledger = Arc::new(UnresolvedLedger::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let text = format!("text {worker} {i}");
                    ledger
                        .record(LedgerEntry::new(text.clone(), text, tokens(&["text"])), false)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(ledger.len(), 400);
}

#[test]
fn test_awkward_originals_survive_flush_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notMatch.txt");

    let ledger = UnresolvedLedger::new();
    let awkward = [
        LedgerEntry::new("//todo note", "//todo note", tokens(&["todo", "note"])),
        LedgerEntry::new("  Hello ", "  你好 ", Vec::new()),
        LedgerEntry::new("Hello", "你好", Vec::new()),
    ];
    for entry in &awkward {
        ledger.record(entry.clone(), false).unwrap();
    }
    ledger.flush(&path).unwrap();

    let reloaded = UnresolvedLedger::load(&path).unwrap();
    assert_eq!(reloaded.len(), 3);
    for entry in awkward {
        assert_eq!(reloaded.get(&entry.original), Some(entry));
    }
}

#[test]
fn test_record_and_append_writes_new_entries_once() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chs").join("notMatch.txt");

    let ledger = UnresolvedLedger::new();
    let entry = LedgerEntry::new("Go north", "走 north", tokens(&["north"]));

    assert_eq!(ledger.record_and_append(&path, entry.clone()), Ok(true));
    assert_eq!(ledger.record_and_append(&path, entry.clone()), Ok(false));
    assert_eq!(
        ledger.record_and_append(&path, LedgerEntry::new("", "", Vec::new())),
        Err(LedgerError::EmptyOriginal)
    );

    assert_eq!(ledger.get("Go north"), Some(entry));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Go north=走 north(north)\n"
    );
}

#[test]
fn test_record_and_append_races_with_reloads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notMatch.txt");
    let ledger = Arc::new(UnresolvedLedger::new());
    let empty = Dictionary::new();
    ledger.flush(&path).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let ledger = ledger.clone();
            let path = path.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let original = format!("entry {} {}", worker, i);
                    let entry = LedgerEntry::new(original.clone(), original, tokens(&["entry"]));
                    assert_eq!(ledger.record_and_append(&path, entry), Ok(true));
                }
            })
        })
        .collect();

    // Same sequence a dictionary reload runs
    for _ in 0..50 {
        ledger.replace_from(&path).unwrap();
        ledger.reconcile(&empty);
        ledger.flush(&path).unwrap();
    }

    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(ledger.len(), 200);
    assert_eq!(ledger.replace_from(&path), Ok(200));
}
