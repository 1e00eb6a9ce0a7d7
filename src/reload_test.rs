// Tests for reload supervision
// Test cases:
// - First observation is only a baseline
// - A changed modification time swaps in the new dictionary
// - Reload reconciles the ledger: newly resolvable entries disappear
// - A broken dictionary keeps the previous generation
// - The background thread picks up changes and stops cleanly

use super::*;
use crate::ledger::LedgerEntry;
use crate::resolver::resolve;
use std::fs::File;
use std::time::Instant;
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    dictionary_path: PathBuf,
    ledger_path: PathBuf,
    context: Arc<ReloadContext>,
}

fn fixture(initial: &str) -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let dictionary_path = temp_dir.path().join("dictionary.txt");
    let ledger_path = temp_dir.path().join("notMatch.txt");
    fs::write(&dictionary_path, initial).unwrap();

    let dict = dictionary::load(&dictionary_path).unwrap();
    let context = Arc::new(ReloadContext::new(
        dictionary_path.clone(),
        ledger_path.clone(),
        dict,
        UnresolvedLedger::new(),
    ));

    Fixture {
        _temp_dir: temp_dir,
        dictionary_path,
        ledger_path,
        context,
    }
}

/// Rewrite the file and push its modification time forward so the change is
/// visible regardless of filesystem timestamp resolution
fn rewrite(path: &Path, content: &str, seconds_ahead: u64) {
    fs::write(path, content).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(seconds_ahead))
        .unwrap();
}

fn supervisor(context: &Arc<ReloadContext>) -> ReloadSupervisor {
    ReloadSupervisor::new(context.clone(), SupervisorConfig::default())
}

#[test]
fn test_default_config() {
    let config = SupervisorConfig::default();
    assert_eq!(config.poll_interval_ms, 1000);
    assert!(config.skip_first_observation);
}

#[test]
fn test_first_observation_is_baseline() {
    let fx = fixture("cat=猫");
    let sup = supervisor(&fx.context);

    assert_eq!(sup.state(), SupervisorState::Idle);
    assert_eq!(sup.check_now(), PollOutcome::Baseline);
    assert_eq!(sup.check_now(), PollOutcome::Unchanged);
    assert_eq!(fx.context.dictionary().generation(), 0);
}

#[test]
fn test_first_observation_reloads_without_baseline_guard() {
    let fx = fixture("cat=猫");
    let sup = ReloadSupervisor::new(
        fx.context.clone(),
        SupervisorConfig {
            poll_interval_ms: 50,
            skip_first_observation: false,
        },
    );

    assert!(matches!(sup.check_now(), PollOutcome::Reloaded(_)));
    assert_eq!(fx.context.dictionary().generation(), 1);
}

#[test]
fn test_missing_file_is_reported() {
    let fx = fixture("cat=猫");
    fs::remove_file(&fx.dictionary_path).unwrap();

    let sup = supervisor(&fx.context);
    assert_eq!(sup.check_now(), PollOutcome::Missing);
}

#[test]
fn test_change_swaps_dictionary() {
    let fx = fixture("cat=猫");
    let sup = supervisor(&fx.context);
    sup.check_now();

    let before = fx.context.dictionary().snapshot();
    rewrite(&fx.dictionary_path, "cat=貓\ndog=狗", 5);

    match sup.check_now() {
        PollOutcome::Reloaded(summary) => assert_eq!(summary.generation, 1),
        other => panic!("Expected Reloaded, got {:?}", other),
    }
    assert_eq!(sup.state(), SupervisorState::Idle);

    let after = fx.context.dictionary().snapshot();
    assert_eq!(before.lookup("cat"), Some("猫"));
    assert_eq!(after.lookup("cat"), Some("貓"));
    assert_eq!(after.lookup("dog"), Some("狗"));
}

#[test]
fn test_reload_reconciles_ledger() {
    let fx = fixture("big=大");
    let sup = supervisor(&fx.context);
    sup.check_now();

    let snapshot = fx.context.dictionary().snapshot();
    let first = resolve(&snapshot, "big cat");
    assert!(!first.resolved);

    let ledger = fx.context.ledger();
    let entry = LedgerEntry::from_resolution("big cat", &first);
    ledger.record(entry.clone(), false).unwrap();
    ledger.append(&fx.ledger_path, &entry).unwrap();

    rewrite(&fx.dictionary_path, "big=大\ncat=猫", 5);
    match sup.check_now() {
        PollOutcome::Reloaded(summary) => {
            assert_eq!(summary.reconcile.resolved, 1);
            assert_eq!(summary.reconcile.remaining, 0);
        }
        other => panic!("Expected Reloaded, got {:?}", other),
    }

    assert!(!ledger.contains("big cat"));
    assert_eq!(fs::read_to_string(&fx.ledger_path).unwrap(), "");

    let second = resolve(&fx.context.dictionary().snapshot(), "big cat");
    assert!(second.resolved);
    assert_eq!(second.value, "大 猫");
}

#[test]
fn test_reload_refreshes_remaining_entries() {
    let fx = fixture("");
    fs::write(&fx.ledger_path, "red fox=red fox(red,fox)\n").unwrap();

    rewrite(&fx.dictionary_path, "red=红", 5);
    let summary = fx.context.reload().unwrap();
    assert_eq!(summary.reconcile.remaining, 1);

    assert_eq!(
        fs::read_to_string(&fx.ledger_path).unwrap(),
        "red fox=红 fox(fox)\n"
    );
}

#[test]
fn test_broken_dictionary_keeps_previous_generation() {
    let fx = fixture("cat=猫");
    let sup = supervisor(&fx.context);
    sup.check_now();

    rewrite(&fx.dictionary_path, "===== ignoreRegex\n(broken", 5);
    assert!(matches!(
        sup.check_now(),
        PollOutcome::Failed(ReloadError::Load(LoadError::InvalidPattern { .. }))
    ));
    assert_eq!(fx.context.dictionary().generation(), 0);
    assert_eq!(fx.context.dictionary().snapshot().lookup("cat"), Some("猫"));

    // The failed timestamp is remembered, so the broken file is not retried
    assert_eq!(sup.check_now(), PollOutcome::Unchanged);

    rewrite(&fx.dictionary_path, "cat=貓", 10);
    assert!(matches!(sup.check_now(), PollOutcome::Reloaded(_)));
}

#[test]
fn test_background_thread_reloads_and_stops() {
    let fx = fixture("cat=猫");
    let mut sup = ReloadSupervisor::new(
        fx.context.clone(),
        SupervisorConfig {
            poll_interval_ms: 20,
            skip_first_observation: true,
        },
    );

    sup.start().unwrap();
    assert!(sup.is_running());
    assert!(sup.start().is_err());

    // Let the thread take its baseline before changing the file
    let deadline = Instant::now() + Duration::from_secs(5);
    while sup.watcher.last_modified.lock().is_none() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    rewrite(&fx.dictionary_path, "cat=貓", 5);

    let deadline = Instant::now() + Duration::from_secs(5);
    while fx.context.dictionary().generation() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(fx.context.dictionary().snapshot().lookup("cat"), Some("貓"));

    sup.stop().unwrap();
    assert!(!sup.is_running());
    assert_eq!(sup.state(), SupervisorState::Idle);
}
