//! Demonstration of eventlog's publish/read/snapshot surface.
//!
//! Run with: `cargo run -p eventlog --bin demo`

use eventlog::{decode_body, CancelToken, EncodedBody, EventLog, EventLogConfig, FrameHeader, Publish, Topic, FRAME_HEADER_LEN};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== eventlog Demo ===\n");

    demo_basic_publish_and_read()?;
    demo_topic_and_key_filtering()?;
    demo_truncation()?;
    demo_blocking_reader()?;
    demo_snapshot_restore()?;

    println!("\n=== All demos completed successfully! ===");
    Ok(())
}

/// Demo 1: the prepare/commit/abort lifecycle, then reading forward.
fn demo_basic_publish_and_read() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 1: Basic Publish and Read ---");

    let log = EventLog::new(EventLogConfig::new(8));
    println!("  Created log with capacity {}", log.capacity());

    log.prepare(Publish::new(1, Topic::Kv, "users/1", "alice"))?;
    println!("  Staged index 1 (not yet visible)");
    log.abort();
    println!("  Aborted; max_index is still {}", log.max_index());

    log.publish(Publish::new(1, Topic::Kv, "users/1", "alice"))?;
    log.publish(Publish::new(2, Topic::Kv, "users/2", "bob"))?;
    println!("  Published 2 events");

    let mut index = 0;
    while let Some((idx, payload)) = log.next(index, Topic::All, None)? {
        let header = FrameHeader::read_from(&payload).expect("frame header always present");
        let body: EncodedBody<String> = decode_body(&payload[FRAME_HEADER_LEN..])?;
        println!("  Read index {} ({} byte body, key {:?}, value {:?})", idx, header.len, body.key, body.value);
        index = idx;
    }
    println!("  ✓ Basic publish and read complete\n");
    Ok(())
}

/// Demo 2: filtering reads by topic and by key within a topic.
fn demo_topic_and_key_filtering() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 2: Topic and Key Filtering ---");

    let log = EventLog::new(EventLogConfig::new(8));
    log.publish(Publish::new(1, Topic::Kv, "a", 1u32))?;
    log.publish(Publish::new(2, Topic::CatalogServices, "svc", 2u32))?;
    log.publish(Publish::new(3, Topic::Kv, "b", 3u32))?;
    log.publish(Publish::new(4, Topic::Kv, "a", 4u32))?;

    let (idx, _) = log.next(0, Topic::Kv, None)?.unwrap();
    println!("  First KV event after 0: index {}", idx);

    let (idx, _) = log.next(0, Topic::Kv, Some("a"))?.unwrap();
    println!("  First KV event for key \"a\": index {}", idx);
    let (idx, _) = log.next(idx, Topic::Kv, Some("a"))?.unwrap();
    println!("  Next KV event for key \"a\": index {}", idx);

    println!("  ✓ Topic and key filtering complete\n");
    Ok(())
}

/// Demo 3: a reader who falls behind the ring's retention window.
fn demo_truncation() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 3: Truncation ---");

    let log = EventLog::new(EventLogConfig::new(4));
    for i in 1..=6 {
        log.publish(Publish::new(i, Topic::Kv, "k", i as u32))?;
    }
    println!("  Published 6 events into a 4-slot ring; min_index={}", log.min_index());

    match log.next(0, Topic::All, None) {
        Err(err) if err.is_truncated() => println!("  next(0, ...) correctly reports: {err}"),
        other => println!("  unexpected result: {other:?}"),
    }

    println!("  ✓ Truncation complete\n");
    Ok(())
}

/// Demo 4: a blocked reader woken by a publish on another thread, and a
/// second reader cancelled instead.
fn demo_blocking_reader() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 4: Blocking Reader ---");

    let log = Arc::new(EventLog::new(EventLogConfig::new(8)));

    let woken = Arc::clone(&log);
    let wake_cancel = CancelToken::new();
    let wake_cancel_for_reader = wake_cancel.clone();
    let reader = thread::spawn(move || woken.next_block(0, Topic::All, None, &wake_cancel_for_reader));

    thread::sleep(Duration::from_millis(20));
    log.publish(Publish::new(1, Topic::Kv, "a", 1u32))?;
    let (idx, _) = reader.join().unwrap()?;
    println!("  Blocked reader woke with index {idx}");

    let cancelled = Arc::clone(&log);
    let cancel = CancelToken::new();
    let cancel_for_reader = cancel.clone();
    let reader = thread::spawn(move || cancelled.next_block(100, Topic::All, None, &cancel_for_reader));
    thread::sleep(Duration::from_millis(20));
    cancel.cancel();
    match reader.join().unwrap() {
        Err(err) if err.is_cancelled() => println!("  Cancelled reader correctly reports: {err}"),
        other => println!("  unexpected result: {other:?}"),
    }

    println!("  ✓ Blocking reader complete\n");
    Ok(())
}

/// Demo 5: snapshotting a log and restoring a second one from it.
fn demo_snapshot_restore() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 5: Snapshot and Restore ---");

    let log = EventLog::new(EventLogConfig::new(4));
    for i in 1..=9 {
        log.publish(Publish::new(i * 100, Topic::Kv, "k", i as u32))?;
    }
    println!("  Published 9 events into a 4-slot ring (min_index={}, max_index={})", log.min_index(), log.max_index());

    let snap = log.snapshot(849);
    println!("  Snapshot(849) captured {} events", snap.events.len());

    let restored = EventLog::from_snapshot(EventLogConfig::new(4), Some(snap))?;
    println!("  Restored log: min_index={}, max_index={}", restored.min_index(), restored.max_index());

    match restored.next(0, Topic::Kv, None) {
        Err(err) if err.is_truncated() => println!("  Restored log correctly reports the pre-restore history as: {err}"),
        other => println!("  unexpected result: {other:?}"),
    }

    println!("  ✓ Snapshot and restore complete\n");
    Ok(())
}
