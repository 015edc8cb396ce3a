use super::*;
use crate::buffer::{ReadBuffer, Shard};
use crate::words::WordSet;
use std::sync::{Arc, RwLock};

fn empty_known() -> Arc<RwLock<WordSet>> {
    Arc::new(RwLock::new(WordSet::new()))
}

fn shard_of(text: &[u8]) -> Shard {
    let mut buf = ReadBuffer::with_capacity(text.len().max(1)).unwrap();
    buf.append(text);
    buf.shard(0..text.len())
}

fn words_of(pool: &WorkerPool, index: usize) -> Vec<String> {
    let set = pool.take_words(index);
    let mut v: Vec<String> = set
        .iter()
        .map(|w| String::from_utf8(w.to_vec()).unwrap())
        .collect();
    v.sort();
    v
}

#[test]
fn test_zero_workers_rejected() {
    assert!(matches!(
        WorkerPool::new(0, empty_known()),
        Err(crate::error::UwcError::Config(_))
    ));
}

#[test]
fn test_dispatch_and_await_round_trip() {
    let pool = WorkerPool::new(2, empty_known()).unwrap();
    let a = pool.dispatch(0, shard_of(b"ala ma "), true);
    let b = pool.dispatch(1, shard_of(b"kota"), true);
    assert!(a && b);
    pool.await_units(2);
    assert_eq!(words_of(&pool, 0), vec!["ala", "ma"]);
    assert_eq!(words_of(&pool, 1), vec!["kota"]);
}

#[test]
fn test_empty_shard_short_circuits() {
    let pool = WorkerPool::new(1, empty_known()).unwrap();
    // no unit dispatched, so nothing to await
    assert!(!pool.dispatch(0, shard_of(b""), false));
    assert!(pool.take_words(0).is_empty());
}

#[test]
fn test_clear_flag_discards_previous_round() {
    let pool = WorkerPool::new(1, empty_known()).unwrap();
    assert!(pool.dispatch(0, shard_of(b"old "), false));
    pool.await_units(1);
    assert!(pool.dispatch(0, shard_of(b"new "), true));
    pool.await_units(1);
    assert_eq!(words_of(&pool, 0), vec!["new"]);
}

#[test]
fn test_accumulation_without_clear() {
    let pool = WorkerPool::new(1, empty_known()).unwrap();
    assert!(pool.dispatch(0, shard_of(b"one "), false));
    pool.await_units(1);
    assert!(pool.dispatch(0, shard_of(b"two "), false));
    pool.await_units(1);
    assert_eq!(words_of(&pool, 0), vec!["one", "two"]);
}

#[test]
fn test_clear_applies_even_for_empty_shard() {
    let pool = WorkerPool::new(1, empty_known()).unwrap();
    assert!(pool.dispatch(0, shard_of(b"stale "), false));
    pool.await_units(1);
    assert!(!pool.dispatch(0, shard_of(b""), true));
    assert!(pool.take_words(0).is_empty());
}

#[test]
fn test_delegate_merge_absorbs_on_target() {
    let pool = WorkerPool::new(2, empty_known()).unwrap();
    pool.dispatch(0, shard_of(b"ala ma "), false);
    pool.dispatch(1, shard_of(b"ma kota "), false);
    pool.await_units(2);

    pool.delegate_merge(0, 1);
    pool.await_units(1);

    assert!(pool.take_words(1).is_empty());
    assert_eq!(words_of(&pool, 0), vec!["ala", "kota", "ma"]);
}

#[test]
fn test_exclusion_set_filters_tokens() {
    let known = empty_known();
    known.write().unwrap().insert(b"ma");
    let pool = WorkerPool::new(1, Arc::clone(&known)).unwrap();
    pool.dispatch(0, shard_of(b"ala ma kota "), false);
    pool.await_units(1);
    assert_eq!(words_of(&pool, 0), vec!["ala", "kota"]);
}

#[test]
fn test_workers_run_concurrently_on_disjoint_shards() {
    let pool = WorkerPool::new(4, empty_known()).unwrap();
    let mut buf = ReadBuffer::with_capacity(32).unwrap();
    buf.append(b"aa bb cc dd ee ff gg hh ");
    let mut units = 0;
    for i in 0..4 {
        let shard = buf.shard(i * 6..(i + 1) * 6);
        if pool.dispatch(i, shard, false) {
            units += 1;
        }
    }
    pool.await_units(units);
    let mut all = WordSet::new();
    for i in 0..4 {
        let mut part = pool.take_words(i);
        all.merge(&mut part);
    }
    assert_eq!(all.len(), 8);
}

#[test]
fn test_drop_joins_all_workers() {
    let pool = WorkerPool::new(3, empty_known()).unwrap();
    pool.dispatch(0, shard_of(b"x "), false);
    pool.await_units(1);
    drop(pool); // must not hang or leak threads
}
