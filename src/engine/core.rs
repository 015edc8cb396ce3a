use std::io::Read;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use memchr::{memrchr, memrchr3};

use crate::buffer::ReadBuffer;
use crate::chunk::split_chunks;
use crate::common::MB;
use crate::error::{Result, UwcError};
use crate::words::{WordSet, tokenize_into};
use crate::worker::WorkerPool;

const KNOWN_POISONED: &str = "final word set poisoned";

/// When and how per-worker word sets are folded into the final set.
///
/// All four produce the same final set; they trade memory held in worker
/// sets against per-round merge latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The coordinator folds every worker's set into the final set each
    /// round; workers start the next round empty.
    ImmediateSingle,
    /// Workers merge pairwise among themselves each round until one set
    /// remains, which the coordinator folds in; workers start empty.
    ImmediateMulti,
    /// Workers accumulate across all rounds; one sequential fold at the end.
    DelayedSingle,
    /// Workers accumulate across all rounds; one pairwise reduction at the
    /// end, then a single fold.
    DelayedMulti,
}

impl Strategy {
    /// Immediate strategies reset worker sets at every dispatch.
    pub fn is_immediate(self) -> bool {
        matches!(self, Strategy::ImmediateSingle | Strategy::ImmediateMulti)
    }

    /// Human-readable description, printed by the CLI in verbose mode.
    pub fn description(self) -> &'static str {
        match self {
            Strategy::ImmediateSingle => "Aggregate in single thread",
            Strategy::ImmediateMulti => "Aggregate in multiple threads",
            Strategy::DelayedSingle => "Aggregate in single thread after processing all data",
            Strategy::DelayedMulti => "Aggregate in multiple threads after processing all data",
        }
    }

    /// Canonical command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::ImmediateSingle => "single",
            Strategy::ImmediateMulti => "multi",
            Strategy::DelayedSingle => "delayed-single",
            Strategy::DelayedMulti => "delayed-multi",
        }
    }
}

impl FromStr for Strategy {
    type Err = UwcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" | "immediate-single" => Ok(Strategy::ImmediateSingle),
            "multi" | "immediate-multi" => Ok(Strategy::ImmediateMulti),
            "delayed-single" => Ok(Strategy::DelayedSingle),
            "delayed-multi" => Ok(Strategy::DelayedMulti),
            other => Err(UwcError::Config(format!(
                "unknown aggregation strategy '{}', should be single, multi, \
                 delayed-single or delayed-multi",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Default worker count: one thread per core plus one, so a worker is ready
/// to run while another is stalled on a cache miss.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        + 1
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Read buffer capacity in bytes. Must exceed the longest token in the
    /// input or the run fails with `BoundaryOverflow`.
    pub buffer_capacity: usize,
    /// Number of worker threads.
    pub workers: usize,
    pub strategy: Strategy,
    /// Separator byte the chunk splitter cuts on. The tokenizer itself
    /// splits on space, tab and newline; with the default space separator a
    /// cut always lands on tokenizer whitespace, but a non-whitespace
    /// separator can bisect tokens at chunk boundaries.
    pub separator: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_capacity: 256 * MB,
            workers: default_workers(),
            strategy: Strategy::DelayedSingle,
            separator: b' ',
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(UwcError::Config(
                "buffer capacity must be greater than 0".into(),
            ));
        }
        if self.workers == 0 {
            return Err(UwcError::Config(
                "worker count must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Result of one counting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSummary {
    pub unique_words: usize,
    /// Total token count, duplicates included. Only the single-threaded
    /// variant tracks it; the parallel strategies report `None`.
    pub total_tokens: Option<u64>,
    /// Number of buffer refills performed.
    pub rounds: u64,
}

/// Count distinct whitespace-delimited tokens in `source`.
///
/// Blocks until the source is exhausted. The source is read sequentially to
/// end-of-data in buffer-sized rounds; each round is split at separator
/// boundaries, tokenized on the worker pool, and aggregated per the
/// configured [`Strategy`].
pub fn count_unique_words(source: impl Read, config: &Config) -> Result<CountSummary> {
    let (set, rounds) = run_rounds(source, config)?;
    Ok(CountSummary {
        unique_words: set.len(),
        total_tokens: None,
        rounds,
    })
}

/// Same run as [`count_unique_words`], exposing the set itself.
pub fn unique_word_set(source: impl Read, config: &Config) -> Result<WordSet> {
    run_rounds(source, config).map(|(set, _)| set)
}

/// Single-threaded variant: one thread, one set, same buffered round
/// structure. Slower on big inputs but also reports the total token count.
pub fn count_unique_words_simple(mut source: impl Read, capacity: usize) -> Result<CountSummary> {
    let mut buf = ReadBuffer::with_capacity(capacity)?;
    let mut words = WordSet::new();
    let mut total = 0u64;
    let mut rounds = 0u64;

    loop {
        let eof = buf.refill(&mut source)?;
        let view = buf.view();
        // Keep a trailing partial token for the next round; the tokenizer's
        // full separator class is safe to cut on here.
        let process_len = if eof {
            view.len()
        } else {
            match memrchr3(b' ', b'\t', b'\n', view) {
                Some(pos) => pos + 1,
                None => {
                    return Err(UwcError::BoundaryOverflow {
                        buffered: view.len(),
                    });
                }
            }
        };
        let keep = view.len() - process_len;
        total += tokenize_into(&view[..process_len], None, &mut words);
        rounds += 1;
        if eof {
            break;
        }
        buf.compact(keep)?;
    }

    Ok(CountSummary {
        unique_words: words.len(),
        total_tokens: Some(total),
        rounds,
    })
}

/// The round loop: refill, split, dispatch, await, aggregate, compact.
fn run_rounds(mut source: impl Read, config: &Config) -> Result<(WordSet, u64)> {
    config.validate()?;

    // The final set doubles as the workers' shared exclusion set. It is
    // write-locked only between rounds, while no unit is in flight.
    let known = Arc::new(RwLock::new(WordSet::new()));
    let pool = WorkerPool::new(config.workers, Arc::clone(&known))?;
    let mut buf = ReadBuffer::with_capacity(config.buffer_capacity)?;
    let mut rounds = 0u64;

    loop {
        let eof = buf.refill(&mut source)?;

        // Only the prefix up to and including the last separator is handed
        // out this round; the tail is carried over by the compaction below.
        let process_len = if eof {
            buf.valid()
        } else {
            match memrchr(config.separator, buf.view()) {
                Some(pos) => pos + 1,
                None => {
                    return Err(UwcError::BoundaryOverflow {
                        buffered: buf.valid(),
                    });
                }
            }
        };
        let keep = buf.valid() - process_len;

        let mut units = 0;
        let used = {
            let chunks = split_chunks(
                &buf.view()[..process_len],
                pool.worker_count(),
                config.separator,
            );
            let mut offset = 0;
            for (index, chunk) in chunks.iter().enumerate() {
                let shard = buf.shard(offset..offset + chunk.len());
                offset += chunk.len();
                if pool.dispatch(index, shard, config.strategy.is_immediate()) {
                    units += 1;
                }
            }
            chunks.len()
        };
        pool.await_units(units);

        match config.strategy {
            Strategy::ImmediateSingle => {
                let mut global = known.write().expect(KNOWN_POISONED);
                for index in 0..used {
                    let mut part = pool.take_words(index);
                    global.merge(&mut part);
                }
            }
            Strategy::ImmediateMulti => {
                let winner = reduce_pairwise(&pool, (0..used).collect());
                let mut part = pool.take_words(winner);
                known.write().expect(KNOWN_POISONED).merge(&mut part);
            }
            Strategy::DelayedSingle | Strategy::DelayedMulti => {}
        }

        rounds += 1;
        if eof {
            break;
        }
        buf.compact(keep)?;
    }

    // Delayed strategies do their one deferred fold over every worker,
    // whether or not it was dispatched in the final round.
    match config.strategy {
        Strategy::DelayedSingle => {
            let mut global = known.write().expect(KNOWN_POISONED);
            for index in 0..pool.worker_count() {
                let mut part = pool.take_words(index);
                global.merge(&mut part);
            }
        }
        Strategy::DelayedMulti => {
            let winner = reduce_pairwise(&pool, (0..pool.worker_count()).collect());
            let mut part = pool.take_words(winner);
            known.write().expect(KNOWN_POISONED).merge(&mut part);
        }
        Strategy::ImmediateSingle | Strategy::ImmediateMulti => {}
    }

    drop(pool); // join workers before unwrapping the shared set
    let set = Arc::try_unwrap(known)
        .ok()
        .expect("final set still shared after pool shutdown")
        .into_inner()
        .expect(KNOWN_POISONED);
    Ok((set, rounds))
}

/// Pairwise reduction tree over the given worker indices: first pairs with
/// last, second with second-last, and so on; each pair's later worker is
/// absorbed by the earlier one. A full pass halves the active list (an odd
/// middle worker sits a pass out). The pairing order is a fixed tie-break,
/// chosen for reproducibility, not an optimization.
fn reduce_pairwise(pool: &WorkerPool, mut active: Vec<usize>) -> usize {
    debug_assert!(!active.is_empty());
    while active.len() > 1 {
        let mut dispatched = 0;
        let mut lo = 0;
        let mut hi = active.len() - 1;
        while lo < hi {
            pool.delegate_merge(active[lo], active[hi]);
            dispatched += 1;
            lo += 1;
            hi -= 1;
        }
        pool.await_units(dispatched);
        let keep = active.len() - dispatched;
        active.truncate(keep);
    }
    active[0]
}
