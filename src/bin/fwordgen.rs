use std::fs::File;
use std::io::{Read, Write};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use uwc_rs::common::{MB, TB, parse_size, reset_sigpipe};
use uwc_rs::words::WordSet;

/// Flush threshold for the in-memory write buffer.
const WRITE_BUF: usize = 16 * MB;

const LETTERS: usize = 26;
const MAX_WORD_LEN: u64 = 25;

#[derive(Parser)]
#[command(
    name = "fwordgen",
    about = "Generate a random text file for unique-word counting tests"
)]
struct Cli {
    /// Percent of words terminated by newline instead of space (0-100)
    #[arg(long, value_name = "PCT", default_value_t = 0)]
    multiline: u32,

    /// Percent chance of repeating an earlier word (1-99)
    #[arg(long, value_name = "PCT")]
    repeat: Option<u32>,

    /// Seed for the generator (random when omitted)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Output file path
    file: String,

    /// Target output size in bytes; K, M and G suffixes accepted
    size: String,
}

/// xorshift64 — fast, tiny and plenty for synthetic text. The state must
/// never be zero.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

/// Seed from /dev/urandom, falling back to the clock.
fn random_seed() -> u64 {
    let mut buf = [0u8; 8];
    if File::open("/dev/urandom")
        .and_then(|mut f| f.read_exact(&mut buf))
        .is_ok()
    {
        return u64::from_le_bytes(buf);
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9e3779b97f4a7c15)
}

fn random_word(rng: &mut XorShift64, out: &mut Vec<u8>) {
    out.clear();
    let len = 1 + rng.below(MAX_WORD_LEN);
    for _ in 0..len {
        out.push(b'a' + rng.below(LETTERS as u64) as u8);
    }
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();

    if cli.multiline > 100 {
        eprintln!(
            "fwordgen: invalid value of --multiline '{}', should be in range [0,100]",
            cli.multiline
        );
        process::exit(1);
    }
    let repeat = cli.repeat.unwrap_or(0);
    if cli.repeat.is_some() && !(1..=99).contains(&repeat) {
        eprintln!(
            "fwordgen: invalid value of --repeat '{}', should be in range [1,99]",
            repeat
        );
        process::exit(1);
    }
    let size = match parse_size(&cli.size) {
        Ok(n) if n > 0 && n < TB => n,
        Ok(n) => {
            eprintln!("fwordgen: invalid output size {}", n);
            process::exit(1);
        }
        Err(msg) => {
            eprintln!("fwordgen: invalid output size: {}", msg);
            process::exit(1);
        }
    };

    let mut out = match File::create(&cli.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("fwordgen: cannot open output file {}: {}", cli.file, e);
            process::exit(1);
        }
    };

    println!(
        "Generating file (requested size={}, repeat={}%): {}...",
        size, repeat, cli.file
    );

    let mut rng = XorShift64::new(cli.seed.unwrap_or_else(random_seed));
    let mut buffer: Vec<u8> = Vec::with_capacity(WRITE_BUF);
    let mut word: Vec<u8> = Vec::new();
    let mut used: Vec<Box<[u8]>> = Vec::new();
    let mut unique = WordSet::new();
    let mut written = 0usize;
    let mut words = 0u64;

    while written + buffer.len() < size {
        // coin flip for an extra leading separator
        if rng.below(2) == 1 {
            buffer.push(b' ');
        }
        if !used.is_empty() && rng.below(100) <= repeat as u64 {
            let idx = rng.below(used.len() as u64) as usize;
            buffer.extend_from_slice(&used[idx]);
        } else {
            // reject until globally fresh
            loop {
                random_word(&mut rng, &mut word);
                if !unique.contains(&word) {
                    break;
                }
            }
            unique.insert(&word);
            used.push(word.clone().into_boxed_slice());
            buffer.extend_from_slice(&word);
        }
        words += 1;

        let newline = match cli.multiline {
            0 => false,
            100 => true,
            pct => rng.below(100) < pct as u64,
        };
        buffer.push(if newline { b'\n' } else { b' ' });

        if written + buffer.len() >= size || buffer.len() >= WRITE_BUF {
            if let Err(e) = out.write_all(&buffer) {
                eprintln!("fwordgen: write failed: {}", e);
                process::exit(1);
            }
            written += buffer.len();
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        if let Err(e) = out.write_all(&buffer) {
            eprintln!("fwordgen: write failed: {}", e);
            process::exit(1);
        }
    }

    println!(
        "File {} contains {} words ({} unique)",
        cli.file,
        words,
        unique.len()
    );
}
