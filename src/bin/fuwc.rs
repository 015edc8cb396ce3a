use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;

use uwc_rs::common::io::read_file;
use uwc_rs::common::{GB, io_error_msg, parse_size, reset_sigpipe};
use uwc_rs::engine::{
    Config, CountSummary, Strategy, count_unique_words, count_unique_words_simple,
};
use uwc_rs::error::UwcError;

/// Caller-side practical bounds for the read buffer.
const MIN_INBUF: usize = 4;
const MAX_INBUF: usize = GB;

#[derive(Parser)]
#[command(
    name = "fuwc",
    about = "Count unique whitespace-delimited words in FILE"
)]
struct Cli {
    /// Count on a single thread with one set (also reports the total word count)
    #[arg(long)]
    simple: bool,

    /// Print only the unique-word count
    #[arg(short, long)]
    quiet: bool,

    /// Aggregation strategy: single, multi, delayed-single or delayed-multi
    #[arg(long, value_name = "STRATEGY", default_value = "delayed-single")]
    agg: String,

    /// Read buffer size in bytes; K, M and G suffixes accepted
    #[arg(long, value_name = "SIZE", default_value = "256M")]
    inbuf: String,

    /// Number of worker threads (default: available cores + 1)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Input file ('-' reads standard input)
    file: String,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();

    let inbuf = match parse_size(&cli.inbuf) {
        Ok(n) => n,
        Err(msg) => {
            eprintln!("fuwc: bad input buffer size: {}", msg);
            process::exit(1);
        }
    };
    if inbuf < MIN_INBUF || inbuf > MAX_INBUF {
        eprintln!(
            "fuwc: bad input buffer size: {}, should be in range {} .. {} (bytes)",
            inbuf, MIN_INBUF, MAX_INBUF
        );
        process::exit(1);
    }

    let strategy: Strategy = match cli.agg.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("fuwc: {}", e);
            process::exit(1);
        }
    };

    let mut config = Config {
        buffer_capacity: inbuf,
        strategy,
        ..Default::default()
    };
    if let Some(n) = cli.threads {
        config.workers = n;
    }

    if !cli.quiet {
        println!("================================================");
        if cli.simple {
            println!("Processing file (--simple) {}...", cli.file);
        } else {
            println!("Processing file {}...", cli.file);
            println!("{}", config.strategy.description());
        }
    }

    let start = Instant::now();
    let result = count_from(&cli, &config);
    let elapsed = start.elapsed();

    match result {
        Ok(summary) => {
            if cli.quiet {
                println!("{}", summary.unique_words);
            } else {
                if elapsed.as_secs_f32() < 1.0 {
                    println!("!!! Done in {} milliseconds.", elapsed.as_millis());
                } else {
                    println!("!!! Done in {} seconds.", elapsed.as_secs_f32());
                }
                match summary.total_tokens {
                    Some(total) => println!(
                        "File {} contains {} unique words, total {} ({} rounds)",
                        cli.file, summary.unique_words, total, summary.rounds
                    ),
                    None => println!(
                        "File {} contains {} unique words ({} rounds)",
                        cli.file, summary.unique_words, summary.rounds
                    ),
                }
            }
        }
        Err(UwcError::Source(e)) => {
            eprintln!("fuwc: {}: {}", cli.file, io_error_msg(&e));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("fuwc: {}", e);
            process::exit(1);
        }
    }
}

fn count_from(cli: &Cli, config: &Config) -> Result<CountSummary, UwcError> {
    if cli.file == "-" {
        let stdin = io::stdin().lock();
        if cli.simple {
            count_unique_words_simple(stdin, config.buffer_capacity)
        } else {
            count_unique_words(stdin, config)
        }
    } else {
        // mmap large regular files; the engine streams the slice through
        // its own buffer in rounds either way.
        let data = read_file(Path::new(&cli.file))?;
        if cli.simple {
            count_unique_words_simple(&data[..], config.buffer_capacity)
        } else {
            count_unique_words(&data[..], config)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::process::{Command, Stdio};

    fn cmd() -> Command {
        let mut path = std::env::current_exe().unwrap();
        path.pop();
        path.pop();
        path.push("fuwc");
        Command::new(path)
    }

    #[test]
    fn test_quiet_count_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("words.txt");
        std::fs::write(&file, "ala ma kota a kot ma ale.").unwrap();
        let output = cmd()
            .args(["--quiet", file.to_str().unwrap()])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "6");
    }

    #[test]
    fn test_all_strategies_agree() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("words.txt");
        std::fs::write(&file, "one two three two one four five four six\n".repeat(40)).unwrap();
        let mut counts = Vec::new();
        for agg in ["single", "multi", "delayed-single", "delayed-multi"] {
            let output = cmd()
                .args(["--quiet", "--agg", agg, "--inbuf", "64", file.to_str().unwrap()])
                .output()
                .unwrap();
            assert!(output.status.success(), "strategy {} failed", agg);
            counts.push(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        assert!(counts.iter().all(|c| c == "6"), "counts: {:?}", counts);
    }

    #[test]
    fn test_simple_reports_total() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("words.txt");
        std::fs::write(&file, "aa bb aa cc").unwrap();
        let output = cmd()
            .args(["--simple", file.to_str().unwrap()])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("3 unique words, total 4"), "{}", stdout);
    }

    #[test]
    fn test_stdin_input() {
        let mut child = cmd()
            .args(["--quiet", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(b"x y z x\n")
            .unwrap();
        let output = child.wait_with_output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3");
    }

    #[test]
    fn test_buffer_too_small_for_token_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("long.txt");
        std::fs::write(&file, "a_very_long_unbroken_token_with_no_spaces").unwrap();
        let output = cmd()
            .args(["--quiet", "--inbuf", "8", file.to_str().unwrap()])
            .output()
            .unwrap();
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("buffer too small"), "{}", stderr);
    }

    #[test]
    fn test_bad_strategy_rejected() {
        let output = cmd().args(["--agg", "fancy", "/dev/null"]).output().unwrap();
        assert!(!output.status.success());
    }

    #[test]
    fn test_bad_inbuf_rejected() {
        let output = cmd().args(["--inbuf", "2", "/dev/null"]).output().unwrap();
        assert!(!output.status.success());
        let output = cmd().args(["--inbuf", "nope", "/dev/null"]).output().unwrap();
        assert!(!output.status.success());
    }

    #[test]
    fn test_nonexistent_file() {
        let output = cmd().arg("/nonexistent_xyz_fuwc").output().unwrap();
        assert!(!output.status.success());
    }

    #[test]
    fn test_verbose_output_shape() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("words.txt");
        std::fs::write(&file, "hello world").unwrap();
        let output = cmd().arg(file.to_str().unwrap()).output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Processing file"));
        assert!(stdout.contains("!!! Done in"));
        assert!(stdout.contains("contains 2 unique words"));
    }
}
