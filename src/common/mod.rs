pub mod io;

pub const KB: usize = 1024;
pub const MB: usize = 1024 * KB;
pub const GB: usize = 1024 * MB;
pub const TB: usize = 1024 * GB;

/// Reset SIGPIPE to default behavior (SIG_DFL).
/// Rust sets SIGPIPE to SIG_IGN by default, but command-line tools are
/// expected to die quietly when their output pipe closes (exit 141).
/// Must be called at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix.
/// Rust's Display impl appends e.g. " (os error 2)"; strip it so the CLI
/// prints "No such file or directory" like everyone else.
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        let msg = format!("{}", os_err);
        msg.replace(&format!(" (os error {})", raw), "")
    } else {
        format!("{}", e)
    }
}

/// Parse a byte count with an optional K, M or G suffix (case-insensitive,
/// powers of 1024). "64K" -> 65536.
pub fn parse_size(input: &str) -> Result<usize, String> {
    let s = input.trim();
    let (digits, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], KB),
        Some(b'm' | b'M') => (&s[..s.len() - 1], MB),
        Some(b'g' | b'G') => (&s[..s.len() - 1], GB),
        _ => (s, 1),
    };
    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| {
            format!(
                "invalid value '{}', should be a positive integer with optional suffix K, M or G",
                input
            )
        })
}
