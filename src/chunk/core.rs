use memchr::memrchr;

/// Partition `input` into at most `count` chunks of similar length whose
/// boundaries fall only on `separator` bytes.
///
/// Every chunk except the last ends with the separator (included in the
/// chunk), so no token is split between two chunks. Concatenating the
/// returned chunks reconstructs `input` exactly. Fewer than `count` chunks
/// are returned when the input is short or a stretch holds no separator;
/// only the final chunk may lack a trailing separator.
pub fn split_chunks(input: &[u8], count: usize, separator: u8) -> Vec<&[u8]> {
    debug_assert!(count > 0);
    let target = input.len().div_ceil(count);
    if target < 2 {
        // Splitting finer than two bytes per chunk is pointless.
        return vec![input];
    }

    let mut chunks = Vec::with_capacity(count);
    let mut rest = input;
    loop {
        if chunks.len() == count - 1 {
            chunks.push(rest);
            return chunks;
        }
        // Nearest separator at or before the target offset.
        let limit = rest.len().min(target + 1);
        match memrchr(separator, &rest[..limit]) {
            Some(pos) => {
                let (chunk, tail) = rest.split_at(pos + 1);
                chunks.push(chunk);
                rest = tail;
            }
            None => {
                // No safe cut point left; the remainder becomes the final
                // chunk even though it may be longer than the target.
                chunks.push(rest);
                return chunks;
            }
        }
    }
}
