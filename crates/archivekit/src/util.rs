use std::io::{ErrorKind, Read, Result};

/// Reads bytes until the buffer is full or the reader reports EOF, retrying on EINTR.
///
/// Unlike `Read::read_exact()`, a short read is not an error: the number of
/// bytes actually read is returned so the caller can tell a full buffer, a
/// clean EOF (0) and a truncated tail (anything in between) apart.
///
/// Errors from the underlying reader are returned directly.
pub(crate) fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

/// Reads up to `count` bytes, stopping early at EOF.
///
/// Nothing is preallocated: `count` comes from a header and may be far larger
/// than what is actually left to read.
pub(crate) fn read_up_to(reader: &mut impl Read, count: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.take(count).read_to_end(&mut data)?;
    Ok(data)
}

/// The text after the final `/` of an entry name.
///
/// A name ending in `/` (a directory) has an empty final component.
pub fn last_path_component(name: &str) -> &str {
    match name.rfind('/') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Returns true if the final path component of `name` starts with a dot.
pub fn is_hidden_name(name: &str) -> bool {
    last_path_component(name).starts_with('.')
}
