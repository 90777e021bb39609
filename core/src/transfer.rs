//! Byte transfer between sources and sinks.
//!
//! Sources are taken by value: once a copy returns, successfully or not, the
//! source has been dropped and whatever it wraps is closed.

use std::io::{self, Read, Write};

const BUFFER_SIZE: usize = 16 * 1024;

/// Copy everything from `source` into `sink`, flush the sink, and close the
/// source. Returns the number of bytes copied.
pub fn copy<R: Read, W: Write + ?Sized>(mut source: R, sink: &mut W) -> io::Result<u64> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buffer[..n])?;
        total += n as u64;
    }
    sink.flush()?;
    Ok(total)
}

/// Drain `source` into a string. Invalid UTF-8 is replaced, not rejected.
pub fn read_to_text<R: Read>(source: R) -> io::Result<String> {
    let mut bytes = Vec::new();
    copy(source, &mut bytes)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn copies_all_bytes_and_reports_count() {
        let data = vec![7u8; BUFFER_SIZE * 3 + 11];
        let mut sink = Vec::new();
        let n = copy(Cursor::new(data.clone()), &mut sink).unwrap();
        assert_eq!(n, data.len() as u64);
        assert_eq!(sink, data);
    }

    #[test]
    fn empty_source_copies_nothing() {
        let mut sink = Vec::new();
        assert_eq!(copy(io::empty(), &mut sink).unwrap(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn read_errors_propagate() {
        let mut sink = Vec::new();
        let err = copy(FailingReader, &mut sink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn reads_utf8_text() {
        let text = read_to_text(Cursor::new("héllo".as_bytes())).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = read_to_text(Cursor::new(vec![b'o', b'k', 0xFF])).unwrap();
        assert_eq!(text, "ok\u{FFFD}");
    }
}
