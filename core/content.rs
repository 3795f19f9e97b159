use std::fs;
use std::io;
use std::path::Path;

/// Reads a file as text without failing on bad encoding.
///
/// Byte sequences that are not valid UTF-8 are dropped, and `\r\n` / lone
/// `\r` line endings become `\n`. Only I/O failures are reported as errors.
pub fn read_text_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_lossy(&bytes))
}

pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            log::trace!("Dropping {} undecodable byte(s)", chunk.invalid().len());
        }
    }
    normalize_newlines(text)
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_untouched() {
        assert_eq!(decode_lossy("héllo wörld\n".as_bytes()), "héllo wörld\n");
    }

    #[test]
    fn invalid_bytes_are_dropped() {
        let bytes = b"ab\xffcd\xc3(ef";
        assert_eq!(decode_lossy(bytes), "abcd(ef");
    }

    #[test]
    fn line_endings_are_normalized() {
        assert_eq!(decode_lossy(b"one\r\ntwo\rthree\n"), "one\ntwo\nthree\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text_lossy(&dir.path().join("nope.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"x\r\ny\xfe").unwrap();
        assert_eq!(read_text_lossy(&path).unwrap(), "x\ny");
    }
}
