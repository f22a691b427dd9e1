//! Bounded file reads, Latin-1 transcoding and output paths.
//!
//! htmlify works on ISO-8859-1 text. Input is decoded byte-per-character (or
//! from UTF-8 with `--utf8`), and output is always written as ISO-8859-1.

use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Largest input file accepted, in bytes.
pub(crate) const MAX_INPUT_BYTES: u64 = 1024 * 1024;

/// Appended to an input path to name its output file.
pub(crate) const OUTPUT_SUFFIX: &str = "_htmlified";

/// How input bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    /// One byte per character.
    Latin1,
    /// UTF-8 restricted to characters ISO-8859-1 can represent.
    Utf8,
}

/// Reads a whole file, rejecting files larger than [`MAX_INPUT_BYTES`].
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let too_large = |size| CliError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit: MAX_INPUT_BYTES,
    };

    let file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();
    if size > MAX_INPUT_BYTES {
        return Err(too_large(size));
    }

    // The file may grow between the size check and the read.
    let mut bytes = Vec::with_capacity(size as usize);
    file.take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(read_error)?;
    if bytes.len() as u64 > MAX_INPUT_BYTES {
        return Err(too_large(bytes.len() as u64));
    }
    Ok(bytes)
}

/// Decodes `bytes`. Errors carry a human readable reason.
pub(crate) fn decode(bytes: &[u8], encoding: Encoding) -> Result<String, String> {
    match encoding {
        Encoding::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
        Encoding::Utf8 => {
            let text = std::str::from_utf8(bytes).map_err(|err| err.to_string())?;
            let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
            if let Some((pos, ch)) = text.char_indices().find(|(_, ch)| u32::from(*ch) > 0xFF) {
                return Err(format!(
                    "character U+{:04X} at byte {pos} has no ISO-8859-1 equivalent",
                    u32::from(ch)
                ));
            }
            Ok(text.to_string())
        }
    }
}

/// Encodes `text` as ISO-8859-1.
///
/// Characters beyond U+00FF become numeric character references.
pub(crate) fn encode_latin1(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => bytes.push(byte),
            Err(_) => bytes.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes()),
        }
    }
    bytes
}

/// The output file written for `input`.
pub(crate) fn output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

/// Writes `bytes` to `path`, replacing any previous content.
pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod decoding {
        use super::*;

        #[test]
        fn latin1_maps_every_byte() {
            assert_eq!(decode(b"Gr\xfc\xdfe", Encoding::Latin1).unwrap(), "Grüße");
            assert_eq!(decode(&[0x80, 0xff], Encoding::Latin1).unwrap(), "\u{80}ÿ");
        }

        #[test]
        fn utf8_within_latin1() {
            assert_eq!(
                decode("Grüße".as_bytes(), Encoding::Utf8).unwrap(),
                "Grüße"
            );
        }

        #[test]
        fn utf8_byte_order_mark_dropped() {
            assert_eq!(
                decode("\u{FEFF}abc".as_bytes(), Encoding::Utf8).unwrap(),
                "abc"
            );
        }

        #[test]
        fn utf8_outside_latin1_fails() {
            let err = decode("5 €".as_bytes(), Encoding::Utf8).unwrap_err();
            assert!(err.contains("U+20AC"), "{err}");
        }

        #[test]
        fn invalid_utf8_fails() {
            assert!(decode(b"\xfc", Encoding::Utf8).is_err());
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn latin1_output() {
            assert_eq!(encode_latin1("a é"), b"a \xe9");
        }

        #[test]
        fn wide_characters_become_references() {
            assert_eq!(encode_latin1("€"), b"&#8364;");
        }
    }

    mod files {
        use super::*;

        #[test]
        fn output_path_appends_suffix() {
            assert_eq!(
                output_path(Path::new("dir/notes.txt")),
                PathBuf::from("dir/notes.txt_htmlified")
            );
        }

        #[test]
        fn read_small_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("in.txt");
            std::fs::write(&path, b"hello").unwrap();
            assert_eq!(read_input(&path).unwrap(), b"hello");
        }

        #[test]
        fn read_rejects_large_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("big.txt");
            std::fs::write(&path, vec![b'a'; MAX_INPUT_BYTES as usize + 1]).unwrap();
            let err = read_input(&path).unwrap_err();
            assert!(matches!(err, CliError::TooLarge { .. }));
            assert_eq!(err.exit_code(), 2);
        }

        #[test]
        fn read_accepts_limit() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("limit.txt");
            std::fs::write(&path, vec![b'a'; MAX_INPUT_BYTES as usize]).unwrap();
            assert_eq!(read_input(&path).unwrap().len() as u64, MAX_INPUT_BYTES);
        }
    }
}
