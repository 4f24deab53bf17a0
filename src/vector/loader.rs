//! Dictionary Loader
//!
//! Reads the word2vec binary format:
//!
//! ```text
//! <vocab_size> <dimension>\n
//! <word> <f32 LE x dimension>[\n]     (repeated vocab_size times)
//! ```
//!
//! Words are terminated by a single space. The newline after each vector is
//! optional, and leading line breaks before a word are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::embedding_store::{EmbeddingStore, StoreBuilder};
use super::error::{LoadError, LoadResult};

/// Longest header line accepted, in bytes
const MAX_HEADER_LEN: u64 = 64;

/// Longest word accepted, in bytes
const MAX_WORD_LEN: u64 = 4096;

/// Largest vector dimension accepted
const MAX_DIMENSION: usize = 1 << 16;

/// Load a dictionary file into a store.
pub(crate) fn load_file(path: &Path) -> LoadResult<EmbeddingStore> {
    let start = Instant::now();
    let file = File::open(path)?;
    let store = read_dictionary(BufReader::new(file))?;

    info!(
        path = %path.display(),
        words = store.len(),
        dimension = store.dimension(),
        elapsed = ?start.elapsed(),
        "Dictionary loaded"
    );
    Ok(store)
}

/// Parse a complete dictionary from any buffered reader.
pub fn read_dictionary<R: BufRead>(mut reader: R) -> LoadResult<EmbeddingStore> {
    let (vocab_size, dimension) = read_header(&mut reader)?;
    debug!(vocab_size, dimension, "Dictionary header");

    let mut builder = StoreBuilder::new(dimension, vocab_size)?;
    let mut word_buf = Vec::with_capacity(64);
    let mut raw = vec![0u8; dimension * 4];
    let mut vector = vec![0f32; dimension];

    for index in 0..vocab_size {
        let word = read_word(&mut reader, &mut word_buf, index, vocab_size)?;

        reader.read_exact(&mut raw).map_err(|e| truncated(e, vocab_size, index))?;
        for (dst, c) in vector.iter_mut().zip(raw.chunks_exact(4)) {
            *dst = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
        }

        builder.push(word, &vector)?;
    }

    expect_only_whitespace(&mut reader, builder.len())?;
    Ok(builder.build())
}

fn read_header<R: BufRead>(reader: &mut R) -> LoadResult<(usize, usize)> {
    let mut line = Vec::new();
    reader.by_ref().take(MAX_HEADER_LEN).read_until(b'\n', &mut line)?;

    if line.last() != Some(&b'\n') {
        return Err(LoadError::InvalidHeader(if line.is_empty() {
            "empty file".to_string()
        } else {
            "header line is not terminated".to_string()
        }));
    }

    let text = std::str::from_utf8(&line)
        .map_err(|_| LoadError::InvalidHeader("header is not ASCII".to_string()))?;
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [size, dim] = fields.as_slice() else {
        return Err(LoadError::InvalidHeader(format!(
            "expected \"<vocab_size> <dimension>\", got {:?}",
            text.trim_end()
        )));
    };

    let vocab_size: usize = size
        .parse()
        .map_err(|_| LoadError::InvalidHeader(format!("bad vocabulary size {:?}", size)))?;
    let dimension: usize = dim
        .parse()
        .map_err(|_| LoadError::InvalidHeader(format!("bad dimension {:?}", dim)))?;

    if vocab_size == 0 {
        return Err(LoadError::InvalidHeader("vocabulary size is zero".to_string()));
    }
    if dimension == 0 || dimension > MAX_DIMENSION {
        return Err(LoadError::InvalidHeader(format!("bad dimension {}", dimension)));
    }

    Ok((vocab_size, dimension))
}

fn read_word<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    index: usize,
    expected: usize,
) -> LoadResult<String> {
    buf.clear();
    let limit = MAX_WORD_LEN + 1;
    let n = reader
        .by_ref()
        .take(limit)
        .read_until(b' ', buf)
        .map_err(|e| truncated(e, expected, index))?;

    if buf.last() != Some(&b' ') {
        if n as u64 == limit {
            return Err(LoadError::InvalidWord {
                index,
                reason: format!("longer than {} bytes", MAX_WORD_LEN),
            });
        }
        return Err(LoadError::Truncated {
            expected,
            read: index,
        });
    }
    buf.pop();

    let skip = buf.iter().take_while(|&&b| b == b'\n' || b == b'\r').count();
    let word = &buf[skip..];
    if word.is_empty() {
        return Err(LoadError::InvalidWord {
            index,
            reason: "empty word".to_string(),
        });
    }

    String::from_utf8(word.to_vec()).map_err(|_| LoadError::InvalidWord {
        index,
        reason: "not valid UTF-8".to_string(),
    })
}

fn expect_only_whitespace<R: BufRead>(reader: &mut R, entries: usize) -> LoadResult<()> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        if !buf.iter().all(u8::is_ascii_whitespace) {
            return Err(LoadError::TrailingData(entries));
        }
        let len = buf.len();
        reader.consume(len);
    }
}

fn truncated(err: io::Error, expected: usize, read: usize) -> LoadError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        LoadError::Truncated { expected, read }
    } else {
        LoadError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    /// Encode entries in the word2vec binary layout.
    fn encode(dimension: usize, entries: &[(&str, &[f32])]) -> Vec<u8> {
        let mut out = format!("{} {}\n", entries.len(), dimension).into_bytes();
        for (word, vector) in entries {
            out.extend_from_slice(word.as_bytes());
            out.push(b' ');
            for x in vector.iter() {
                out.extend_from_slice(&x.to_le_bytes());
            }
            out.push(b'\n');
        }
        out
    }

    fn sample() -> Vec<u8> {
        let entries: [(&str, &[f32]); 4] = [
            ("king", &[1.0, 0.0]),
            ("queen", &[0.9, 0.1]),
            ("man", &[0.0, 1.0]),
            ("woman", &[0.0, 0.9]),
        ];
        encode(2, &entries)
    }

    #[test]
    fn test_read_dictionary() {
        let store = read_dictionary(Cursor::new(sample())).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.dimension(), 2);
        assert_eq!(store.get("king").unwrap(), &[1.0f32, 0.0]);
        let words: Vec<&str> = store.entries().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["king", "queen", "man", "woman"]);
    }

    #[test]
    fn test_without_newline_after_vectors() {
        let mut data = b"2 1\n".to_vec();
        data.extend_from_slice(b"a ");
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(b"b ");
        data.extend_from_slice(&(-3.0f32).to_le_bytes());

        let store = read_dictionary(Cursor::new(data)).unwrap();
        assert_eq!(store.get("a").unwrap(), &[1.0f32]);
        assert_eq!(store.get("b").unwrap(), &[-1.0f32]);
    }

    #[test]
    fn test_utf8_words() {
        let entries: [(&str, &[f32]); 2] = [("café", &[1.0]), ("東京", &[2.0])];
        let data = encode(1, &entries);
        let store = read_dictionary(Cursor::new(data)).unwrap();
        assert!(store.contains("café"));
        assert!(store.contains("東京"));
    }

    #[test]
    fn test_truncated_entries() {
        let entries: Vec<(String, Vec<f32>)> =
            (0..10).map(|i| (format!("w{}", i), vec![i as f32, 1.0])).collect();
        let refs: Vec<(&str, &[f32])> = entries
            .iter()
            .map(|(w, v)| (w.as_str(), v.as_slice()))
            .collect();
        let mut data = encode(2, &refs);
        // Claim 100 words while only 10 are present
        let body = data.split_off(data.iter().position(|&b| b == b'\n').unwrap() + 1);
        let mut data = b"100 2\n".to_vec();
        data.extend_from_slice(&body);

        let err = read_dictionary(Cursor::new(data)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Truncated {
                expected: 100,
                read: 10
            }
        ));
    }

    #[test]
    fn test_truncated_vector() {
        let mut data = sample();
        data.truncate(data.len() - 3);
        let err = read_dictionary(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, LoadError::Truncated { read: 3, .. }));
    }

    #[test]
    fn test_invalid_headers() {
        for header in [
            "",
            "4\n",
            "four 2\n",
            "4 0\n",
            "0 2\n",
            "4 2 7\n",
            "4 2",
            "4 99999999\n",
        ] {
            let err = read_dictionary(Cursor::new(header.as_bytes().to_vec())).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidHeader(_)),
                "header {:?} gave {:?}",
                header,
                err
            );
        }
    }

    #[test]
    fn test_trailing_data() {
        let mut data = sample();
        data.extend_from_slice(b"extra ");
        let err = read_dictionary(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, LoadError::TrailingData(4)));

        let mut data = sample();
        data.extend_from_slice(b"\n\n  ");
        assert!(read_dictionary(Cursor::new(data)).is_ok());
    }

    #[test]
    fn test_duplicate_word() {
        let entries: [(&str, &[f32]); 2] = [("a", &[1.0]), ("a", &[2.0])];
        let data = encode(1, &entries);
        let err = read_dictionary(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateWord(w) if w == "a"));
    }

    #[test]
    fn test_non_finite_vector_rejected() {
        for bad in [f32::NAN, f32::INFINITY] {
            let entries: [(&str, &[f32]); 3] =
                [("a", &[1.0, 0.0]), ("bad", &[bad, 1.0]), ("b", &[0.9, 0.1])];
            let err = read_dictionary(Cursor::new(encode(2, &entries))).unwrap_err();
            assert!(matches!(err, LoadError::InvalidVector { word } if word == "bad"));
        }
    }

    #[test]
    fn test_invalid_utf8_word() {
        let mut data = b"1 1\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b' ']);
        data.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read_dictionary(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, LoadError::InvalidWord { index: 0, .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&sample()).unwrap();
        file.flush().unwrap();

        let store = EmbeddingStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EmbeddingStore::load(dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
