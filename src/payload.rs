//! Synthetic payload generation.
//!
//! Builds lorem-ipsum style pseudo-text to an exact byte length and
//! persists it as the on-disk artifact the rest of the pipeline reads.

use bytes::Bytes;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Vocabulary for pseudo-text generation.
const WORDS: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "ad",
    "minim",
    "veniam",
    "quis",
    "nostrud",
    "exercitation",
    "ullamco",
    "laboris",
    "nisi",
    "aliquip",
    "ex",
    "ea",
    "commodo",
    "consequat",
    "duis",
    "aute",
    "irure",
    "in",
    "reprehenderit",
    "voluptate",
    "velit",
    "esse",
    "cillum",
    "fugiat",
    "nulla",
    "pariatur",
    "excepteur",
    "sint",
    "occaecat",
    "cupidatat",
    "non",
    "proident",
    "sunt",
    "culpa",
    "qui",
    "officia",
    "deserunt",
    "mollit",
    "anim",
    "id",
    "est",
    "laborum",
];

/// Words per generated sentence (inclusive bounds).
const SENTENCE_LEN: (usize, usize) = (5, 12);

/// Errors during payload generation
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to write payload artifact: {0}")]
    Write(#[from] std::io::Error),
}

/// Generate pseudo-text of exactly `size_bytes` bytes.
///
/// Sentences are appended until the accumulated UTF-8 byte length reaches
/// `size_bytes`, then the buffer is truncated at the raw byte boundary.
/// If the vocabulary ever contains multi-byte words the cut may land
/// inside a character; the payload is opaque binary to every consumer, so
/// the truncation is never re-aligned.
pub fn generate(size_bytes: usize) -> Bytes {
    let mut rng = rand::thread_rng();
    let mut text = String::with_capacity(size_bytes + 128);

    while text.len() < size_bytes {
        push_sentence(&mut text, &mut rng);
    }

    let mut buf = text.into_bytes();
    buf.truncate(size_bytes);

    debug!(bytes = buf.len(), "Payload generated");
    Bytes::from(buf)
}

/// Generate a payload and persist it to `path`.
///
/// The on-disk bytes are exactly the returned buffer; a write failure is
/// fatal and the file at `path` must be treated as untrustworthy.
pub fn generate_to_file(path: &Path, size_bytes: usize) -> Result<Bytes, GenerateError> {
    let payload = generate(size_bytes);
    fs::write(path, &payload)?;

    info!(path = %path.display(), bytes = payload.len(), "Payload artifact written");
    Ok(payload)
}

/// Append one sentence (capitalized, period-terminated, space-separated).
fn push_sentence<R: Rng>(text: &mut String, rng: &mut R) {
    let len = rng.gen_range(SENTENCE_LEN.0..=SENTENCE_LEN.1);

    for i in 0..len {
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                text.extend(first.to_uppercase());
                text.push_str(chars.as_str());
            }
        } else {
            text.push(' ');
            text.push_str(word);
        }
    }

    text.push_str(". ");
}
