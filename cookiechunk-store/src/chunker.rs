//! Splitting, recombining and deleting values stored across size-bounded named entries.
//!
//! A value whose percent-encoded form fits within the size limit is stored as-is under its key.
//! Anything larger is split into chunks named `key.0`, `key.1`, ... and reassembled by reading
//! those names in order until the first one that is missing.

use std::{borrow::Cow, future::Future};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default maximum encoded size of a single chunk.
///
/// This leaves room for the cookie name and attributes within the 4096 byte limit most browsers
/// impose on a single cookie.
pub const MAX_CHUNK_SIZE: usize = 3180;

/// The default upper bound on the number of chunk indices visited when reading or deleting.
pub const DEFAULT_MAX_CHUNKS: usize = 1024;

/// Characters left unescaped, matching the unreserved set of URI components.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Length of a single `%XX` escape triplet.
const ESCAPE_LEN: usize = 3;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A single named storage entry holding a slice of a larger value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The name the chunk is stored under. Either the bare key or `key.{index}`.
    pub name: String,

    /// The decoded slice of the value.
    pub value: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Chunk {
    /// Creates a new `Chunk`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the name of the chunk at `index` for the logical `key`.
pub fn chunk_name(key: &str, index: usize) -> String {
    format!("{key}.{index}")
}

/// Returns the length of `value` once percent-encoded, which is the size a text based store
/// ends up holding.
pub fn encoded_len(value: &str) -> usize {
    utf8_percent_encode(value, URI_COMPONENT).map(str::len).sum()
}

/// Splits `value` into chunks whose percent-encoded size does not exceed `size_limit`.
///
/// If the whole value fits, a single chunk named `key` holding the value is returned. Otherwise
/// the chunks are named `key.0` through `key.N`. Chunk boundaries never fall inside an escape
/// triplet or a multi-byte character. When `size_limit` is too small to hold even one encoded
/// character, that character gets a chunk of its own.
///
/// # Errors
///
/// Returns `StoreError::InvalidChunkSize` if `size_limit` is zero.
pub fn split_chunks(key: &str, value: &str, size_limit: usize) -> StoreResult<Vec<Chunk>> {
    if size_limit == 0 {
        return Err(StoreError::InvalidChunkSize);
    }

    let encoded = utf8_percent_encode(value, URI_COMPONENT).to_string();
    if encoded.len() <= size_limit {
        return Ok(vec![Chunk::new(key, value)]);
    }

    let mut chunks = Vec::new();
    let mut remaining = encoded.as_str();
    while !remaining.is_empty() {
        let (head, decoded) = next_head(remaining, size_limit)?;
        chunks.push(Chunk::new(chunk_name(key, chunks.len()), decoded));
        remaining = &remaining[head.len()..];
    }

    tracing::trace!(key, chunks = chunks.len(), "split value into chunks");

    Ok(chunks)
}

/// Reassembles the value stored under `key`.
///
/// `retrieve` is called with the bare key first. If that is present it is the whole value.
/// Otherwise `key.0`, `key.1`, ... are retrieved one at a time in ascending order and
/// concatenated until the first missing index. Empty values count as missing.
///
/// Returns `None` if neither the bare key nor `key.0` is present.
///
/// # Errors
///
/// Any error from `retrieve` is returned unchanged. `StoreError::ChunkLimitExceeded` is returned
/// if more than `max_chunks` chunks are found.
pub async fn combine_chunks<F, Fut>(
    key: &str,
    mut retrieve: F,
    max_chunks: usize,
) -> StoreResult<Option<String>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<Option<String>>>,
{
    if let Some(value) = present(retrieve(key.to_string()).await?) {
        return Ok(Some(value));
    }

    let mut value = String::new();
    let mut found = 0;
    loop {
        match present(retrieve(chunk_name(key, found)).await?) {
            Some(_) if found == max_chunks => {
                return Err(StoreError::ChunkLimitExceeded {
                    key: key.to_string(),
                    limit: max_chunks,
                })
            }
            Some(chunk) => {
                value.push_str(&chunk);
                found += 1;
            }
            None => break,
        }
    }

    tracing::trace!(key, chunks = found, "combined chunks");

    Ok((found > 0).then_some(value))
}

/// Removes every entry stored for `key`.
///
/// If the bare key is present only that entry is removed. Otherwise `key.0`, `key.1`, ... are
/// checked in ascending order up to the first missing index, and then each one found is removed
/// in the same order. This is the same traversal [`combine_chunks`] uses, so whatever a read can
/// see a delete removes.
///
/// # Errors
///
/// Errors from `retrieve` or `remove` are returned unchanged. `StoreError::ChunkLimitExceeded`
/// is returned if more than `max_chunks` chunks are found, in which case nothing is removed.
pub async fn delete_chunks<F, Fut, R, RFut>(
    key: &str,
    mut retrieve: F,
    mut remove: R,
    max_chunks: usize,
) -> StoreResult<()>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<Option<String>>>,
    R: FnMut(String) -> RFut,
    RFut: Future<Output = StoreResult<()>>,
{
    if present(retrieve(key.to_string()).await?).is_some() {
        return remove(key.to_string()).await;
    }

    delete_chunks_from(key, 0, retrieve, remove, max_chunks).await
}

/// Removes the chunks of `key` starting at index `start`, leaving lower indices and the bare key
/// alone.
///
/// Indices are checked in ascending order up to the first missing one before anything is
/// removed. Used to clear the trailing chunks of an older, longer value after a shorter one was
/// written over it.
///
/// # Errors
///
/// Errors from `retrieve` or `remove` are returned unchanged. `StoreError::ChunkLimitExceeded`
/// is returned, with nothing removed, if a chunk is found at index `max_chunks` or above.
pub async fn delete_chunks_from<F, Fut, R, RFut>(
    key: &str,
    start: usize,
    mut retrieve: F,
    mut remove: R,
    max_chunks: usize,
) -> StoreResult<()>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<Option<String>>>,
    R: FnMut(String) -> RFut,
    RFut: Future<Output = StoreResult<()>>,
{
    let mut found = Vec::new();
    let mut index = start;
    loop {
        let name = chunk_name(key, index);
        if present(retrieve(name.clone()).await?).is_none() {
            break;
        }

        if index >= max_chunks {
            return Err(StoreError::ChunkLimitExceeded {
                key: key.to_string(),
                limit: max_chunks,
            });
        }

        found.push(name);
        index += 1;
    }

    for name in &found {
        remove(name.clone()).await?;
    }

    tracing::trace!(key, start, chunks = found.len(), "deleted chunks");

    Ok(())
}

/// Treats empty values the same as absent ones.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Finds the longest decodable prefix of `encoded` no longer than `size_limit`.
///
/// Returns the consumed encoded prefix along with its decoded form.
fn next_head(encoded: &str, size_limit: usize) -> StoreResult<(&str, String)> {
    // Encoded strings are pure ASCII so any byte offset is a char boundary.
    let mut head = &encoded[..size_limit.min(encoded.len())];

    if let Some(pos) = head.rfind('%') {
        if pos + ESCAPE_LEN > head.len() {
            head = &head[..pos];
        }
    }

    while !head.is_empty() {
        match decode(head) {
            Ok(decoded) => return Ok((head, decoded)),
            Err(_)
                if head.len() > ESCAPE_LEN
                    && head.as_bytes()[head.len() - ESCAPE_LEN] == b'%' =>
            {
                head = &head[..head.len() - ESCAPE_LEN];
            }
            Err(_) => break,
        }
    }

    // The limit cannot hold the next encoded character, so it goes out whole.
    let head = &encoded[..leading_char_len(encoded)?];
    Ok((head, decode(head)?))
}

/// Decodes a percent-encoded string, failing on truncated UTF-8 sequences.
fn decode(encoded: &str) -> StoreResult<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Returns the encoded length of the first character in `encoded`.
fn leading_char_len(encoded: &str) -> StoreResult<usize> {
    if !encoded.starts_with('%') {
        return Ok(1);
    }

    let lead = encoded
        .get(1..ESCAPE_LEN)
        .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        .ok_or_else(|| StoreError::Encoding(format!("malformed escape at start of {encoded:?}")))?;

    let width = match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => {
            return Err(StoreError::Encoding(format!(
                "invalid UTF-8 lead byte {lead:#04x}"
            )))
        }
    };

    let len = width * ESCAPE_LEN;
    if len > encoded.len() {
        return Err(StoreError::Encoding(format!(
            "truncated character at start of {encoded:?}"
        )));
    }

    Ok(len)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn into_map(chunks: &[Chunk]) -> HashMap<String, String> {
        chunks
            .iter()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }

    async fn combine_from(
        key: &str,
        entries: &HashMap<String, String>,
    ) -> StoreResult<Option<String>> {
        combine_chunks(
            key,
            |name| {
                let value = entries.get(&name).cloned();
                async move { Ok(value) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await
    }

    #[test]
    fn test_split_chunks_fits_in_one_entry() -> anyhow::Result<()> {
        let chunks = split_chunks("sb-auth-token", "hello world", MAX_CHUNK_SIZE)?;
        assert_eq!(chunks, vec![Chunk::new("sb-auth-token", "hello world")]);

        // The stored value is the original, not the encoded form.
        let chunks = split_chunks("k", "a b", 16)?;
        assert_eq!(chunks, vec![Chunk::new("k", "a b")]);

        Ok(())
    }

    #[test]
    fn test_split_chunks_empty_value() -> anyhow::Result<()> {
        let chunks = split_chunks("k", "", 1)?;
        assert_eq!(chunks, vec![Chunk::new("k", "")]);
        Ok(())
    }

    #[test]
    fn test_split_chunks_exact_limit_is_unchunked() -> anyhow::Result<()> {
        let value = "é".repeat(4);
        assert_eq!(encoded_len(&value), 24);

        let chunks = split_chunks("k", &value, 24)?;
        assert_eq!(chunks, vec![Chunk::new("k", value.as_str())]);

        let chunks = split_chunks("k", &value, 23)?;
        assert_eq!(chunks.len(), 2);

        Ok(())
    }

    #[test]
    fn test_split_chunks_zero_limit() {
        assert_eq!(
            split_chunks("k", "value", 0),
            Err(StoreError::InvalidChunkSize)
        );
    }

    #[test]
    fn test_split_chunks_large_ascii_value() -> anyhow::Result<()> {
        let value = "a".repeat(10_000);
        let chunks = split_chunks("k", &value, MAX_CHUNK_SIZE)?;

        let names: Vec<_> = chunks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["k.0", "k.1", "k.2", "k.3"]);
        assert_eq!(chunks[0].value.len(), 3180);
        assert_eq!(chunks[3].value.len(), 10_000 - 3 * 3180);

        let joined: String = chunks.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(joined, value);

        Ok(())
    }

    #[test_log::test]
    fn test_split_chunks_keeps_multibyte_character_together() -> anyhow::Result<()> {
        // "aaaa%E2%82%ACb": the limit falls between the bytes of the euro sign.
        let chunks = split_chunks("k", "aaaa€b", 10)?;
        assert_eq!(
            chunks,
            vec![Chunk::new("k.0", "aaaa"), Chunk::new("k.1", "€b")]
        );

        // "ab%E2%": the limit falls inside an escape triplet.
        let chunks = split_chunks("k", "ab€cd", 6)?;
        tracing::debug!(?chunks);
        assert_eq!(chunks[0], Chunk::new("k.0", "ab"));
        assert!(chunks.iter().all(|c| !c.value.is_empty()));

        let joined: String = chunks.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(joined, "ab€cd");

        Ok(())
    }

    #[test]
    fn test_split_chunks_limit_smaller_than_character() -> anyhow::Result<()> {
        let chunks = split_chunks("k", "a€b", 1)?;
        assert_eq!(
            chunks,
            vec![
                Chunk::new("k.0", "a"),
                Chunk::new("k.1", "€"),
                Chunk::new("k.2", "b"),
            ]
        );

        let chunks = split_chunks("k", "😀😀", 2)?;
        assert_eq!(
            chunks,
            vec![Chunk::new("k.0", "😀"), Chunk::new("k.1", "😀")]
        );

        Ok(())
    }

    #[test]
    fn test_split_chunks_respects_limit() -> anyhow::Result<()> {
        let value = "session=ÿ; café ☕ token/value+more".repeat(40);
        let chunks = split_chunks("k", &value, 50)?;

        for (index, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.name, chunk_name("k", index));
            assert!(encoded_len(&chunk.value) <= 50);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_combine_chunks_not_found() -> anyhow::Result<()> {
        let entries = HashMap::new();
        assert_eq!(combine_from("k", &entries).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_combine_chunks_prefers_unchunked_entry() -> anyhow::Result<()> {
        let mut visited = Vec::new();
        let value = combine_chunks(
            "k",
            |name| {
                visited.push(name.clone());
                async move { Ok(Some(format!("value of {name}"))) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await?;

        assert_eq!(value.as_deref(), Some("value of k"));
        assert_eq!(visited, ["k"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_combine_chunks_stops_at_gap() -> anyhow::Result<()> {
        let entries = HashMap::from([
            ("k.0".to_string(), "zero".to_string()),
            ("k.1".to_string(), "one".to_string()),
            ("k.3".to_string(), "three".to_string()),
        ]);

        assert_eq!(combine_from("k", &entries).await?.as_deref(), Some("zeroone"));

        Ok(())
    }

    #[tokio::test]
    async fn test_combine_chunks_empty_counts_as_missing() -> anyhow::Result<()> {
        let entries = HashMap::from([
            ("k".to_string(), String::new()),
            ("k.0".to_string(), "zero".to_string()),
            ("k.1".to_string(), String::new()),
            ("k.2".to_string(), "two".to_string()),
        ]);

        assert_eq!(combine_from("k", &entries).await?.as_deref(), Some("zero"));

        Ok(())
    }

    #[tokio::test]
    async fn test_combine_chunks_propagates_retrieve_error() {
        let result = combine_chunks(
            "k",
            |name| async move {
                if name == "k.1" {
                    Err(StoreError::custom(anyhow::anyhow!("store unavailable")))
                } else if name == "k" {
                    Ok(None)
                } else {
                    Ok(Some("chunk".to_string()))
                }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await;

        assert_eq!(
            result,
            Err(StoreError::custom(anyhow::anyhow!("store unavailable")))
        );
    }

    #[tokio::test]
    async fn test_combine_chunks_limit_exceeded() {
        let result = combine_chunks(
            "k",
            |name| async move { Ok((name != "k").then(|| "x".to_string())) },
            8,
        )
        .await;

        assert_eq!(
            result,
            Err(StoreError::ChunkLimitExceeded {
                key: "k".to_string(),
                limit: 8
            })
        );
    }

    #[tokio::test]
    async fn test_combine_chunks_exactly_at_limit() -> anyhow::Result<()> {
        let entries: HashMap<_, _> = (0..4)
            .map(|i| (chunk_name("k", i), i.to_string()))
            .collect();

        let value = combine_chunks(
            "k",
            |name| {
                let value = entries.get(&name).cloned();
                async move { Ok(value) }
            },
            4,
        )
        .await?;

        assert_eq!(value.as_deref(), Some("0123"));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_chunks_removes_every_chunk() -> anyhow::Result<()> {
        let chunks = split_chunks("k", &"x".repeat(100), 30)?;
        let mut entries = into_map(&chunks);
        entries.insert("other".to_string(), "untouched".to_string());

        let snapshot = entries.clone();
        let mut removed = Vec::new();
        delete_chunks(
            "k",
            |name| {
                let value = snapshot.get(&name).cloned();
                async move { Ok(value) }
            },
            |name| {
                removed.push(name);
                async { Ok(()) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await?;

        assert_eq!(removed, ["k.0", "k.1", "k.2", "k.3"]);

        for name in &removed {
            entries.remove(name);
        }
        assert_eq!(combine_from("k", &entries).await?, None);
        assert_eq!(entries.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_chunks_unchunked_entry() -> anyhow::Result<()> {
        let entries = HashMap::from([
            ("k".to_string(), "value".to_string()),
            ("k.0".to_string(), "stale".to_string()),
        ]);

        let mut removed = Vec::new();
        delete_chunks(
            "k",
            |name| {
                let value = entries.get(&name).cloned();
                async move { Ok(value) }
            },
            |name| {
                removed.push(name);
                async { Ok(()) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await?;

        assert_eq!(removed, ["k"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_chunks_stops_at_gap() -> anyhow::Result<()> {
        let entries = HashMap::from([
            ("k.0".to_string(), "zero".to_string()),
            ("k.2".to_string(), "two".to_string()),
        ]);

        let mut removed = Vec::new();
        delete_chunks(
            "k",
            |name| {
                let value = entries.get(&name).cloned();
                async move { Ok(value) }
            },
            |name| {
                removed.push(name);
                async { Ok(()) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await?;

        assert_eq!(removed, ["k.0"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_chunks_limit_exceeded_removes_nothing() {
        let mut removed = Vec::new();
        let result = delete_chunks(
            "k",
            |name| async move { Ok((name != "k").then(|| "x".to_string())) },
            |name| {
                removed.push(name);
                async { Ok(()) }
            },
            8,
        )
        .await;

        assert_eq!(
            result,
            Err(StoreError::ChunkLimitExceeded {
                key: "k".to_string(),
                limit: 8
            })
        );
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn test_delete_chunks_from_keeps_leading_chunks() -> anyhow::Result<()> {
        let entries: HashMap<_, _> = (0..5)
            .map(|i| (chunk_name("k", i), i.to_string()))
            .chain([("k".to_string(), "bare".to_string())])
            .collect();

        let mut removed = Vec::new();
        delete_chunks_from(
            "k",
            2,
            |name| {
                let value = entries.get(&name).cloned();
                async move { Ok(value) }
            },
            |name| {
                removed.push(name);
                async { Ok(()) }
            },
            DEFAULT_MAX_CHUNKS,
        )
        .await?;

        assert_eq!(removed, ["k.2", "k.3", "k.4"]);

        Ok(())
    }

    proptest! {
        #[test]
        fn test_split_then_combine_reproduces_value(value in "\\PC{0,200}", limit in 1usize..64) {
            let chunks = split_chunks("k", &value, limit).unwrap();

            if chunks.len() == 1 && chunks[0].name == "k" {
                prop_assert!(encoded_len(&value) <= limit);
            } else {
                for (index, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(&chunk.name, &chunk_name("k", index));
                    prop_assert!(!chunk.value.is_empty());
                }
            }

            let entries = into_map(&chunks);
            let combined = futures::executor::block_on(combine_from("k", &entries)).unwrap();
            if value.is_empty() {
                prop_assert_eq!(combined, None);
            } else {
                prop_assert_eq!(combined, Some(value));
            }
        }
    }
}
