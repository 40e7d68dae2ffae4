//! Chunk ID — `"<filename>.chunk.<index>"`, the reconstruction order key.

/// Default fixed chunk size used by client-side splitting (`libdfs`). The
/// wire protocol itself is agnostic to chunk size — a coordinator/node pair
/// never inspects chunk length, only the bytes and their digest — so this
/// is a client convention, not a CORE invariant.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Build the canonical chunk ID for `filename`'s chunk number `index`.
pub fn chunk_id(filename: &str, index: usize) -> String {
    format!("{filename}.chunk.{index}")
}

/// Split a chunk ID back into its filename and index.
///
/// Returns `None` if the ID doesn't end in `.chunk.<digits>`. Filenames may
/// themselves contain dots, so this splits from the right rather than the
/// left.
pub fn parse_chunk_id(chunk_id: &str) -> Option<(&str, usize)> {
    let (filename, tail) = chunk_id.rsplit_once(".chunk.")?;
    let index = tail.parse().ok()?;
    Some((filename, index))
}

/// The reconstruction order key for a chunk ID (the trailing index).
/// Falls back to 0 for malformed IDs so sorting never panics.
pub fn order_key(chunk_id: &str) -> usize {
    parse_chunk_id(chunk_id).map(|(_, i)| i).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_canonical_id() {
        assert_eq!(chunk_id("report.pdf", 3), "report.pdf.chunk.3");
    }

    #[test]
    fn parses_roundtrip() {
        let id = chunk_id("a.b.c", 12);
        assert_eq!(parse_chunk_id(&id), Some(("a.b.c", 12)));
    }

    #[test]
    fn parses_filenames_with_dots() {
        assert_eq!(
            parse_chunk_id("my.archive.tar.gz.chunk.0"),
            Some(("my.archive.tar.gz", 0))
        );
    }

    #[test]
    fn order_key_defaults_to_zero_on_garbage() {
        assert_eq!(order_key("not-a-chunk-id"), 0);
    }
}
