//! Knuth-Morris-Pratt substring search over rope bytes: forward, backward,
//! and all-matches, plus a streaming variant for callers driving a rope
//! cursor instead of holding a materialized byte slice.

/// A match's half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: u64,
    pub end: u64,
}

/// The KMP failure function (longest proper prefix that is also a suffix,
/// for every prefix of `needle`).
fn failure_table(needle: &[u8]) -> Vec<usize> {
    let mut table = vec![0usize; needle.len()];
    let mut k = 0usize;
    for i in 1..needle.len() {
        while k > 0 && needle[k] != needle[i] {
            k = table[k - 1];
        }
        if needle[k] == needle[i] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

/// All (possibly overlapping) occurrences of `needle` in `haystack`, in
/// ascending order. Empty `needle` matches nowhere.
pub fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<Match> {
    if needle.is_empty() {
        return Vec::new();
    }
    let table = failure_table(needle);
    let mut matches = Vec::new();
    let mut k = 0usize;
    for (i, &b) in haystack.iter().enumerate() {
        while k > 0 && needle[k] != b {
            k = table[k - 1];
        }
        if needle[k] == b {
            k += 1;
        }
        if k == needle.len() {
            let end = i as u64 + 1;
            matches.push(Match {
                start: end - needle.len() as u64,
                end,
            });
            k = table[k - 1];
        }
    }
    matches
}

/// First occurrence of `needle` at or after byte offset `from`.
pub fn find_forward_from(haystack: &[u8], needle: &[u8], from: u64) -> Option<Match> {
    let from = (from as usize).min(haystack.len());
    if needle.is_empty() || from + needle.len() > haystack.len() {
        return None;
    }
    find_all(&haystack[from..], needle)
        .into_iter()
        .next()
        .map(|m| Match {
            start: m.start + from as u64,
            end: m.end + from as u64,
        })
}

/// Last occurrence of `needle` that ends at or before byte offset `before`.
pub fn find_backward_from(haystack: &[u8], needle: &[u8], before: u64) -> Option<Match> {
    let before = (before as usize).min(haystack.len());
    if needle.is_empty() {
        return None;
    }
    find_all(&haystack[..before], needle).into_iter().last()
}

/// Streaming forward search over any byte source (e.g. a rope cursor's
/// `read_byte`), for callers who don't want to materialize the whole rope.
/// Returns the match's start/end as byte counts from the start of `source`.
pub fn find_forward_streaming<I: Iterator<Item = u8>>(
    source: I,
    needle: &[u8],
) -> Option<Match> {
    if needle.is_empty() {
        return None;
    }
    let table = failure_table(needle);
    let mut k = 0usize;
    for (i, b) in source.enumerate() {
        while k > 0 && needle[k] != b {
            k = table[k - 1];
        }
        if needle[k] == b {
            k += 1;
        }
        if k == needle.len() {
            let end = i as u64 + 1;
            return Some(Match {
                start: end - needle.len() as u64,
                end,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_all_overlapping_matches() {
        let matches = find_all(b"aaaa", b"aa");
        assert_eq!(
            matches,
            vec![
                Match { start: 0, end: 2 },
                Match { start: 1, end: 3 },
                Match { start: 2, end: 4 },
            ]
        );
    }

    #[test]
    fn forward_from_skips_earlier_matches() {
        let hay = b"ababab";
        assert_eq!(
            find_forward_from(hay, b"ab", 1),
            Some(Match { start: 2, end: 4 })
        );
    }

    #[test]
    fn backward_from_finds_last_match_before_cutoff() {
        let hay = b"ababab";
        assert_eq!(
            find_backward_from(hay, b"ab", 4),
            Some(Match { start: 2, end: 4 })
        );
    }

    #[test]
    fn streaming_matches_slice_based_search() {
        let hay = b"the quick brown fox";
        let streamed = find_forward_streaming(hay.iter().copied(), b"brown");
        let sliced = find_forward_from(hay, b"brown", 0);
        assert_eq!(streamed, sliced);
    }

    #[test]
    fn empty_needle_matches_nothing() {
        assert!(find_all(b"abc", b"").is_empty());
        assert_eq!(find_forward_from(b"abc", b"", 0), None);
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(find_all(b"abc", b"xyz").is_empty());
    }
}
