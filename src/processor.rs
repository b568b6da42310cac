use crate::error::{FindoraError, Result};
use crate::search::{Match, SearchOptions};
use encoding_rs::Encoding;
use log::debug;
use memchr::memmem;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const BINARY_CHECK_SIZE: usize = 8000;

/// Matches found in one file, along with how many bytes were read to find them.
#[derive(Debug, Default)]
pub struct ScannedFile {
    pub matches: Vec<Match>,
    pub bytes_read: u64,
}

/// A NUL byte in the leading block marks content as binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(BINARY_CHECK_SIZE)];
    memchr::memchr(0, head).is_some()
}

/// Decode file bytes as text.
///
/// A UTF-8/UTF-16 BOM selects the encoding; otherwise the content must be
/// valid UTF-8 and free of NUL bytes in its leading block. Anything else is
/// treated as binary and returns `None`.
pub fn decode(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return if had_errors { None } else { Some(text) };
    }
    if is_binary(bytes) {
        return None;
    }
    std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
}

/// Read `path` and collect every occurrence of the query.
///
/// Binary, undecodable and oversized files produce no matches. Only failure
/// to stat or read the file is an error, and it is always
/// [`FindoraError::EntryUnreadable`].
pub fn scan_file(path: &Path, options: &SearchOptions) -> Result<ScannedFile> {
    if let Some(max_size) = options.max_file_size() {
        let metadata = fs::metadata(path).map_err(|source| FindoraError::EntryUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > max_size {
            debug!(
                "Skipping large file ({} bytes): {}",
                metadata.len(),
                path.display()
            );
            return Ok(ScannedFile::default());
        }
    }

    let bytes = fs::read(path).map_err(|source| FindoraError::EntryUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes_read = bytes.len() as u64;

    let Some(text) = decode(&bytes) else {
        debug!("Skipping binary file: {}", path.display());
        return Ok(ScannedFile {
            matches: Vec::new(),
            bytes_read,
        });
    };

    Ok(ScannedFile {
        matches: find_matches(
            &text,
            options.query(),
            options.case_sensitive(),
            options.context_lines(),
        ),
        bytes_read,
    })
}

/// Fold one character for case-insensitive comparison. Characters whose
/// lowercase form is more than one character are kept as-is so that folded
/// text stays aligned character-for-character with the source.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(fold_char).collect())
    }
}

/// Find every non-overlapping occurrence of `query` in `text`, line by line.
///
/// `column` is a character offset into the line; `matched_text` and
/// `context` keep the source casing. Both `\n` and `\r\n` end a line.
pub fn find_matches(
    text: &str,
    query: &str,
    case_sensitive: bool,
    context_lines: usize,
) -> Vec<Match> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = fold(query, case_sensitive);
    let needle_chars = query.chars().count();
    let finder = memmem::Finder::new(needle.as_bytes());
    let lines: Vec<&str> = text.lines().collect();
    let mut matches = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let haystack = fold(line, case_sensitive);
        let bytes = haystack.as_bytes();

        let mut pos = 0;
        let mut counted_bytes = 0;
        let mut counted_chars = 0;
        let mut offsets: Option<Vec<usize>> = None;
        let mut context: Option<String> = None;

        while let Some(found) = finder.find(&bytes[pos..]) {
            let start = pos + found;
            counted_chars += haystack[counted_bytes..start].chars().count();
            counted_bytes = start;
            let column = counted_chars;

            let offsets = offsets.get_or_insert_with(|| char_offsets(line));
            let matched_text = line[offsets[column]..offsets[column + needle_chars]].to_string();
            let context = context
                .get_or_insert_with(|| context_window(&lines, index, context_lines))
                .clone();

            matches.push(Match {
                line_number: index + 1,
                column,
                context,
                matched_text,
            });

            pos = start + needle.len();
        }
    }

    matches
}

/// Byte offset of every character in `line`, plus the end of the line.
fn char_offsets(line: &str) -> Vec<usize> {
    line.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .collect()
}

fn context_window(lines: &[&str], index: usize, context_lines: usize) -> String {
    let start = index.saturating_sub(context_lines);
    let end = (index + context_lines + 1).min(lines.len());
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn finds_non_overlapping_matches_in_order() {
        let matches = find_matches("foo bar foo", "foo", true, 0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].column, 0);
        assert_eq!(matches[1].column, 8);
        assert!(matches.iter().all(|m| m.matched_text == "foo"));
        assert!(matches.iter().all(|m| m.line_number == 1));
    }

    #[test]
    fn overlapping_candidates_resume_after_match() {
        let matches = find_matches("aaaa", "aa", true, 0);
        let columns: Vec<usize> = matches.iter().map(|m| m.column).collect();
        assert_eq!(columns, vec![0, 2]);
    }

    #[test]
    fn case_insensitive_keeps_source_casing() {
        let matches = find_matches("Foo bar FOO", "fOo", false, 0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].matched_text, "Foo");
        assert_eq!(matches[1].matched_text, "FOO");
        assert_eq!(matches[1].column, 8);
    }

    #[test]
    fn case_sensitive_ignores_other_casings() {
        assert!(find_matches("FOO Foo", "foo", true, 0).is_empty());
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let matches = find_matches("héllo wörld wörld", "wörld", true, 0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].column, 6);
        assert_eq!(matches[1].column, 12);
        assert_eq!(matches[0].matched_text, "wörld");
    }

    #[test]
    fn case_insensitive_multibyte() {
        let matches = find_matches("ÉCOLE école", "école", false, 0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].matched_text, "ÉCOLE");
        assert_eq!(matches[1].column, 6);
    }

    #[test]
    fn crlf_and_lf_are_both_line_breaks() {
        let matches = find_matches("one\r\ntwo needle\nthree\r\nneedle", "needle", true, 0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line_number, 2);
        assert_eq!(matches[0].column, 4);
        assert_eq!(matches[0].context, "two needle");
        assert_eq!(matches[1].line_number, 4);
        assert_eq!(matches[1].context, "needle");
    }

    #[test]
    fn context_window_is_clamped_at_file_edges() {
        let text = "l1\nl2 hit\nl3\nl4\nl5 hit";
        let matches = find_matches(text, "hit", true, 2);
        assert_eq!(matches[0].context, "l1\nl2 hit\nl3\nl4");
        assert_eq!(matches[1].context, "l3\nl4\nl5 hit");
    }

    #[test]
    fn empty_query_finds_nothing() {
        assert!(find_matches("anything", "", true, 0).is_empty());
    }

    #[test]
    fn decode_handles_boms_and_binary() {
        assert_eq!(decode(b"plain").as_deref(), Some("plain"));
        assert_eq!(decode(b"\xEF\xBB\xBFbom").as_deref(), Some("bom"));
        assert_eq!(decode(b"\xFF\xFEh\x00i\x00").as_deref(), Some("hi"));
        assert_eq!(decode(b"\xFE\xFF\x00h\x00i").as_deref(), Some("hi"));
        assert_eq!(decode(b"text\x00more"), None);
        assert_eq!(decode(b"\xC3\x28 invalid"), None);
        assert_eq!(decode(b"").as_deref(), Some(""));
    }

    #[test]
    fn scan_file_reads_matches_and_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "foo bar foo").unwrap();

        let options = SearchOptions::new("foo", ["txt"]).unwrap();
        let scanned = scan_file(&path, &options).unwrap();
        assert_eq!(scanned.matches.len(), 2);
        assert_eq!(scanned.bytes_read, 11);
    }

    #[test]
    fn scan_file_skips_binary_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"foo\x00\x01\x02foo").unwrap();

        let options = SearchOptions::new("foo", ["txt"]).unwrap();
        assert!(scan_file(&path, &options).unwrap().matches.is_empty());
    }

    #[test]
    fn scan_file_skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "foo ".repeat(64)).unwrap();

        let options = SearchOptions::new("foo", ["txt"])
            .unwrap()
            .with_max_file_size(Some(16));
        assert!(scan_file(&path, &options).unwrap().matches.is_empty());
    }

    #[test]
    fn scan_file_reports_missing_file_as_soft_error() {
        let dir = TempDir::new().unwrap();
        let options = SearchOptions::new("foo", ["txt"]).unwrap();
        let err = scan_file(&dir.path().join("gone.txt"), &options).unwrap_err();
        assert!(matches!(err, FindoraError::EntryUnreadable { .. }));
        assert!(!err.is_hard());
    }
}
