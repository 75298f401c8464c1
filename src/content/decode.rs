//! Best-effort decoding of post files written by other editors

use encoding_rs::GBK;

/// Decode file bytes as text
///
/// UTF-8 first (a leading BOM is dropped). Bytes that are not valid UTF-8 are
/// retried as GBK and used only if they decode without errors; otherwise the
/// lossy UTF-8 reading wins.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(utf8_err) => {
            if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
                tracing::debug!("Decoded {} bytes as GBK ({})", bytes.len(), utf8_err);
                return text.into_owned();
            }
            tracing::debug!("Falling back to lossy UTF-8: {}", utf8_err);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(decode_text("标题: 你好".as_bytes()), "标题: 你好");
    }

    #[test]
    fn test_strips_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBF---\ntitle: x\n---\n"), "---\ntitle: x\n---\n");
    }

    #[test]
    fn test_gbk_fallback() {
        let (bytes, _, had_errors) = GBK.encode("---\ntitle: 分类测试\n---\n正文");
        assert!(!had_errors);
        assert_eq!(decode_text(&bytes), "---\ntitle: 分类测试\n---\n正文");
    }

    #[test]
    fn test_undecodable_bytes_are_lossy() {
        let text = decode_text(&[b'a', 0xFF]);
        assert!(text.starts_with('a'));
        assert!(text.contains('\u{FFFD}'));
    }
}
