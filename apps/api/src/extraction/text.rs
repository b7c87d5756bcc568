use encoding_rs::GB18030;

use super::{DocumentFormat, ExtractError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes a plain-text upload. UTF-8 first; Windows editors in mainland China
/// still save as GBK, so GB18030 (a superset) is tried before giving up.
pub fn decode_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(ExtractError::Unreadable {
            format: DocumentFormat::PlainText,
            reason: "text is neither valid UTF-8 nor GB18030".to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passes_through() {
        assert_eq!(decode_text("熟悉 FastAPI".as_bytes()).unwrap(), "熟悉 FastAPI");
    }

    #[test]
    fn test_bom_is_dropped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("简历".as_bytes());
        assert_eq!(decode_text(&bytes).unwrap(), "简历");
    }

    #[test]
    fn test_gbk_falls_back() {
        let (encoded, _, unmappable) = encoding_rs::GBK.encode("张三 字节跳动实习");
        assert!(!unmappable);
        assert!(std::str::from_utf8(&encoded).is_err());
        assert_eq!(decode_text(&encoded).unwrap(), "张三 字节跳动实习");
    }

    #[test]
    fn test_undecodable_bytes_are_unreadable() {
        // 0xFF never appears in UTF-8 and is not a GB18030 lead byte.
        let err = decode_text(&[0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable { .. }));
    }
}
