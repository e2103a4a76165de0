//! 上传文件的魔术字节校验

struct Signature {
    extensions: &'static [&'static str],
    mime: &'static str,
    matches: fn(&[u8]) -> bool,
}

const SIGNATURES: &[Signature] = &[
    Signature {
        extensions: &[".png"],
        mime: "image/png",
        matches: |d| d.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
    },
    Signature {
        extensions: &[".jpg", ".jpeg"],
        mime: "image/jpeg",
        matches: |d| d.starts_with(&[0xFF, 0xD8, 0xFF]),
    },
    Signature {
        extensions: &[".gif"],
        mime: "image/gif",
        matches: |d| d.starts_with(b"GIF87a") || d.starts_with(b"GIF89a"),
    },
    Signature {
        extensions: &[".webp"],
        mime: "image/webp",
        matches: |d| d.len() >= 12 && &d[0..4] == b"RIFF" && &d[8..12] == b"WEBP",
    },
    Signature {
        extensions: &[".pdf"],
        mime: "application/pdf",
        matches: |d| d.starts_with(b"%PDF"),
    },
    Signature {
        extensions: &[".docx", ".xlsx", ".pptx"],
        mime: "application/vnd.openxmlformats-officedocument",
        matches: |d| d.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
    },
    Signature {
        extensions: &[".txt", ".csv"],
        mime: "text/plain",
        matches: |d| std::str::from_utf8(d).is_ok(),
    },
];

/// 根据扩展名与文件头推断 MIME 类型，不匹配时返回 `None`
///
/// `extension` 包含点号，如 ".png"，大小写不敏感。
pub fn detect_mime(data: &[u8], extension: &str) -> Option<&'static str> {
    if data.is_empty() {
        return None;
    }

    let extension = extension.to_lowercase();
    SIGNATURES
        .iter()
        .find(|sig| sig.extensions.contains(&extension.as_str()))
        .filter(|sig| (sig.matches)(data))
        .map(|sig| sig.mime)
}

/// 验证文件内容的魔术字节是否与扩展名匹配
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    detect_mime(data, extension).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_mime(&png_header, ".PNG"), Some("image/png"));
        assert!(!validate_magic_bytes(&png_header, ".jpg"));
    }

    #[test]
    fn test_jpeg_magic() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0];
        assert!(validate_magic_bytes(&jpeg_header, ".jpg"));
        assert!(validate_magic_bytes(&jpeg_header, ".jpeg"));
    }

    #[test]
    fn test_webp_needs_full_header() {
        assert!(validate_magic_bytes(b"RIFF\x00\x00\x00\x00WEBPVP8 ", ".webp"));
        assert!(!validate_magic_bytes(b"RIFF", ".webp"));
    }

    #[test]
    fn test_pdf_renamed_as_image() {
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".png"));
        assert_eq!(detect_mime(b"%PDF-1.7", ".pdf"), Some("application/pdf"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".png"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
    }
}
