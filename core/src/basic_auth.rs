//! Basic authentication header encoding.
//!
//! The Base64 encoder is written out at the bit level so the header value is
//! always the standard alphabet with `=` padding and no line wrapping.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Standard Base64 encoding of `data`.
pub fn encode_base64(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let mut block = u32::from(chunk[0]) << 16;
        if let Some(&b) = chunk.get(1) {
            block |= u32::from(b) << 8;
        }
        if let Some(&b) = chunk.get(2) {
            block |= u32::from(b);
        }
        // n input bytes yield n + 1 significant symbols
        let symbols = chunk.len() + 1;
        for i in 0..4 {
            if i < symbols {
                let index = (block >> (18 - 6 * i)) & 0x3F;
                out.push(char::from(ALPHABET[index as usize]));
            } else {
                out.push('=');
            }
        }
    }
    out
}

/// Value for the `Authorization` header: `Basic base64(username:password)`.
pub fn header_value(username: &str, password: &str) -> String {
    format!("Basic {}", encode_base64(format!("{username}:{password}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vectors() {
        assert_eq!(encode_base64(b""), "");
        assert_eq!(encode_base64(b"f"), "Zg==");
        assert_eq!(encode_base64(b"fo"), "Zm8=");
        assert_eq!(encode_base64(b"foo"), "Zm9v");
        assert_eq!(encode_base64(b"foob"), "Zm9vYg==");
        assert_eq!(encode_base64(b"fooba"), "Zm9vYmE=");
        assert_eq!(encode_base64(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn uses_standard_alphabet_not_url_safe() {
        assert_eq!(encode_base64(&[0xFB, 0xFF, 0xBF]), "+/+/");
    }

    #[test]
    fn credentials_header() {
        assert_eq!(
            header_value("ausername", "mpassword"),
            "Basic YXVzZXJuYW1lOm1wYXNzd29yZA=="
        );
    }

    #[test]
    fn matches_reference_encoder() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        let data: Vec<u8> = (0..=64u8).map(|i| i.wrapping_mul(37) ^ 0xA5).collect();
        for len in 0..=data.len() {
            assert_eq!(encode_base64(&data[..len]), STANDARD.encode(&data[..len]), "length {len}");
        }
    }

    #[test]
    fn long_input_is_not_wrapped() {
        let encoded = encode_base64(&[0u8; 120]);
        assert_eq!(encoded.len(), 160);
        assert!(!encoded.contains('\n'));
    }
}
