//! HTTP-style chunked body encoding used for multipart details

use std::io::Write;

use super::{Cursor, ProtocolError};

/// Write `bytes` as a single chunk followed by the terminating empty chunk
pub fn encode(bytes: &[u8], out: &mut impl Write) -> std::io::Result<()> {
    if !bytes.is_empty() {
        write!(out, "{:X}\r\n", bytes.len())?;
        out.write_all(bytes)?;
    }
    out.write_all(b"0\r\n")
}

/// Read chunks from the cursor until the terminating empty chunk
pub fn decode(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, ProtocolError> {
    let mut body = Vec::new();
    loop {
        let line = cursor.read_line().ok_or(ProtocolError::UnexpectedEof)?;
        let header = std::str::from_utf8(line)
            .map_err(|_| ProtocolError::InvalidChunkHeader(String::from_utf8_lossy(line).into()))?
            .trim_end_matches(['\r', '\n']);
        let len = usize::from_str_radix(header, 16)
            .map_err(|_| ProtocolError::InvalidChunkHeader(header.to_string()))?;
        if len == 0 {
            return Ok(body);
        }
        let chunk = cursor.read_exact(len).ok_or(ProtocolError::UnexpectedEof)?;
        body.extend_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let mut out = Vec::new();
        encode(b"hello\n", &mut out).unwrap();
        assert_eq!(out, b"6\r\nhello\n0\r\n");

        let mut out = Vec::new();
        encode(b"", &mut out).unwrap();
        assert_eq!(out, b"0\r\n");
    }

    #[test]
    fn test_decode_multiple_chunks() {
        let input = b"3\r\nabc4\r\n]\r\nx0\r\ntrailer";
        let mut cursor = Cursor::new(input);
        assert_eq!(decode(&mut cursor).unwrap(), b"abc]\r\nx");
        assert_eq!(cursor.read_line(), Some(&b"trailer"[..]));
    }

    #[test]
    fn test_decode_truncated() {
        let mut cursor = Cursor::new(b"A\r\nshort");
        assert!(matches!(
            decode(&mut cursor),
            Err(ProtocolError::UnexpectedEof)
        ));
    }
}
