use crate::shared::constants::MJPEG_BOUNDARY;
use crate::shared::encoded_buffer::EncodedBuffer;

/// `Content-Type` of the whole MJPEG response.
pub fn stream_content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={MJPEG_BOUNDARY}")
}

/// One multipart chunk: boundary line, part headers, the JPEG bytes and a
/// trailing CRLF.
pub fn encode_part(buffer: &EncodedBuffer) -> Vec<u8> {
    let header = format!(
        "--{MJPEG_BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-length: {}\r\n\r\n",
        buffer.len()
    );
    let mut part = Vec::with_capacity(header.len() + buffer.len() + 2);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(buffer.as_bytes());
    part.extend_from_slice(b"\r\n");
    part
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_layout() {
        let part = encode_part(&EncodedBuffer::new(vec![0xFF, 0xD8, 0xFF]));
        let mut expected =
            b"--frame\r\nContent-Type: image/jpeg\r\nContent-length: 3\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(part, expected);
    }

    #[test]
    fn test_content_type_names_boundary() {
        assert_eq!(
            stream_content_type(),
            "multipart/x-mixed-replace; boundary=frame"
        );
    }
}
