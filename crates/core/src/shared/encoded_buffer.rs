use std::sync::Arc;

/// One compressed image, immutable once produced.
///
/// Clones share the same allocation, so handing a buffer to many readers
/// costs a reference-count bump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBuffer {
    bytes: Arc<[u8]>,
}

impl EncodedBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both handles point at the same allocation.
    #[cfg(test)]
    pub(crate) fn shares_storage_with(&self, other: &EncodedBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_matches_content() {
        let buf = EncodedBuffer::new(vec![1, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_bytes(), &[1, 2, 3]);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_clone_shares_storage() {
        let buf = EncodedBuffer::new(vec![9; 16]);
        let cloned = buf.clone();
        assert!(buf.shares_storage_with(&cloned));
        assert!(!buf.shares_storage_with(&EncodedBuffer::new(vec![9; 16])));
    }
}
