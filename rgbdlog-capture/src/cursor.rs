//! Position over the aligned frame index.

use crate::error::ReaderError;

/// A position in `[0, len]`. Position `len` means every frame has been visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCursor {
    position: usize,
    len: usize,
}

impl FrameCursor {
    pub fn new(len: usize) -> Self {
        Self { position: 0, len }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True while at least one frame after the current position remains.
    pub fn has_more(&self) -> bool {
        self.position + 1 < self.len
    }

    pub fn rewound(&self) -> bool {
        self.position == 0
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Take the frame at the current position and step past it.
    pub fn advance(&mut self) -> Result<usize, ReaderError> {
        if self.position >= self.len {
            return Err(self.out_of_range());
        }
        let index = self.position;
        self.position += 1;
        Ok(index)
    }

    /// Jump past the end and return the final frame.
    pub fn seek_end(&mut self) -> Result<usize, ReaderError> {
        if self.len == 0 {
            return Err(self.out_of_range());
        }
        self.position = self.len;
        Ok(self.len - 1)
    }

    fn out_of_range(&self) -> ReaderError {
        ReaderError::OutOfRange {
            position: self.position,
            frames: self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_more_boundaries() {
        let mut cursor = FrameCursor::new(7);
        assert!(cursor.has_more());
        for _ in 0..6 {
            cursor.advance().unwrap();
        }
        assert_eq!(cursor.position(), 6);
        assert!(!cursor.has_more());
    }

    #[test]
    fn test_advance_past_end_fails_without_moving() {
        let mut cursor = FrameCursor::new(2);
        assert_eq!(cursor.advance().unwrap(), 0);
        assert_eq!(cursor.advance().unwrap(), 1);
        assert!(matches!(
            cursor.advance(),
            Err(ReaderError::OutOfRange {
                position: 2,
                frames: 2
            })
        ));
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_seek_end_returns_last_frame() {
        let mut cursor = FrameCursor::new(5);
        cursor.advance().unwrap();
        assert_eq!(cursor.seek_end().unwrap(), 4);
        assert_eq!(cursor.position(), 5);
        assert!(!cursor.has_more());
    }

    #[test]
    fn test_empty_cursor() {
        let mut cursor = FrameCursor::new(0);
        assert!(cursor.is_empty());
        assert!(!cursor.has_more());
        assert!(cursor.advance().is_err());
        assert!(cursor.seek_end().is_err());
        assert!(cursor.rewound());
    }

    #[test]
    fn test_rewind() {
        let mut cursor = FrameCursor::new(3);
        cursor.seek_end().unwrap();
        assert!(!cursor.rewound());
        cursor.rewind();
        assert!(cursor.rewound());
        assert_eq!(cursor.position(), 0);
    }
}
