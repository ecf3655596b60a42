/// Bounds-checked read cursor over one externally owned packet buffer.
///
/// `position() <= end()` holds at all times. The cursor keeps the mutable
/// borrow so later stages can rewrite fields at absolute offsets through
/// [`Cursor::buffer_mut`] without re-slicing the packet.
pub struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consumes `n` bytes and returns the offset they start at. The cursor
    /// does not move when fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> Option<usize> {
        if n > self.remaining() {
            return None;
        }
        let start = self.pos;
        self.pos += n;
        Some(start)
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Moves forward `n` bytes without requiring them to exist. Overshooting
    /// parks the cursor at the end, so the next read fails.
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.buf.len());
    }

    /// Moves back to an earlier position.
    pub fn rewind(&mut self, to: usize) {
        self.pos = to.min(self.pos);
    }

    pub fn buffer(&self) -> &[u8] {
        &*self.buf
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut *self.buf
    }

    pub fn into_inner(self) -> &'a mut [u8] {
        self.buf
    }
}

pub(crate) fn u16_at(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn set_u16_at(buf: &mut [u8], offset: usize, value: u16) -> bool {
    match offset
        .checked_add(2)
        .and_then(|end| buf.get_mut(offset..end))
    {
        Some(slot) => {
            slot.copy_from_slice(&value.to_be_bytes());
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_only_on_success() {
        let mut data = [0u8; 10];
        let mut cursor = Cursor::new(&mut data);

        assert_eq!(cursor.take(4), Some(0));
        assert_eq!(cursor.take(4), Some(4));
        assert_eq!(cursor.take(4), None);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.take(2), Some(8));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_advance_clamps_to_end() {
        let mut data = [1u8; 5];
        let mut cursor = Cursor::new(&mut data);

        cursor.advance(3);
        assert_eq!(cursor.peek_u8(), Some(1));
        cursor.advance(usize::MAX);
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.peek_u8(), None);
    }

    #[test]
    fn test_u16_helpers_reject_out_of_bounds() {
        let mut data = [0x12, 0x34, 0x56];
        assert_eq!(u16_at(&data, 0), Some(0x1234));
        assert_eq!(u16_at(&data, 2), None);
        assert_eq!(u16_at(&data, usize::MAX), None);

        assert!(set_u16_at(&mut data, 1, 0xabcd));
        assert_eq!(data, [0x12, 0xab, 0xcd]);
        assert!(!set_u16_at(&mut data, 2, 0xffff));
        assert_eq!(data, [0x12, 0xab, 0xcd]);
    }
}
