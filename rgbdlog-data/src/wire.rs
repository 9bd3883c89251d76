//! Primitive readers and writers for ROS message serialisation.
//!
//! ROS1 payloads are packed little-endian with no padding. CDR payloads (ROS 2)
//! start with a 4-byte encapsulation header, may be either byte order, and pad
//! every primitive to its natural alignment measured from the end of that header.

use crate::msg::MessageError;

/// Serialisation format of a message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// ROS1 message serialisation.
    Ros1,
    /// OMG CDR with encapsulation header.
    Cdr,
}

pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    origin: usize,
    aligned: bool,
    little_endian: bool,
    nul_terminated: bool,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(buf: &'a [u8], format: WireFormat) -> Result<Self, MessageError> {
        match format {
            WireFormat::Ros1 => Ok(Self {
                buf,
                pos: 0,
                origin: 0,
                aligned: false,
                little_endian: true,
                nul_terminated: false,
            }),
            WireFormat::Cdr => {
                if buf.len() < 4 {
                    return Err(MessageError::Truncated {
                        offset: 0,
                        needed: 4,
                    });
                }
                let little_endian = match u16::from_be_bytes([buf[0], buf[1]]) {
                    0x0000 => false,
                    0x0001 => true,
                    other => return Err(MessageError::Encapsulation(other)),
                };
                Ok(Self {
                    buf,
                    pos: 4,
                    origin: 4,
                    aligned: true,
                    little_endian,
                    nul_terminated: true,
                })
            }
        }
    }

    fn align_to(&mut self, size: usize) {
        if self.aligned {
            let rel = self.pos - self.origin;
            self.pos += (size - rel % size) % size;
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], MessageError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(MessageError::Truncated {
                offset: self.pos,
                needed: len,
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], MessageError> {
        self.align_to(N);
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, MessageError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn bool(&mut self) -> Result<bool, MessageError> {
        Ok(self.u8()? != 0)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, MessageError> {
        let b = self.array::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    pub(crate) fn i32(&mut self) -> Result<i32, MessageError> {
        let b = self.array::<4>()?;
        Ok(if self.little_endian {
            i32::from_le_bytes(b)
        } else {
            i32::from_be_bytes(b)
        })
    }

    pub(crate) fn f64(&mut self) -> Result<f64, MessageError> {
        let b = self.array::<8>()?;
        Ok(if self.little_endian {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }

    pub(crate) fn string(&mut self) -> Result<String, MessageError> {
        let len = self.u32()? as usize;
        let mut bytes = self.take(len)?;
        if self.nul_terminated {
            if let [head @ .., 0] = bytes {
                bytes = head;
            }
        }
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// A length-prefixed byte sequence, borrowed from the payload.
    pub(crate) fn bytes(&mut self) -> Result<&'a [u8], MessageError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    pub(crate) fn f64_seq(&mut self) -> Result<Vec<f64>, MessageError> {
        let len = self.u32()? as usize;
        if len.saturating_mul(8) > self.buf.len() - self.pos {
            return Err(MessageError::Truncated {
                offset: self.pos,
                needed: len.saturating_mul(8),
            });
        }
        (0..len).map(|_| self.f64()).collect()
    }

    pub(crate) fn f64_array<const N: usize>(&mut self) -> Result<[f64; N], MessageError> {
        let mut out = [0.0; N];
        for v in out.iter_mut() {
            *v = self.f64()?;
        }
        Ok(out)
    }
}

/// Packed little-endian writer producing ROS1 payloads.
#[derive(Default)]
pub(crate) struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn string(&mut self, v: &str) {
        self.bytes(v.as_bytes());
    }

    pub(crate) fn bytes(&mut self, v: &[u8]) {
        self.u32(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdr_alignment_after_header() {
        // encapsulation, u8, 3 pad bytes, u32 = 7, 4 pad bytes, f64 = 1.5
        let mut buf = vec![0x00, 0x01, 0x00, 0x00, 0xAB, 0, 0, 0];
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&[0; 4]);
        buf.extend_from_slice(&1.5f64.to_le_bytes());

        let mut r = WireReader::new(&buf, WireFormat::Cdr).unwrap();
        assert_eq!(r.u8().unwrap(), 0xAB);
        assert_eq!(r.u32().unwrap(), 7);
        assert_eq!(r.f64().unwrap(), 1.5);
    }

    #[test]
    fn test_cdr_big_endian_string() {
        let mut buf = vec![0x00, 0x00, 0x00, 0x00];
        buf.extend_from_slice(&4u32.to_be_bytes());
        buf.extend_from_slice(b"abc\0");

        let mut r = WireReader::new(&buf, WireFormat::Cdr).unwrap();
        assert_eq!(r.string().unwrap(), "abc");
    }

    #[test]
    fn test_unknown_encapsulation() {
        let buf = [0x00, 0x0A, 0x00, 0x00];
        assert!(matches!(
            WireReader::new(&buf, WireFormat::Cdr),
            Err(MessageError::Encapsulation(0x000A))
        ));
    }

    #[test]
    fn test_ros1_truncated_bytes() {
        let mut w = WireWriter::default();
        w.u32(10);
        w.u8(1);
        let buf = w.finish();

        let mut r = WireReader::new(&buf, WireFormat::Ros1).unwrap();
        assert!(matches!(
            r.bytes(),
            Err(MessageError::Truncated { offset: 4, needed: 10 })
        ));
    }

    #[test]
    fn test_f64_seq_rejects_huge_length() {
        let mut w = WireWriter::default();
        w.u32(u32::MAX);
        let buf = w.finish();

        let mut r = WireReader::new(&buf, WireFormat::Ros1).unwrap();
        assert!(r.f64_seq().is_err());
    }
}
