//! `sensor_msgs/Image`

use super::{Header, MessageError};
use crate::wire::{WireFormat, WireReader, WireWriter};

/// An uncompressed image whose pixel bytes borrow from the message payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMessage<'a> {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    /// Pixel encoding tag, e.g. `rgb8`, `bgr8`, `32FC1`.
    pub encoding: String,
    pub is_bigendian: bool,
    /// Row length in bytes.
    pub step: u32,
    pub data: &'a [u8],
}

impl<'a> ImageMessage<'a> {
    /// Decode an image payload.
    pub fn decode(payload: &'a [u8], format: WireFormat) -> Result<Self, MessageError> {
        let mut r = WireReader::new(payload, format)?;
        let header = Header::read(&mut r, format)?;
        let height = r.u32()?;
        let width = r.u32()?;
        let encoding = r.string()?;
        let is_bigendian = r.bool()?;
        let step = r.u32()?;
        let data = r.bytes()?;

        Ok(Self {
            header,
            height,
            width,
            encoding,
            is_bigendian,
            step,
            data,
        })
    }

    /// Declared byte size: row stride times height.
    pub fn byte_size(&self) -> usize {
        self.step as usize * self.height as usize
    }

    pub(crate) fn write_ros1(&self, w: &mut WireWriter) {
        self.header.write_ros1(w);
        w.u32(self.height);
        w.u32(self.width);
        w.string(&self.encoding);
        w.bool(self.is_bigendian);
        w.u32(self.step);
        w.bytes(self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    fn cdr_image(little_endian: bool) -> Vec<u8> {
        let u32b = |v: u32| {
            if little_endian {
                v.to_le_bytes()
            } else {
                v.to_be_bytes()
            }
        };
        let mut buf = vec![0x00, little_endian as u8, 0x00, 0x00];
        buf.extend_from_slice(&u32b(12)); // sec
        buf.extend_from_slice(&u32b(500)); // nanosec
        buf.extend_from_slice(&u32b(4));
        buf.extend_from_slice(b"cam\0");
        buf.extend_from_slice(&u32b(1)); // height
        buf.extend_from_slice(&u32b(2)); // width
        buf.extend_from_slice(&u32b(5));
        buf.extend_from_slice(b"rgb8\0");
        buf.push(0); // is_bigendian
        buf.extend_from_slice(&[0, 0]); // pad to 4
        buf.extend_from_slice(&u32b(6)); // step
        buf.extend_from_slice(&u32b(6));
        buf.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        buf
    }

    #[test]
    fn test_decode_cdr_little_endian() {
        let buf = cdr_image(true);
        let img = ImageMessage::decode(&buf, WireFormat::Cdr).unwrap();
        assert_eq!(img.header.stamp, Timestamp::new(12, 500));
        assert_eq!(img.header.frame_id, "cam");
        assert_eq!((img.width, img.height, img.step), (2, 1, 6));
        assert_eq!(img.encoding, "rgb8");
        assert_eq!(img.data, &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_decode_cdr_big_endian() {
        let buf = cdr_image(false);
        let img = ImageMessage::decode(&buf, WireFormat::Cdr).unwrap();
        assert_eq!(img.header.stamp.as_nanos(), 12_000_000_500);
        assert_eq!(img.byte_size(), 6);
    }

    #[test]
    fn test_decode_truncated_payload() {
        let buf = cdr_image(true);
        let cut = &buf[..buf.len() - 2];
        assert!(matches!(
            ImageMessage::decode(cut, WireFormat::Cdr),
            Err(MessageError::Truncated { .. })
        ));
    }
}
