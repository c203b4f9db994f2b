// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Little-endian cursor over a program image.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{LoadError, Malformed};

/// Reads fixed-width fields, reporting truncation against the section being read.
pub(crate) struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Current byte offset.
    pub(crate) fn offset(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Bytes not yet consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.offset())
    }

    /// Builds an error located at the current offset.
    pub(crate) fn malformed(&self, reason: Malformed) -> LoadError {
        self.malformed_at(self.offset(), reason)
    }

    pub(crate) fn malformed_at(&self, offset: usize, reason: Malformed) -> LoadError {
        LoadError::MalformedProgram { offset, reason }
    }

    pub(crate) fn u8(&mut self, section: &'static str) -> Result<u8, LoadError> {
        self.cursor
            .read_u8()
            .map_err(|_| self.malformed(Malformed::Truncated(section)))
    }

    pub(crate) fn u16(&mut self, section: &'static str) -> Result<u16, LoadError> {
        let start = self.offset();
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.malformed_at(start, Malformed::Truncated(section)))
    }

    pub(crate) fn u32(&mut self, section: &'static str) -> Result<u32, LoadError> {
        let start = self.offset();
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.malformed_at(start, Malformed::Truncated(section)))
    }

    /// The next u32 without consuming it, if four bytes remain.
    pub(crate) fn peek_u32(&self) -> Option<u32> {
        let mut ahead = self.cursor.clone();
        ahead.read_u32::<LittleEndian>().ok()
    }

    /// Borrows the next `len` bytes.
    pub(crate) fn bytes(&mut self, len: usize, section: &'static str) -> Result<&'a [u8], LoadError> {
        if len > self.remaining() {
            return Err(self.malformed(Malformed::Truncated(section)));
        }
        let start = self.offset();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// A u16-length Latin-1 string.
    pub(crate) fn string(&mut self, section: &'static str) -> Result<String, LoadError> {
        let len = self.u16(section)?;
        let raw = self.bytes(usize::from(len), section)?;
        Ok(raw.iter().map(|&b| char::from(b)).collect())
    }

    /// A u32 record count, refused above `limit`.
    pub(crate) fn count(&mut self, section: &'static str, limit: u32) -> Result<usize, LoadError> {
        let start = self.offset();
        let count = self.u32(section)?;
        if count > limit {
            return Err(self.malformed_at(
                start,
                Malformed::CountLimit {
                    section,
                    count,
                    limit,
                },
            ));
        }
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_fields() {
        let mut r = Reader::new(&[0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff]);
        assert_eq!(r.u16("t").unwrap(), 0x1234);
        assert_eq!(r.u32("t").unwrap(), 0x1234_5678);
        assert_eq!(r.u8("t").unwrap(), 0xff);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated_reports_section_start() {
        let mut r = Reader::new(&[1, 0, 2]);
        r.u16("header").unwrap();
        assert_eq!(
            r.u32("classes"),
            Err(LoadError::MalformedProgram {
                offset: 2,
                reason: Malformed::Truncated("classes"),
            })
        );
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut r = Reader::new(&[0x78, 0x56, 0x34, 0x12, 0x01]);
        assert_eq!(r.peek_u32(), Some(0x1234_5678));
        assert_eq!(r.offset(), 0);
        r.u16("t").unwrap();
        assert_eq!(r.peek_u32(), None);
        assert_eq!(r.offset(), 2);
    }

    #[test]
    fn test_latin1_string() {
        let mut r = Reader::new(&[3, 0, b'a', 0xe9, b'z']);
        assert_eq!(r.string("methods").unwrap(), "a\u{e9}z");
    }

    #[test]
    fn test_count_limit() {
        let mut r = Reader::new(&[0, 0, 1, 0]);
        assert!(matches!(
            r.count("variables", 100),
            Err(LoadError::MalformedProgram {
                reason: Malformed::CountLimit { count: 65536, .. },
                ..
            })
        ));
    }
}
