//! Texture table of a `.wiiu_textures` archive.
//!
//! ## Layout
//! ```text
//! u32 BE   header offset, relative to the end of this field
//! ...      (skipped)
//! u32 BE   header size, the data region starts this many bytes after this field
//! ".CC4TSXT"
//! u32 BE   1
//! "TSXT"
//! u32 BE   version, 0xC or 0xE
//! u32 BE   length + conversion date string
//! "ROTV"
//! u32 BE   record count
//! records  see `TextureRecord`
//! ```

use std::io::{Read, Seek, SeekFrom};

use binrw::BinReaderExt;
use tracing::{debug, trace};

use crate::io::ReaderExt;
use crate::{Error, Result, TextureRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsxtVersion {
    V0C,
    /// Adds mip count, object id and a few flags to every record.
    V0E,
}

impl TryFrom<u32> for TsxtVersion {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0xC => Ok(Self::V0C),
            0xE => Ok(Self::V0E),
            v => Err(Error::UnsupportedVersion(v)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TsxtArchive {
    pub version: TsxtVersion,
    pub records: Vec<TextureRecord>,
    /// Absolute offset of the first embedded DDS file.
    pub data_offset: u64,
}

impl TsxtArchive {
    /// Decodes the texture table and leaves `r` at the start of the data region.
    ///
    /// `r` must be positioned at the start of the archive.
    pub fn parse<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let header_offset: u32 = r.read_be()?;
        r.seek(SeekFrom::Current(header_offset as i64))?;

        let header_size: u32 = r.read_be()?;
        let data_offset = r.stream_position()? + header_size as u64;

        expect_marker(r, ".CC4TSXT", b".CC4TSXT")?;
        expect_marker(r, "format marker 0x1", &1u32.to_be_bytes())?;
        expect_marker(r, "TSXT", b"TSXT")?;

        let version = TsxtVersion::try_from(r.read_be::<u32>()?)?;
        let conversion_date = r.read_long_pascal_string()?;
        debug!("TSXT version {version:?}, converted {conversion_date}");

        expect_marker(r, "ROTV", b"ROTV")?;
        let record_count: u32 = r.read_be()?;

        let mut records = Vec::new();
        for index in 0..record_count as usize {
            let record: TextureRecord = r.read_be_args((version,))?;
            trace!(
                "Record {index}: '{}' checksum {}",
                record.name,
                hex::encode(record.checksum)
            );
            records.push(record);
        }

        r.seek(SeekFrom::Start(data_offset))?;

        Ok(Self {
            version,
            records,
            data_offset,
        })
    }
}

fn expect_marker<R: Read, const N: usize>(
    r: &mut R,
    marker: &'static str,
    expected: &[u8; N],
) -> Result<()> {
    let mut found = [0u8; N];
    r.read_exact(&mut found)?;
    if &found != expected {
        return Err(Error::BadMarker {
            marker,
            found: found.to_vec(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::TextureKind;

    fn pascal(s: &str) -> Vec<u8> {
        let mut v = (s.len() as u16).to_be_bytes().to_vec();
        v.extend_from_slice(s.as_bytes());
        v
    }

    /// Table with the given records, `padding` unknown bytes before the
    /// header and `gap` bytes between the table and the data region.
    fn table(version: u32, records: &[Vec<u8>], padding: usize, gap: usize) -> Vec<u8> {
        let mut header = b".CC4TSXT".to_vec();
        header.extend_from_slice(&1u32.to_be_bytes());
        header.extend_from_slice(b"TSXT");
        header.extend_from_slice(&version.to_be_bytes());
        header.extend_from_slice(&10u32.to_be_bytes());
        header.extend_from_slice(b"2016-09-27");
        header.extend_from_slice(b"ROTV");
        header.extend_from_slice(&(records.len() as u32).to_be_bytes());
        for r in records {
            header.extend_from_slice(r);
        }
        header.extend(std::iter::repeat(0xEE).take(gap));

        let mut v = (padding as u32).to_be_bytes().to_vec();
        v.extend(std::iter::repeat(0x11).take(padding));
        v.extend_from_slice(&(header.len() as u32).to_be_bytes());
        v.extend(header);
        v
    }

    fn record(path: &str, name: &str, kind: u8, extended: bool) -> Vec<u8> {
        let mut v = vec![0x5A; 16];
        v.extend(pascal(path));
        v.extend(pascal(name));
        v.push(kind);
        if extended {
            v.extend_from_slice(&[0, 1]);
            v.extend_from_slice(&9i16.to_be_bytes());
            v.extend(pascal("OBJ"));
            v.push(2);
        }
        v
    }

    #[test]
    fn parses_old_version_table() {
        let data = table(
            0xC,
            &[
                record("", "Lightmap", 0, false),
                record("", "Lightmap", 0, false),
            ],
            0,
            0,
        );
        let len = data.len() as u64;
        let mut c = Cursor::new(data);

        let archive = TsxtArchive::parse(&mut c).unwrap();
        assert_eq!(archive.version, TsxtVersion::V0C);
        assert_eq!(archive.records.len(), 2);
        assert!(archive.records.iter().all(|r| r.extended.is_none()));
        assert_eq!(archive.data_offset, len);
        assert_eq!(c.position(), len);
    }

    #[test]
    fn parses_new_version_table() {
        let data = table(
            0xE,
            &[
                record("", "CHARS\\HERO_DIF", 0, true),
                record("/SHARED/SKY", "", 6, true),
            ],
            0,
            0,
        );
        let archive = TsxtArchive::parse(&mut Cursor::new(data)).unwrap();

        assert_eq!(archive.version, TsxtVersion::V0E);
        assert_eq!(archive.records[0].name, "CHARS\\HERO_DIF");
        assert_eq!(archive.records[0].mipmap_hint(), Some(9));
        assert_eq!(archive.records[0].object_id(), Some("OBJ"));
        assert_eq!(archive.records[1].kind, TextureKind::Cubemap);
        assert!(archive.records[1].is_external());
    }

    #[test]
    fn data_region_follows_header_size() {
        let data = table(0xE, &[record("", "A", 0, true)], 6, 24);
        let len = data.len() as u64;
        let mut c = Cursor::new(data);

        let archive = TsxtArchive::parse(&mut c).unwrap();
        assert_eq!(archive.data_offset, len);
        assert_eq!(c.position(), len);
    }

    #[test]
    fn rejects_bad_markers() {
        let good = table(0xE, &[], 0, 0);

        let mut bad_magic = good.clone();
        bad_magic[8..16].copy_from_slice(b".CC4TXTS");
        match TsxtArchive::parse(&mut Cursor::new(bad_magic)) {
            Err(Error::BadMarker { marker, found }) => {
                assert_eq!(marker, ".CC4TSXT");
                assert_eq!(found, b".CC4TXTS");
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut bad_format = good.clone();
        bad_format[19] = 2;
        assert!(matches!(
            TsxtArchive::parse(&mut Cursor::new(bad_format)),
            Err(Error::BadMarker {
                marker: "format marker 0x1",
                ..
            })
        ));

        let mut bad_rotv = good;
        let rotv = bad_rotv.len() - 8;
        bad_rotv[rotv..rotv + 4].copy_from_slice(b"VTOR");
        assert!(matches!(
            TsxtArchive::parse(&mut Cursor::new(bad_rotv)),
            Err(Error::BadMarker { marker: "ROTV", .. })
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let data = table(0xD, &[], 0, 0);
        assert!(matches!(
            TsxtArchive::parse(&mut Cursor::new(data)),
            Err(Error::UnsupportedVersion(0xD))
        ));
    }

    #[test]
    fn truncated_table_is_an_error() {
        let mut data = table(0xE, &[record("", "A", 0, true)], 0, 0);
        data.truncate(data.len() - 3);
        assert!(TsxtArchive::parse(&mut Cursor::new(data)).is_err());
    }
}
