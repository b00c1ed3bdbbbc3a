use binrw::binread;

use crate::TsxtVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Diffuse,
    Normal,
    Cubemap,
    Brdf,
    Other(u8),
}

impl From<u8> for TextureKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Diffuse,
            1 => Self::Normal,
            6 => Self::Cubemap,
            12 => Self::Brdf,
            v => Self::Other(v),
        }
    }
}

/// One entry of the texture table.
#[binread]
#[br(big, import(version: TsxtVersion))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// Stored per record but never checked against anything.
    pub checksum: [u8; 16],

    #[br(temp)]
    path_len: u16,
    /// Non-empty for textures that live outside this archive.
    #[br(map = |v: Vec<u8>| String::from_utf8_lossy(&v).into_owned(), count = path_len as usize)]
    pub path: String,

    #[br(temp)]
    name_len: u16,
    #[br(map = |v: Vec<u8>| String::from_utf8_lossy(&v).into_owned(), count = name_len as usize)]
    pub name: String,

    #[br(map = |v: u8| TextureKind::from(v))]
    pub kind: TextureKind,

    #[br(if(version == TsxtVersion::V0E))]
    pub extended: Option<ExtendedRecordInfo>,
}

/// Fields only present in version 0xE tables.
#[binread]
#[br(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRecordInfo {
    pub unk0: u8,
    pub unk1: u8,
    pub mipmap_count: i16,

    #[br(temp)]
    object_id_len: u16,
    #[br(map = |v: Vec<u8>| String::from_utf8_lossy(&v).into_owned(), count = object_id_len as usize)]
    pub object_id: String,

    pub unk2: u8,
}

impl TextureRecord {
    pub fn is_external(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn is_cubemap(&self) -> bool {
        self.kind == TextureKind::Cubemap
    }

    pub fn mipmap_hint(&self) -> Option<i16> {
        self.extended.as_ref().map(|e| e.mipmap_count)
    }

    pub fn object_id(&self) -> Option<&str> {
        self.extended.as_ref().map(|e| e.object_id.as_str())
    }

    /// Name used for the extracted file, without extension.
    ///
    /// Bare names (lightmaps are all just called "Lightmap") get the record
    /// index appended so they don't overwrite each other.
    pub fn output_name(&self, index: usize) -> String {
        if self.name.contains(&['\\', '/'][..]) {
            self.name.clone()
        } else {
            format!("{}.{index}", self.name)
        }
    }
}
