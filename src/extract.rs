use std::{
    fs::{self, File},
    io::{BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{debug, info, warn};
use wiiutex_texture::{detile_into, is_detile_eligible, Surface};
use wiiutex_tsxt::{
    io::ReaderExt, resolve_sub_image, sub_image::DDS_HEADER_SIZE, SubImageInfo, TextureRecord,
    TsxtArchive,
};

use crate::{directory::output_path, settings::ExtractSettings};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Every DDS file written, in table order.
    pub written: Vec<PathBuf>,
    /// Records that point outside the archive.
    pub external: usize,
    /// How many of the written files had their blocks reordered.
    pub detiled: usize,
}

/// A texture pulled out of an archive without writing it anywhere.
#[derive(Debug, Clone)]
pub struct RetrievedTexture {
    pub index: usize,
    pub record: TextureRecord,
    /// `None` for external references.
    pub info: Option<SubImageInfo>,
    /// The complete DDS file, header included.
    pub data: Option<Vec<u8>>,
}

pub fn extract(settings: &ExtractSettings) -> anyhow::Result<ExtractSummary> {
    let file = File::open(&settings.input)
        .with_context(|| format!("Failed to open {}", settings.input.display()))?;

    extract_archive(&mut BufReader::new(file), &settings.output, settings.detile)
        .with_context(|| format!("Failed to extract {}", settings.input.display()))
}

/// Writes every embedded texture of the archive in `r` below `output`.
pub fn extract_archive<R: Read + Seek>(
    r: &mut R,
    output: &Path,
    detile: bool,
) -> anyhow::Result<ExtractSummary> {
    let archive = TsxtArchive::parse(r).context("Failed to read texture table")?;
    let mut summary = ExtractSummary::default();

    info!("Extracting {} textures:", archive.records.len());
    for (index, record) in archive.records.iter().enumerate() {
        if record.is_external() {
            info!(
                "({index}) - {} - Nothing to extract (external reference)",
                record.path
            );
            summary.external += 1;
            continue;
        }

        let path = output_path(output, &record.output_name(index));
        let texture = load_texture(r, record, detile)
            .with_context(|| format!("Failed to load texture {index} ('{}')", record.name))?;

        if texture.detiled {
            info!("({index}) - {} - Deswizzling...", path.display());
            summary.detiled += 1;
        } else {
            info!("({index}) - {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &texture.data)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        summary.written.push(path);
    }

    info!("Done!");
    Ok(summary)
}

/// Decodes every record of the archive in `r`, detiling where possible.
pub fn read_textures<R: Read + Seek>(r: &mut R) -> anyhow::Result<Vec<RetrievedTexture>> {
    let archive = TsxtArchive::parse(r).context("Failed to read texture table")?;

    let mut textures = Vec::with_capacity(archive.records.len());
    for (index, record) in archive.records.into_iter().enumerate() {
        if record.is_external() {
            textures.push(RetrievedTexture {
                index,
                record,
                info: None,
                data: None,
            });
            continue;
        }

        let texture = load_texture(r, &record, true)
            .with_context(|| format!("Failed to load texture {index} ('{}')", record.name))?;
        textures.push(RetrievedTexture {
            index,
            record,
            info: Some(texture.info),
            data: Some(texture.data),
        });
    }

    Ok(textures)
}

struct LoadedTexture {
    info: SubImageInfo,
    data: Vec<u8>,
    detiled: bool,
}

/// Loads the DDS at the current position and leaves `r` right after it.
fn load_texture<R: Read + Seek>(
    r: &mut R,
    record: &TextureRecord,
    detile: bool,
) -> wiiutex_tsxt::Result<LoadedTexture> {
    let origin = r.stream_position()?;
    let cubemap = record.is_cubemap();

    let info = resolve_sub_image(r, cubemap)?;
    let mut data = r.load_segment(origin, info.byte_length as usize)?;
    r.seek(SeekFrom::Start(origin + info.byte_length))?;

    let detiled = detile
        && is_detile_eligible(info.width, info.height, cubemap)
        && detile_blocks(&info, &mut data);

    Ok(LoadedTexture {
        info,
        data,
        detiled,
    })
}

/// Reorders the block region of `data`, the DDS header is left as is.
fn detile_blocks(info: &SubImageInfo, data: &mut [u8]) -> bool {
    if !info.format.is_known() {
        warn!("DDS file uses unknown compression type - File may not have extracted correctly.");
        return false;
    }

    let header_size = DDS_HEADER_SIZE as usize;
    let Some(blocks) = data.get(header_size..) else {
        debug!("DDS span of 0x{:X} bytes has no block data", data.len());
        return false;
    };

    let surface = Surface {
        format: info.format,
        width: info.width,
        height: info.height,
        mipmap_count: info.mipmap_count,
        cubemap: false,
    };

    let tiled = blocks.to_vec();
    detile_into(&surface, &tiled, &mut data[header_size..]);
    true
}
