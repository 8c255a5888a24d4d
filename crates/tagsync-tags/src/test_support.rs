//! Ficheros de audio mínimos para los tests.

use std::{fs, path::Path};

use lofty::{
    ape::ApeTag,
    config::WriteOptions,
    id3::{v1::Id3v1Tag, v2::Id3v2Tag},
    tag::{Accessor, TagExt},
};

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// WAV PCM de 16 bits, mono, 44.1 kHz y una décima de segundo.
pub(crate) fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..4_410i32 {
        writer.write_sample(((i % 100) - 50) as i16 * 200).unwrap();
    }
    writer.finalize().unwrap();
}

/// Frames MPEG-1 Layer III a 128 kbps / 44.1 kHz sin contenido.
pub(crate) fn write_mp3(path: &Path) {
    const FRAME_LEN: usize = 417;
    let mut data = Vec::with_capacity(FRAME_LEN * 20);
    for _ in 0..20 {
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        data.resize(data.len() + FRAME_LEN - 4, 0);
    }
    fs::write(path, data).unwrap();
}

pub(crate) fn add_id3v2(path: &Path, artist: &str) {
    let mut tag = Id3v2Tag::default();
    tag.set_artist(artist.to_owned());
    tag.save_to_path(path, WriteOptions::default()).unwrap();
}

pub(crate) fn add_ape(path: &Path, artist: &str) {
    let mut tag = ApeTag::default();
    tag.set_artist(artist.to_owned());
    tag.save_to_path(path, WriteOptions::default()).unwrap();
}

pub(crate) fn add_id3v1(path: &Path, title: &str) {
    let mut tag = Id3v1Tag::default();
    tag.set_title(title.to_owned());
    tag.save_to_path(path, WriteOptions::default()).unwrap();
}

/// Antepone un ID3v2 con `artist` a lo que ya haya en `path`, como hacen
/// algunos programas con los FLAC.
pub(crate) fn prepend_id3v2(path: &Path, artist: &str) {
    let mut tag = Id3v2Tag::default();
    tag.set_artist(artist.to_owned());
    let mut bytes = Vec::new();
    tag.dump_to(&mut bytes, WriteOptions::default()).unwrap();
    bytes.extend(fs::read(path).unwrap());
    fs::write(path, bytes).unwrap();
}

fn block_header(out: &mut Vec<u8>, last: bool, block_type: u8, len: usize) {
    out.push(if last { 0x80 | block_type } else { block_type });
    out.extend_from_slice(&(len as u32).to_be_bytes()[1..]);
}

fn be_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// FLAC con STREAMINFO, un bloque de comentarios con `comments` (si hay
/// alguno), opcionalmente un bloque PICTURE (portada frontal, PNG), PADDING al
/// final y unos KiB con aspecto de frames de audio.
pub(crate) fn write_flac(path: &Path, comments: &[(&str, &str)], picture: Option<&[u8]>) {
    let mut out = b"fLaC".to_vec();

    let mut info = Vec::with_capacity(34);
    info.extend_from_slice(&4096u16.to_be_bytes());
    info.extend_from_slice(&4096u16.to_be_bytes());
    info.extend_from_slice(&[0; 6]);
    let packed: u64 = (44_100u64 << 44) | (1 << 41) | (15 << 36) | 44_100;
    info.extend_from_slice(&packed.to_be_bytes());
    info.extend_from_slice(&[0; 16]);
    block_header(&mut out, false, 0, info.len());
    out.extend_from_slice(&info);

    if !comments.is_empty() {
        let vendor = b"tagsync";
        let mut vc = Vec::new();
        vc.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
        vc.extend_from_slice(vendor);
        vc.extend_from_slice(&(comments.len() as u32).to_le_bytes());
        for (key, value) in comments {
            let entry = format!("{key}={value}");
            vc.extend_from_slice(&(entry.len() as u32).to_le_bytes());
            vc.extend_from_slice(entry.as_bytes());
        }
        block_header(&mut out, false, 4, vc.len());
        out.extend_from_slice(&vc);
    }

    if let Some(data) = picture {
        let mut pic = Vec::new();
        pic.extend_from_slice(&3u32.to_be_bytes());
        be_bytes(&mut pic, b"image/png");
        be_bytes(&mut pic, b"");
        for dim in [1u32, 1, 24, 0] {
            pic.extend_from_slice(&dim.to_be_bytes());
        }
        be_bytes(&mut pic, data);
        block_header(&mut out, false, 6, pic.len());
        out.extend_from_slice(&pic);
    }

    block_header(&mut out, true, 1, 64);
    out.resize(out.len() + 64, 0);

    for _ in 0..4 {
        out.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x08]);
        out.resize(out.len() + 1020, 0);
    }

    fs::write(path, out).unwrap();
}

fn chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

/// AIFF PCM de 16 bits, mono, 44.1 kHz y una décima de segundo de silencio.
pub(crate) fn write_aiff(path: &Path) {
    const FRAMES: u32 = 4_410;

    let mut comm = Vec::with_capacity(18);
    comm.extend_from_slice(&1u16.to_be_bytes());
    comm.extend_from_slice(&FRAMES.to_be_bytes());
    comm.extend_from_slice(&16u16.to_be_bytes());
    // 44100 en coma flotante extendida de 80 bits
    comm.extend_from_slice(&0x400Eu16.to_be_bytes());
    comm.extend_from_slice(&0xAC44_0000_0000_0000u64.to_be_bytes());

    let ssnd = vec![0; 8 + FRAMES as usize * 2];

    let mut body = b"AIFF".to_vec();
    chunk(&mut body, b"COMM", &comm);
    chunk(&mut body, b"SSND", &ssnd);

    let mut out = Vec::with_capacity(body.len() + 8);
    chunk(&mut out, b"FORM", &body);
    fs::write(path, out).unwrap();
}

fn ogg_crc(page: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in page {
        crc ^= u32::from(byte) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 { (crc << 1) ^ 0x04C1_1DB7 } else { crc << 1 };
        }
    }
    crc
}

/// Página Ogg con un único paquete de menos de 255 bytes.
fn ogg_page(out: &mut Vec<u8>, header_type: u8, granule: u64, sequence: u32, packet: &[u8]) {
    let start = out.len();
    out.extend_from_slice(b"OggS");
    out.push(0);
    out.push(header_type);
    out.extend_from_slice(&granule.to_le_bytes());
    out.extend_from_slice(&0x5441_4753u32.to_le_bytes());
    out.extend_from_slice(&sequence.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.push(1);
    out.push(packet.len() as u8);
    out.extend_from_slice(packet);
    let crc = ogg_crc(&out[start..]);
    out[start + 22..start + 26].copy_from_slice(&crc.to_le_bytes());
}

/// Ogg Opus estéreo de un segundo: cabecera, comentarios con `comments` y
/// una página de audio.
pub(crate) fn write_opus(path: &Path, comments: &[(&str, &str)]) {
    let mut head = b"OpusHead".to_vec();
    head.push(1);
    head.push(2);
    head.extend_from_slice(&0u16.to_le_bytes());
    head.extend_from_slice(&48_000u32.to_le_bytes());
    head.extend_from_slice(&0u16.to_le_bytes());
    head.push(0);

    let vendor = b"tagsync";
    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for (key, value) in comments {
        let entry = format!("{key}={value}");
        tags.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        tags.extend_from_slice(entry.as_bytes());
    }

    let mut out = Vec::new();
    ogg_page(&mut out, 0x02, 0, 0, &head);
    ogg_page(&mut out, 0x00, 0, 1, &tags);
    ogg_page(&mut out, 0x04, 48_000, 2, &[0xFC, 0xFF, 0xFE]);
    fs::write(path, out).unwrap();
}
