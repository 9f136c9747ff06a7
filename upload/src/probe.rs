//! Clip duration from container headers.
//!
//! Supported containers:
//! - ISO-BMFF (`mp4`, `mov`): `moov/mvhd` timescale and duration, version 0
//!   (32-bit) and version 1 (64-bit)
//! - RIFF AVI: `hdrl/avih` microseconds per frame times total frames
//!
//! Anything else, or a malformed header, yields `None`.

use std::time::Duration;

/// Read the playback duration of a clip from its container header.
pub fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"AVI " {
        return avi_duration(&bytes[12..]);
    }
    let moov = find_box(bytes, b"moov")?;
    let mvhd = find_box(moov, b"mvhd")?;
    mvhd_duration(mvhd)
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let word = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes(word.try_into().ok()?))
}

fn be_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let word = bytes.get(at..at.checked_add(8)?)?;
    Some(u64::from_be_bytes(word.try_into().ok()?))
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let word = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes(word.try_into().ok()?))
}

/// Payload of the first child box of type `kind` within `bytes`.
fn find_box<'a>(bytes: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    let mut offset = 0usize;
    while offset + 8 <= bytes.len() {
        let size32 = be_u32(bytes, offset)?;
        let box_type = &bytes[offset + 4..offset + 8];
        let (header, size) = match size32 {
            0 => (8, bytes.len() - offset),
            1 => (16, usize::try_from(be_u64(bytes, offset + 8)?).ok()?),
            n => (8, n as usize),
        };
        if size < header {
            return None;
        }
        let end = offset.checked_add(size)?;
        if end > bytes.len() {
            return None;
        }
        if box_type == kind {
            return Some(&bytes[offset + header..end]);
        }
        offset = end;
    }
    None
}

fn mvhd_duration(mvhd: &[u8]) -> Option<Duration> {
    let version = *mvhd.first()?;
    let (timescale, units) = match version {
        0 => {
            let units = be_u32(mvhd, 16)?;
            if units == u32::MAX {
                return None;
            }
            (be_u32(mvhd, 12)?, u64::from(units))
        }
        1 => {
            let units = be_u64(mvhd, 24)?;
            if units == u64::MAX {
                return None;
            }
            (be_u32(mvhd, 20)?, units)
        }
        _ => return None,
    };
    if timescale == 0 {
        return None;
    }
    let micros = u128::from(units) * 1_000_000 / u128::from(timescale);
    Some(Duration::from_micros(u64::try_from(micros).ok()?))
}

/// Walk RIFF chunks (after the `RIFF....AVI ` header) to `LIST hdrl / avih`.
fn avi_duration(chunks: &[u8]) -> Option<Duration> {
    let hdrl = riff_chunks(chunks).find_map(|(id, data)| {
        (id == b"LIST" && data.starts_with(b"hdrl")).then(|| &data[4..])
    })?;
    let avih = riff_chunks(hdrl).find_map(|(id, data)| (id == b"avih").then_some(data))?;
    let usec_per_frame = le_u32(avih, 0)?;
    let total_frames = le_u32(avih, 16)?;
    if usec_per_frame == 0 || total_frames == 0 {
        return None;
    }
    Some(Duration::from_micros(
        u64::from(usec_per_frame) * u64::from(total_frames),
    ))
}

fn riff_chunks(bytes: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    let mut offset = 0usize;
    std::iter::from_fn(move || {
        let id = bytes.get(offset..offset + 4)?;
        let size = le_u32(bytes, offset + 4)? as usize;
        let start = offset + 8;
        let data = bytes.get(start..start.checked_add(size)?)?;
        // chunks are padded to even length
        offset = start + size + (size & 1);
        Some((id, data))
    })
}
