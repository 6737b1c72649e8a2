//! Small HEIC and MOV files for tests.
//!
//! Shared by the unit tests and, through `tests/common`, the integration
//! tests. The HEIC carries its size in an Exif item the way cameras write
//! it; the MOV is a `moov` with a movie header and no tracks.

#![allow(dead_code)]

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};

fn bx(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

fn full_box(kind: &[u8; 4], version: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![version, 0, 0, 0];
    body.extend_from_slice(payload);
    bx(kind, &body)
}

fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
    let mut payload = major.to_vec();
    payload.extend_from_slice(&0u32.to_be_bytes());
    for brand in compatible {
        payload.extend_from_slice(&brand[..]);
    }
    bx(b"ftyp", &payload)
}

/// Little-endian TIFF block holding the pixel dimensions.
fn exif_tiff(width: u32, height: u32) -> Vec<u8> {
    let fields = [
        Field {
            tag: Tag::ImageWidth,
            ifd_num: In::PRIMARY,
            value: Value::Long(vec![width]),
        },
        Field {
            tag: Tag::ImageLength,
            ifd_num: In::PRIMARY,
            value: Value::Long(vec![height]),
        },
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, true).unwrap();
    buf.into_inner()
}

/// `meta` with one Exif item stored at `offset`, `length` bytes long, or
/// with no items at all.
fn meta(exif_item: Option<(u32, u32)>) -> Vec<u8> {
    let mut hdlr = vec![0u8; 4];
    hdlr.extend_from_slice(b"pict");
    hdlr.extend_from_slice(&[0u8; 13]);

    let count = u16::from(exif_item.is_some());
    let mut iinf = count.to_be_bytes().to_vec();
    // offset_size 4, length_size 4, no base offset
    let mut iloc = 0x4400u16.to_be_bytes().to_vec();
    iloc.extend_from_slice(&count.to_be_bytes());

    if let Some((offset, length)) = exif_item {
        let mut infe = 1u16.to_be_bytes().to_vec();
        infe.extend_from_slice(&0u16.to_be_bytes());
        infe.extend_from_slice(b"Exif");
        infe.push(0);
        iinf.extend(full_box(b"infe", 2, &infe));

        iloc.extend_from_slice(&1u16.to_be_bytes());
        iloc.extend_from_slice(&0u16.to_be_bytes());
        iloc.extend_from_slice(&1u16.to_be_bytes());
        iloc.extend_from_slice(&offset.to_be_bytes());
        iloc.extend_from_slice(&length.to_be_bytes());
    }

    let mut children = full_box(b"hdlr", 0, &hdlr);
    children.extend(full_box(b"iinf", 0, &iinf));
    children.extend(full_box(b"iloc", 0, &iloc));
    full_box(b"meta", 0, &children)
}

/// A HEIF image whose Exif block records `width` x `height`.
pub fn heic(width: u32, height: u32) -> Vec<u8> {
    // Exif item: offset to the TIFF header, then the TIFF block
    let mut item = 0u32.to_be_bytes().to_vec();
    item.extend(exif_tiff(width, height));

    let head = ftyp(b"heic", &[b"mif1", b"heic"]);
    let meta_len = meta(Some((0, 0))).len();
    let offset = (head.len() + meta_len + 8) as u32;

    let mut out = head;
    out.extend(meta(Some((offset, item.len() as u32))));
    out.extend(bx(b"mdat", &item));
    out
}

/// A HEIF image without any Exif item.
pub fn heic_without_exif() -> Vec<u8> {
    let mut out = ftyp(b"heic", &[b"mif1", b"heic"]);
    out.extend(meta(None));
    out.extend(bx(b"mdat", &[0u8; 16]));
    out
}

/// Version 0 `mvhd` box.
fn mvhd(timescale: u32, duration: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 8];
    payload.extend_from_slice(&timescale.to_be_bytes());
    payload.extend_from_slice(&duration.to_be_bytes());
    // rate 1.0, volume 1.0
    payload.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    payload.extend_from_slice(&0x0100u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 10]);
    payload.extend_from_slice(&[0u8; 36]);
    payload.extend_from_slice(&[0u8; 24]);
    payload.extend_from_slice(&2u32.to_be_bytes());
    full_box(b"mvhd", 0, &payload)
}

/// A QuickTime movie whose header declares `duration` ticks of `timescale`.
pub fn mov_with_timescale(timescale: u32, duration: u32) -> Vec<u8> {
    let mut out = ftyp(b"qt  ", &[b"qt  "]);
    out.extend(bx(b"moov", &mvhd(timescale, duration)));
    out
}

/// A QuickTime movie lasting `seconds`.
pub fn mov(seconds: u32) -> Vec<u8> {
    mov_with_timescale(600, seconds * 600)
}

/// A QuickTime file with media data but no `moov`.
pub fn mov_without_moov() -> Vec<u8> {
    let mut out = ftyp(b"qt  ", &[b"qt  "]);
    out.extend(bx(b"mdat", &[0u8; 8]));
    out
}
