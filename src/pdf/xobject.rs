use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Error;

fn image_dict(width: u32, height: u32, color_space: &[u8], filter: &[u8]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.to_vec()));
    dict
}

/// Add `data` to the document as an image XObject and return its object id.
///
/// JPEGs in RGB or grey are passed through as DCT streams. Everything else is
/// decoded and stored Flate-compressed, with a soft mask when any pixel is
/// not fully opaque.
pub(crate) fn embed_image(doc: &mut Document, data: &[u8]) -> Result<ObjectId, Error> {
    let format = image::guess_format(data).map_err(|e| Error::ImageDecode(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| Error::ImageDecode(e.to_string()))?;
    let (w, h) = (decoded.width(), decoded.height());

    if format == image::ImageFormat::Jpeg {
        let color_space: Option<&[u8]> = match decoded.color() {
            image::ColorType::Rgb8 => Some(b"DeviceRGB"),
            image::ColorType::L8 => Some(b"DeviceGray"),
            _ => None,
        };
        if let Some(cs) = color_space {
            let dict = image_dict(w, h, cs, b"DCTDecode");
            return Ok(doc.add_object(Stream::new(dict, data.to_vec())));
        }
    }

    let rgba: image::RgbaImage = decoded.to_rgba8();
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let mut dict = image_dict(w, h, b"DeviceRGB", b"FlateDecode");
    if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask = image_dict(w, h, b"DeviceGray", b"FlateDecode");
        let mask_id = doc.add_object(Stream::new(mask, compressed_alpha));
        dict.set("SMask", Object::Reference(mask_id));
    }

    Ok(doc.add_object(Stream::new(dict, compressed_rgb)))
}
