pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Paste one straight-alpha RGBA8 pixel onto another, using the source alpha as the mask.
///
/// All four channels are interpolated, so alpha 0 leaves `dst` untouched and alpha 255
/// replaces it.
pub(crate) fn mask_paste_rgba8(dst: &mut [u8], src: &[u8]) {
    let a = u16::from(src[3]);
    match a {
        0 => {}
        255 => dst[..4].copy_from_slice(&src[..4]),
        _ => {
            let inv = 255 - a;
            for c in 0..4 {
                let v = mul_div255_u16(u16::from(src[c]), a)
                    + mul_div255_u16(u16::from(dst[c]), inv);
                dst[c] = v.min(255) as u8;
            }
        }
    }
}

/// Flatten straight-alpha RGBA8 over an opaque background colour.
pub(crate) fn flatten_over_bg_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) {
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(bg[c], inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
