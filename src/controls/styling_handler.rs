/*
 * Conversions from the platform-agnostic `Color` into the packed formats the
 * native APIs expect: GDI `COLORREF` (0x00BBGGRR) and GDI+ ARGB (0xAARRGGBB).
 */

use crate::types::Color;

pub(crate) fn color_to_colorref(color: &Color) -> u32 {
    (color.r as u32) | ((color.g as u32) << 8) | ((color.b as u32) << 16)
}

pub(crate) fn color_to_argb(color: &Color) -> u32 {
    ((color.a as u32) << 24) | ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
}
