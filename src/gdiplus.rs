/*
 * Thin GDI+ drawing surface over the device context of a paint cycle. The
 * library itself is started and stopped by the window (see
 * `Platform::graphics_startup`); a `Graphics` only lives for one draw
 * callback and releases its native object on drop.
 */
use crate::controls::styling_handler::color_to_argb;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::platform::PaintSession;
use crate::types::{Color, Point, Rect};

use std::ffi::c_void;
use std::ptr::null_mut;

use windows::Win32::Graphics::Gdi::HDC;
use windows::Win32::Graphics::GdiPlus::{
    GdipCreateFromHDC, GdipCreatePen1, GdipCreateSolidFill, GdipDeleteBrush, GdipDeleteGraphics,
    GdipDeletePen, GdipDrawLinesI, GdipFillRectangleI, GdipGraphicsClear, GdipSetSmoothingMode,
    GpGraphics, GpPen, GpSolidFill, Point as GpPoint, SmoothingModeAntiAlias, Status, UnitPixel,
};

use log::warn;

fn check(status: Status, call: &str) -> PlatformResult<()> {
    if status.0 == 0 {
        Ok(())
    } else {
        Err(PlatformError::OperationFailed(format!(
            "{call} failed with status {}",
            status.0
        )))
    }
}

pub struct Graphics {
    raw: *mut GpGraphics,
}

impl Graphics {
    /// Wraps the device context of an open paint cycle.
    pub fn from_paint(session: &PaintSession) -> PlatformResult<Self> {
        let hdc = HDC(session.device_context() as *mut c_void);
        let mut raw = null_mut();
        check(unsafe { GdipCreateFromHDC(hdc, &mut raw) }, "GdipCreateFromHDC")?;
        Ok(Self { raw })
    }

    pub fn set_antialias(&self) -> PlatformResult<()> {
        check(
            unsafe { GdipSetSmoothingMode(self.raw, SmoothingModeAntiAlias) },
            "GdipSetSmoothingMode",
        )
    }

    pub fn clear(&self, color: Color) -> PlatformResult<()> {
        check(
            unsafe { GdipGraphicsClear(self.raw, color_to_argb(&color)) },
            "GdipGraphicsClear",
        )
    }

    pub fn draw_line(
        &self,
        color: Color,
        width: f32,
        from: Point,
        to: Point,
    ) -> PlatformResult<()> {
        self.draw_lines(color, width, &[from, to])
    }

    /// Draws a connected polyline through `points`.
    pub fn draw_lines(&self, color: Color, width: f32, points: &[Point]) -> PlatformResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let native: Vec<GpPoint> = points
            .iter()
            .map(|point| GpPoint {
                X: point.x,
                Y: point.y,
            })
            .collect();

        let mut pen: *mut GpPen = null_mut();
        check(
            unsafe { GdipCreatePen1(color_to_argb(&color), width, UnitPixel, &mut pen) },
            "GdipCreatePen1",
        )?;
        let drawn = check(
            unsafe { GdipDrawLinesI(self.raw, pen, native.as_ptr(), native.len() as i32) },
            "GdipDrawLinesI",
        );
        unsafe { GdipDeletePen(pen) };
        drawn
    }

    pub fn fill_rectangle(&self, color: Color, area: Rect) -> PlatformResult<()> {
        let mut brush: *mut GpSolidFill = null_mut();
        check(
            unsafe { GdipCreateSolidFill(color_to_argb(&color), &mut brush) },
            "GdipCreateSolidFill",
        )?;
        let filled = check(
            unsafe {
                GdipFillRectangleI(
                    self.raw,
                    brush.cast(),
                    area.left,
                    area.top,
                    area.width(),
                    area.height(),
                )
            },
            "GdipFillRectangleI",
        );
        unsafe { GdipDeleteBrush(brush.cast()) };
        filled
    }
}

impl Drop for Graphics {
    fn drop(&mut self) {
        let status = unsafe { GdipDeleteGraphics(self.raw) };
        if status.0 != 0 {
            warn!("GdiPlus: GdipDeleteGraphics failed with status {}", status.0);
        }
    }
}
