/*
 * Drawing surface bound to a window. During `WM_PAINT` the window asks its
 * canvas to run one paint cycle: begin, erase with the window background,
 * invoke the draw listener, end. On Windows the listener can wrap the
 * session's device context in `gdiplus::Graphics`.
 */
use crate::error::Result as PlatformResult;
use crate::platform::{Background, PaintSession, Platform};
use crate::types::NativeHandle;

use std::fmt;
use std::rc::Rc;

pub type DrawCallback = Rc<dyn Fn(&PaintSession)>;

#[derive(Clone, Default)]
pub struct Canvas {
    on_draw: Option<DrawCallback>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_on_draw_listener<F>(&mut self, on_draw: F)
    where
        F: Fn(&PaintSession) + 'static,
    {
        self.on_draw = Some(Rc::new(on_draw));
    }

    pub fn remove_on_draw_listener(&mut self) {
        self.on_draw = None;
    }

    pub fn has_listener(&self) -> bool {
        self.on_draw.is_some()
    }

    pub(crate) fn listener(&self) -> Option<DrawCallback> {
        self.on_draw.clone()
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("has_listener", &self.has_listener())
            .finish()
    }
}

/*
 * One paint cycle. The listener is passed in rather than read from a canvas
 * so the caller can release its borrow before user code runs.
 */
pub(crate) fn paint_cycle(
    platform: &dyn Platform,
    handle: NativeHandle,
    background: Background,
    listener: Option<DrawCallback>,
) -> PlatformResult<()> {
    let session = platform.begin_paint(handle)?;
    if background != Background::None {
        platform.fill_background(&session, background);
    }
    if let Some(on_draw) = listener {
        on_draw(&session);
    }
    platform.end_paint(handle, session);
    Ok(())
}
