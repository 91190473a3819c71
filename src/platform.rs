/*
 * The native windowing boundary. Every OS call the crate makes goes through
 * `Platform`, so the routing core, the registries and the object lifecycle
 * never name a Win32 function directly. `Win32Platform` implements it on
 * Windows; tests use an in-memory recording implementation.
 *
 * Implementations must route messages for windows they create through
 * `dispatch::route_message`, synchronously for the creation notification
 * (as `CreateWindowExW` does) and from `dispatch_message` afterwards.
 */
use crate::error::Result as PlatformResult;
use crate::message::Message;
use crate::types::{
    Color, ExtendedStyle, Geometry, NativeHandle, ObjectId, Point, Rect, ShowCommand,
    WindowKey, WindowStyle,
};

/// Value returned from a window procedure (`LRESULT`).
pub type LResult = isize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemIcon {
    Application,
    Information,
    Warning,
    Error,
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCursor {
    Arrow,
    IBeam,
    Hand,
    Cross,
    Wait,
}

/// Brush used to erase the client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    SystemWindow,
    SystemButtonFace,
    Solid(Color),
    None,
}

/// Class style bits (`CS_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassStyle(u32);

impl ClassStyle {
    pub const VREDRAW: Self = Self(0x0001);
    pub const HREDRAW: Self = Self(0x0002);
    pub const DOUBLE_CLICKS: Self = Self(0x0008);
    pub const OWN_DC: Self = Self(0x0020);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

/*
 * Descriptor for a native window class. The window procedure is not part of
 * it: every class registered through a `Platform` uses that platform's
 * trampoline.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClass {
    pub class_name: String,
    pub icon: Option<SystemIcon>,
    pub small_icon: Option<SystemIcon>,
    pub cursor: Option<SystemCursor>,
    pub background: Background,
    pub menu_name: Option<String>,
    pub style: ClassStyle,
    pub window_extra_bytes: i32,
    pub class_extra_bytes: i32,
}

impl WindowClass {
    pub fn with_defaults(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            icon: Some(SystemIcon::Application),
            small_icon: Some(SystemIcon::Application),
            cursor: Some(SystemCursor::Arrow),
            background: Background::SystemWindow,
            menu_name: None,
            style: ClassStyle::default(),
            window_extra_bytes: 0,
            class_extra_bytes: 0,
        }
    }
}

/*
 * Everything needed to create a native window or child control.
 * `creation_key` is handed back to `route_message` with the creation
 * notification so the new handle can be bound to its instance.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub class_name: String,
    pub title: String,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
    pub geometry: Geometry,
    pub parent: Option<NativeHandle>,
    pub control_id: Option<ObjectId>,
    pub creation_key: Option<WindowKey>,
}

/// A message pulled from the thread's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedMessage {
    pub handle: Option<NativeHandle>,
    pub message: Message,
    pub time: u32,
    pub point: Point,
}

impl QueuedMessage {
    pub fn new(handle: Option<NativeHandle>, message: Message) -> Self {
        Self {
            handle,
            message,
            time: 0,
            point: Point::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieved {
    Message(QueuedMessage),
    /// The quit message was reached; carries its exit code payload.
    Quit(usize),
}

/// One open paint cycle, between `begin_paint` and `end_paint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintSession {
    device_context: isize,
    update_rect: Rect,
    erase_background: bool,
}

impl PaintSession {
    pub fn new(device_context: isize, update_rect: Rect, erase_background: bool) -> Self {
        Self {
            device_context,
            update_rect,
            erase_background,
        }
    }

    /// Raw `HDC` of the paint cycle.
    pub fn device_context(&self) -> isize {
        self.device_context
    }

    pub fn update_rect(&self) -> Rect {
        self.update_rect
    }

    pub fn erase_background(&self) -> bool {
        self.erase_background
    }
}

/// Token returned by the drawing library startup; handed back on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsToken(usize);

impl GraphicsToken {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

pub trait Platform {
    /// Registers `class`. Registering an already registered class succeeds without effect.
    fn register_class(&self, class: &WindowClass) -> PlatformResult<()>;

    fn create_window(&self, request: &CreateRequest) -> PlatformResult<NativeHandle>;

    fn destroy_window(&self, handle: NativeHandle) -> PlatformResult<()>;

    fn default_procedure(&self, handle: NativeHandle, message: &Message) -> LResult;

    fn post_quit(&self, exit_code: i32);

    fn show_window(&self, handle: NativeHandle, command: ShowCommand);

    fn update_window(&self, handle: NativeHandle);

    fn invalidate(&self, handle: NativeHandle, erase: bool);

    /// Blocks until the next queued message or the quit message.
    fn next_message(&self) -> PlatformResult<Retrieved>;

    fn dispatch_message(&self, queued: &QueuedMessage);

    /// Copies at most `buffer.len() - 1` UTF-16 units of the window text; returns the count copied.
    fn window_text(&self, handle: NativeHandle, buffer: &mut [u16]) -> usize;

    fn set_window_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()>;

    fn begin_paint(&self, handle: NativeHandle) -> PlatformResult<PaintSession>;

    fn fill_background(&self, session: &PaintSession, background: Background);

    fn end_paint(&self, handle: NativeHandle, session: PaintSession);

    fn graphics_startup(&self) -> PlatformResult<GraphicsToken>;

    fn graphics_shutdown(&self, token: GraphicsToken);

    /// Modal OK/Cancel prompt; true when the user confirmed.
    fn confirm(&self, owner: Option<NativeHandle>, text: &str, caption: &str) -> bool;
}
