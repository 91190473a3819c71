/*
 * mingl: a small object-style layer over the Win32 windowing API.
 *
 * A `Window` owns a native top-level window, a registry of message handlers
 * keyed by message id and the child controls (`GuiObject`) placed on it.
 * Every window class shares one native window procedure; the dispatch arena
 * maps each native handle back to the instance that created it so messages
 * reach the right registries.
 *
 * All OS access goes through the `Platform` trait. The routing core,
 * registries and object lifecycle are portable and tested off Windows with an
 * in-memory platform; `Win32Platform` and the GDI+ wrapper are compiled on
 * Windows only.
 */
pub mod canvas;
pub(crate) mod controls;
pub mod dispatch;
pub mod error;
#[cfg(target_os = "windows")]
pub mod gdiplus;
pub mod message;
pub mod platform;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
#[cfg(target_os = "windows")]
pub mod win32;
pub mod window;
pub mod window_common;

pub use canvas::{Canvas, DrawCallback};
pub use controls::gui_object::{ClickCallback, ControlKind, GuiObject, ObjectState};
pub use dispatch::route_message;
pub use error::{PlatformError, Result as PlatformResult};
pub use message::{HandlerCallback, Message, MessageHandler, NOTIFICATION_CLICKED, ids};
pub use platform::{
    Background, ClassStyle, CreateRequest, GraphicsToken, LResult, PaintSession, Platform,
    QueuedMessage, Retrieved, SystemCursor, SystemIcon, WindowClass,
};
pub use types::{
    Color, ExtendedStyle, Geometry, NativeHandle, ObjectId, Point, Rect, ShowCommand,
    WindowConfig, WindowKey, WindowStyle,
};
#[cfg(target_os = "windows")]
pub use win32::Win32Platform;
pub use window::{Window, WindowRef, WindowState};
pub use window_common::{BaseWindow, DispatchContext, WindowProcedure};
