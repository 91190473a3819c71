/*
 * Message values delivered by the window manager and the handler type that
 * window owners register against a message id.
 *
 * `Message` is an immutable copy of the `(msg, wParam, lParam)` triple. The
 * well-known ids live in `ids` as plain constants with the same numeric values
 * as the `WM_*` definitions, so routing logic stays testable off Windows.
 */
use crate::types::{NativeHandle, ObjectId, Point};

use std::fmt;
use std::rc::Rc;

pub mod ids {
    pub const CREATE: u32 = 0x0001;
    pub const DESTROY: u32 = 0x0002;
    pub const SIZE: u32 = 0x0005;
    pub const PAINT: u32 = 0x000F;
    pub const CLOSE: u32 = 0x0010;
    pub const QUIT: u32 = 0x0012;
    pub const ERASE_BACKGROUND: u32 = 0x0014;
    pub const NC_CREATE: u32 = 0x0081;
    pub const NC_DESTROY: u32 = 0x0082;
    pub const KEY_DOWN: u32 = 0x0100;
    pub const KEY_UP: u32 = 0x0101;
    pub const CHAR: u32 = 0x0102;
    pub const COMMAND: u32 = 0x0111;
    pub const TIMER: u32 = 0x0113;
    pub const MOUSE_MOVE: u32 = 0x0200;
    pub const LEFT_BUTTON_DOWN: u32 = 0x0201;
    pub const LEFT_BUTTON_UP: u32 = 0x0202;
    pub const RIGHT_BUTTON_DOWN: u32 = 0x0204;
    pub const RIGHT_BUTTON_UP: u32 = 0x0205;
    pub const USER: u32 = 0x0400;
    pub const APP: u32 = 0x8000;
}

/// `BN_CLICKED`; menu commands report the same code.
pub const NOTIFICATION_CLICKED: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    id: u32,
    wparam: usize,
    lparam: isize,
}

impl Message {
    pub const fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }

    const fn bare(id: u32) -> Self {
        Self::new(id, 0, 0)
    }

    pub const fn on_create() -> Self {
        Self::bare(ids::CREATE)
    }

    pub const fn on_nc_create() -> Self {
        Self::bare(ids::NC_CREATE)
    }

    pub const fn on_destroy() -> Self {
        Self::bare(ids::DESTROY)
    }

    pub const fn on_nc_destroy() -> Self {
        Self::bare(ids::NC_DESTROY)
    }

    pub const fn on_paint() -> Self {
        Self::bare(ids::PAINT)
    }

    pub const fn on_close() -> Self {
        Self::bare(ids::CLOSE)
    }

    pub const fn on_erase_background() -> Self {
        Self::bare(ids::ERASE_BACKGROUND)
    }

    pub const fn on_size(width: u16, height: u16) -> Self {
        Self::new(ids::SIZE, 0, pack_words(width, height))
    }

    /*
     * `WM_COMMAND` as a control would send it: the low word of `wParam` holds
     * the control id, the high word the notification code and `lParam` the
     * control's handle (zero for menus and accelerators).
     */
    pub const fn on_command(
        id: ObjectId,
        notification: u16,
        control: Option<NativeHandle>,
    ) -> Self {
        let wparam = ((notification as usize) << 16) | (id.raw() as u16 as usize);
        let lparam = match control {
            Some(handle) => handle.raw(),
            None => 0,
        };
        Self::new(ids::COMMAND, wparam, lparam)
    }

    pub const fn on_left_button_down(point: Point) -> Self {
        Self::new(ids::LEFT_BUTTON_DOWN, 0, pack_point(point))
    }

    pub const fn on_right_button_down(point: Point) -> Self {
        Self::new(ids::RIGHT_BUTTON_DOWN, 0, pack_point(point))
    }

    pub const fn on_mouse_move(point: Point) -> Self {
        Self::new(ids::MOUSE_MOVE, 0, pack_point(point))
    }

    pub const fn on_key_down(virtual_key: u16) -> Self {
        Self::new(ids::KEY_DOWN, virtual_key as usize, 0)
    }

    pub const fn on_timer(timer_id: usize) -> Self {
        Self::new(ids::TIMER, timer_id, 0)
    }

    pub const fn id(&self) -> u32 {
        self.id
    }

    pub const fn wparam(&self) -> usize {
        self.wparam
    }

    pub const fn lparam(&self) -> isize {
        self.lparam
    }

    pub const fn low_word_wparam(&self) -> u16 {
        (self.wparam & 0xFFFF) as u16
    }

    pub const fn high_word_wparam(&self) -> u16 {
        ((self.wparam >> 16) & 0xFFFF) as u16
    }

    pub const fn low_word_lparam(&self) -> u16 {
        (self.lparam & 0xFFFF) as u16
    }

    pub const fn high_word_lparam(&self) -> u16 {
        ((self.lparam >> 16) & 0xFFFF) as u16
    }

    /// Client coordinates of a mouse message; both words are sign extended.
    pub const fn cursor_position(&self) -> Point {
        Point::new(
            self.low_word_lparam() as i16 as i32,
            self.high_word_lparam() as i16 as i32,
        )
    }

    pub const fn command_id(&self) -> ObjectId {
        ObjectId::new(self.low_word_wparam() as i32)
    }
}

const fn pack_words(low: u16, high: u16) -> isize {
    ((high as u32) << 16 | low as u32) as i32 as isize
}

const fn pack_point(point: Point) -> isize {
    pack_words(point.x as i16 as u16, point.y as i16 as u16)
}

pub type HandlerCallback = Rc<dyn Fn(NativeHandle, &Message)>;

/*
 * Associates a message id with a callback. The callback receives the native
 * handle of the window the message was delivered to and the message itself.
 * Cloning shares the callback.
 */
#[derive(Clone)]
pub struct MessageHandler {
    message_id: u32,
    callback: HandlerCallback,
}

impl MessageHandler {
    pub fn new<F>(message_id: u32, callback: F) -> Self
    where
        F: Fn(NativeHandle, &Message) + 'static,
    {
        Self {
            message_id,
            callback: Rc::new(callback),
        }
    }

    /// Builds a handler for the id of a sample message such as `Message::on_paint()`.
    pub fn for_message<F>(message: &Message, callback: F) -> Self
    where
        F: Fn(NativeHandle, &Message) + 'static,
    {
        Self::new(message.id(), callback)
    }

    pub fn message_id(&self) -> u32 {
        self.message_id
    }

    pub fn invoke(&self, handle: NativeHandle, message: &Message) {
        (self.callback)(handle, message)
    }
}

impl fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHandler")
            .field("message_id", &format_args!("{:#06x}", self.message_id))
            .finish_non_exhaustive()
    }
}
