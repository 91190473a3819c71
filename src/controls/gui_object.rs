/*
 * Base entity for child controls. A `GuiObject` carries its identity (class
 * name, display name, id), geometry, style bits, the native handle once
 * realized and a non-owning back-reference to the window that owns it.
 *
 * Lifecycle: Unattached -> Attached (inserted into a window's object arena,
 * `WS_CHILD` added) -> Realized (native control created under the window).
 * Detaching returns the object to Unattached from either state, giving up
 * its native handle; the window arena is the only place an attached object
 * lives, so a parent back-reference always matches exactly one arena entry
 * and an object outside every arena never carries a handle.
 */
use crate::error::Result as PlatformResult;
use crate::platform::{CreateRequest, Platform};
use crate::types::{ExtendedStyle, Geometry, NativeHandle, ObjectId, WindowKey, WindowStyle};

use std::fmt;
use std::rc::Rc;

use log::debug;

pub type ClickCallback = Rc<dyn Fn()>;

/// Initial buffer size, in UTF-16 units, when probing text of unknown length.
const INITIAL_TEXT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Button,
    Label,
    EditText,
    NumberInput,
    Custom,
}

impl ControlKind {
    pub fn is_edit(self) -> bool {
        matches!(self, ControlKind::EditText | ControlKind::NumberInput)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    Unattached,
    Attached,
    Realized,
}

pub struct GuiObject {
    kind: ControlKind,
    class_name: String,
    name: String,
    geometry: Geometry,
    id: ObjectId,
    style: WindowStyle,
    ex_style: ExtendedStyle,
    handle: Option<NativeHandle>,
    parent: Option<WindowKey>,
    pub(crate) on_click: Option<ClickCallback>,
}

impl GuiObject {
    /// An object of an arbitrary registered window class.
    pub fn new(
        class_name: impl Into<String>,
        id: impl Into<ObjectId>,
        name: impl Into<String>,
        geometry: Geometry,
    ) -> Self {
        Self::with_kind(
            ControlKind::Custom,
            class_name.into(),
            id.into(),
            name.into(),
            geometry,
            WindowStyle::VISIBLE,
        )
    }

    pub(crate) fn with_kind(
        kind: ControlKind,
        class_name: String,
        id: ObjectId,
        name: String,
        geometry: Geometry,
        style: WindowStyle,
    ) -> Self {
        Self {
            kind,
            class_name,
            name,
            geometry,
            id,
            style,
            ex_style: ExtendedStyle::empty(),
            handle: None,
            parent: None,
            on_click: None,
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the in-memory name only; use `set_text` to update a realized control.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn x(&self) -> i32 {
        self.geometry.x
    }

    pub fn y(&self) -> i32 {
        self.geometry.y
    }

    pub fn width(&self) -> i32 {
        self.geometry.width
    }

    pub fn height(&self) -> i32 {
        self.geometry.height
    }

    pub fn set_width(&mut self, width: i32) {
        self.geometry.width = width;
    }

    pub fn set_height(&mut self, height: i32) {
        self.geometry.height = height;
    }

    pub fn style(&self) -> WindowStyle {
        self.style
    }

    pub fn ex_style(&self) -> ExtendedStyle {
        self.ex_style
    }

    /*
     * Style changes are recorded for the next native creation; a realized
     * control keeps the style it was created with.
     */
    pub fn add_style(&mut self, style: WindowStyle) {
        self.style.insert(style);
    }

    /// Clears `style`. Returns false and changes nothing if the bits were absent.
    pub fn remove_style(&mut self, style: WindowStyle) -> bool {
        let removed = self.style.remove(style);
        if !removed {
            debug!(
                "GuiObject {}: remove_style({:#x}) ignored, style not set",
                self.id.raw(),
                style.bits()
            );
        }
        removed
    }

    pub fn add_ex_style(&mut self, ex_style: ExtendedStyle) {
        self.ex_style.insert(ex_style);
    }

    pub fn remove_ex_style(&mut self, ex_style: ExtendedStyle) -> bool {
        self.ex_style.remove(ex_style)
    }

    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    pub fn is_created(&self) -> bool {
        self.handle.is_some()
    }

    /// Key of the owning window, if attached.
    pub fn parent(&self) -> Option<WindowKey> {
        self.parent
    }

    pub fn state(&self) -> ObjectState {
        match (self.parent, self.handle) {
            (_, Some(_)) => ObjectState::Realized,
            (Some(_), None) => ObjectState::Attached,
            (None, None) => ObjectState::Unattached,
        }
    }

    pub(crate) fn attach(&mut self, parent: WindowKey) {
        self.parent = Some(parent);
        self.style.insert(WindowStyle::CHILD);
    }

    /// Clears the back-reference and hands back the native handle, if any,
    /// for the owning window to destroy.
    pub(crate) fn detach(&mut self) -> Option<NativeHandle> {
        self.parent = None;
        self.handle.take()
    }

    pub(crate) fn mark_realized(&mut self, handle: NativeHandle) {
        self.handle = Some(handle);
    }

    pub(crate) fn mark_unrealized(&mut self) {
        self.handle = None;
    }

    pub(crate) fn create_request(&self, parent: NativeHandle) -> CreateRequest {
        CreateRequest {
            class_name: self.class_name.clone(),
            title: self.name.clone(),
            style: self.style,
            ex_style: self.ex_style,
            geometry: self.geometry,
            parent: Some(parent),
            control_id: Some(self.id),
            creation_key: None,
        }
    }

    /*
     * Displayed text. Before realization this is the in-memory name. After,
     * the text is read back from the control: with a length hint in one call,
     * without one by growing the buffer until the copy no longer fills it.
     */
    pub fn text(&self, platform: &dyn Platform, length_hint: Option<usize>) -> String {
        match self.handle {
            None => self.name.clone(),
            Some(handle) => {
                read_text_with(length_hint, |buffer| platform.window_text(handle, buffer))
            }
        }
    }

    pub fn set_text(&mut self, platform: &dyn Platform, text: &str) -> PlatformResult<()> {
        if let Some(handle) = self.handle {
            platform.set_window_text(handle, text)?;
        }
        self.name = text.to_string();
        Ok(())
    }
}

impl fmt::Debug for GuiObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuiObject")
            .field("kind", &self.kind)
            .field("class_name", &self.class_name)
            .field("name", &self.name)
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .field("style", &self.style)
            .field("handle", &self.handle)
            .field("parent", &self.parent)
            .field("clickable", &self.on_click.is_some())
            .finish()
    }
}

// Internal helper that can be unit tested with an injected fetch.
pub(crate) fn read_text_with<F>(length_hint: Option<usize>, fetch: F) -> String
where
    F: Fn(&mut [u16]) -> usize,
{
    if let Some(length) = length_hint {
        let mut buffer = vec![0u16; length + 1];
        let copied = fetch(&mut buffer).min(length);
        buffer.truncate(copied);
        return String::from_utf16_lossy(&buffer);
    }

    let mut capacity = INITIAL_TEXT_CAPACITY;
    loop {
        let mut buffer = vec![0u16; capacity];
        let copied = fetch(&mut buffer).min(capacity - 1);
        if copied + 1 < capacity {
            buffer.truncate(copied);
            return String::from_utf16_lossy(&buffer);
        }
        capacity *= 2;
    }
}
