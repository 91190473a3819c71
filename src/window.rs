/*
 * The concrete window type. On top of the generic core it keeps two
 * registries: message handlers keyed by message id (last registration wins)
 * and child objects keyed by `ObjectId` (the window owns them). Incoming
 * messages go to a registered handler first, then to built-in defaults
 * (background paint, button clicks), then to the platform default procedure.
 *
 * All registry state sits in `RefCell`s that are borrowed only for the
 * duration of a lookup. Callbacks are cloned out before they run, so a
 * handler may call back into its window through a `WindowRef`.
 */
use crate::canvas::{Canvas, paint_cycle};
use crate::controls::gui_object::{ClickCallback, GuiObject};
use crate::controls::paint_router::{DefaultRoute, resolve_default_route};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::message::{Message, MessageHandler, ids};
use crate::platform::{Background, LResult, PaintSession, Platform};
use crate::types::{
    Geometry, NativeHandle, ObjectId, Point, ShowCommand, WindowConfig, WindowKey,
};
use crate::window_common::{BaseWindow, DispatchContext, WindowProcedure, WindowShared};

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::{debug, error, warn};

const HANDLED: LResult = 0;

pub struct WindowState {
    handlers: RefCell<BTreeMap<u32, MessageHandler>>,
    objects: RefCell<BTreeMap<ObjectId, GuiObject>>,
    canvas: RefCell<Canvas>,
    background: Cell<Background>,
}

impl WindowState {
    fn new() -> Self {
        Self {
            handlers: RefCell::new(BTreeMap::new()),
            objects: RefCell::new(BTreeMap::new()),
            canvas: RefCell::new(Canvas::new()),
            background: Cell::new(Background::SystemWindow),
        }
    }

    fn click_callback(&self, id: ObjectId) -> Option<ClickCallback> {
        self.objects
            .borrow()
            .get(&id)
            .and_then(GuiObject::click_callback)
    }

    fn create_objects(&self, platform: &dyn Platform, parent: NativeHandle) -> PlatformResult<()> {
        let pending: Vec<ObjectId> = self
            .objects
            .borrow()
            .values()
            .filter(|object| !object.is_created())
            .map(GuiObject::id)
            .collect();
        debug!("Window: realizing {} pending objects", pending.len());
        for id in pending {
            self.realize_object(platform, parent, id)?;
        }
        Ok(())
    }

    /*
     * Read-create-write: the request is built under a short borrow, the native
     * control is created with no borrow held (creation may send messages to
     * the parent), and the handle is stored under a second short borrow.
     */
    fn realize_object(
        &self,
        platform: &dyn Platform,
        parent: NativeHandle,
        id: ObjectId,
    ) -> PlatformResult<()> {
        let request = match self.objects.borrow().get(&id) {
            Some(object) if !object.is_created() => object.create_request(parent),
            _ => return Ok(()),
        };

        let handle = platform.create_window(&request).map_err(|err| {
            error!(
                "Window: creating {} control {} failed: {err}",
                request.class_name,
                id.raw()
            );
            err
        })?;

        let stored = match self.objects.borrow_mut().get_mut(&id) {
            Some(object) if !object.is_created() => {
                object.mark_realized(handle);
                true
            }
            _ => false,
        };
        if stored {
            debug!(
                "Window: realized {} control {} as {handle}",
                request.class_name,
                id.raw()
            );
        } else {
            warn!(
                "Window: object {} changed while its control was created; destroying {handle}",
                id.raw()
            );
            platform.destroy_window(handle)?;
        }
        Ok(())
    }
}

impl WindowProcedure for WindowState {
    fn handle_message(&self, cx: &DispatchContext<'_>, message: Message) -> LResult {
        let handler = self.handlers.borrow().get(&message.id()).cloned();
        if let Some(handler) = handler {
            handler.invoke(cx.handle(), &message);
            return HANDLED;
        }

        match resolve_default_route(&message) {
            DefaultRoute::Paint => {
                let listener = self.canvas.borrow().listener();
                match paint_cycle(cx.platform(), cx.handle(), self.background.get(), listener) {
                    Ok(()) => HANDLED,
                    Err(err) => {
                        error!("Window: paint cycle for {} failed: {err}", cx.handle());
                        cx.default_procedure(&message)
                    }
                }
            }
            DefaultRoute::Click(id) => match self.click_callback(id) {
                Some(on_click) => {
                    on_click();
                    HANDLED
                }
                None => cx.default_procedure(&message),
            },
            DefaultRoute::Platform => cx.default_procedure(&message),
        }
    }

    fn on_created(&self, cx: &DispatchContext<'_>) -> PlatformResult<()> {
        self.create_objects(cx.platform(), cx.handle())
    }

    fn on_destroyed(&self) {
        // Child controls are destroyed together with their parent.
        for object in self.objects.borrow_mut().values_mut() {
            object.mark_unrealized();
        }
    }
}

/*
 * Registry operations shared by `Window` and `WindowRef`. They need the
 * window's key, platform and native handle in addition to the registries.
 */
impl WindowShared<WindowState> {
    fn add_handler(&self, handler: MessageHandler) {
        let message_id = handler.message_id();
        let replaced = self
            .procedure
            .handlers
            .borrow_mut()
            .insert(message_id, handler);
        if replaced.is_some() {
            debug!(
                "Window {:?}: handler for message {message_id:#06x} replaced",
                self.key
            );
        }
    }

    fn remove_handler(&self, message_id: u32) -> bool {
        self.procedure
            .handlers
            .borrow_mut()
            .remove(&message_id)
            .is_some()
    }

    /*
     * Single insertion path for every object. An object already stored under
     * the same id is released: detached, and its native control destroyed if
     * it had one. If this window is already realized the new object is
     * realized immediately.
     */
    fn insert_object(&self, mut object: GuiObject) -> PlatformResult<ObjectId> {
        let id = object.id();
        object.attach(self.key);
        let displaced = self.procedure.objects.borrow_mut().insert(id, object);

        if let Some(mut previous) = displaced {
            warn!(
                "Window {:?}: object id {} already in use; releasing the previous object",
                self.key,
                id.raw()
            );
            self.release_object(&mut previous);
        }
        debug!("Window {:?}: object {} attached", self.key, id.raw());

        if let Some(parent) = self.native_handle() {
            self.procedure
                .realize_object(self.platform.as_ref(), parent, id)?;
        }
        Ok(id)
    }

    /* Returns the object to Unattached, destroying its native control. */
    fn release_object(&self, object: &mut GuiObject) {
        if let Some(handle) = object.detach() {
            if let Err(err) = self.platform.destroy_window(handle) {
                warn!(
                    "Window {:?}: destroying control {handle} failed: {err}",
                    self.key
                );
            }
        }
    }

    fn remove_object(&self, id: ObjectId) -> Option<GuiObject> {
        let removed = self.procedure.objects.borrow_mut().remove(&id);
        removed.map(|mut object| {
            self.release_object(&mut object);
            debug!("Window {:?}: object {} detached", self.key, id.raw());
            object
        })
    }

    fn destroy_object(&self, id: ObjectId) -> bool {
        self.remove_object(id).is_some()
    }

    fn perform_click(&self, id: ObjectId) -> bool {
        match self.procedure.click_callback(id) {
            Some(on_click) => {
                on_click();
                true
            }
            None => {
                debug!(
                    "Window {:?}: perform_click({}) found no clickable object",
                    self.key,
                    id.raw()
                );
                false
            }
        }
    }

    fn object_text(&self, id: ObjectId) -> Option<String> {
        self.procedure
            .objects
            .borrow()
            .get(&id)
            .map(|object| object.text(self.platform.as_ref(), None))
    }

    /*
     * Setting a realized control's text makes it notify the parent
     * synchronously, so the native call runs with no registry borrow held.
     */
    fn set_object_text(&self, id: ObjectId, text: &str) -> PlatformResult<bool> {
        let handle = match self.procedure.objects.borrow().get(&id) {
            Some(object) => object.native_handle(),
            None => return Ok(false),
        };
        if let Some(handle) = handle {
            self.platform.set_window_text(handle, text)?;
        }
        if let Some(object) = self.procedure.objects.borrow_mut().get_mut(&id) {
            object.set_name(text);
        }
        Ok(true)
    }

    fn redraw(&self) {
        if let Some(handle) = self.native_handle() {
            self.platform.invalidate(handle, true);
        }
    }

    fn destroy(&self) -> PlatformResult<()> {
        match self.native_handle() {
            Some(handle) => self.platform.destroy_window(handle),
            None => {
                debug!("Window {:?}: destroy requested before creation", self.key);
                Ok(())
            }
        }
    }

    fn confirm(&self, text: &str, caption: &str) -> bool {
        self.platform.confirm(self.native_handle(), text, caption)
    }
}

pub struct Window {
    base: BaseWindow<WindowState>,
}

impl Window {
    /// A window backed by the native Win32 platform.
    #[cfg(target_os = "windows")]
    pub fn new(config: WindowConfig) -> Self {
        Self::with_platform(Rc::new(crate::win32::Win32Platform::new()), config)
    }

    pub fn with_platform(platform: Rc<dyn Platform>, config: WindowConfig) -> Self {
        Self {
            base: BaseWindow::new(platform, WindowState::new(), config),
        }
    }

    pub fn base(&self) -> &BaseWindow<WindowState> {
        &self.base
    }

    /// Class settings (icon, cursor, menu, extra bytes) live on the base.
    pub fn base_mut(&mut self) -> &mut BaseWindow<WindowState> {
        &mut self.base
    }

    pub fn create(&mut self) -> PlatformResult<()> {
        self.base.create()
    }

    pub fn show(&mut self, command: ShowCommand) -> PlatformResult<usize> {
        self.base.show(command)
    }

    pub fn key(&self) -> WindowKey {
        self.base.key()
    }

    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.base.native_handle()
    }

    pub fn is_created(&self) -> bool {
        self.base.is_created()
    }

    pub fn title(&self) -> &str {
        self.base.title()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> PlatformResult<()> {
        self.base.set_title(title)
    }

    /// Sets the class background and the brush the default paint erases with.
    pub fn set_background(&mut self, background: Background) {
        self.base.set_background(background);
        self.shared().procedure.background.set(background);
    }

    pub fn downgrade(&self) -> WindowRef {
        WindowRef {
            inner: Rc::downgrade(self.shared()),
        }
    }

    fn shared(&self) -> &Rc<WindowShared<WindowState>> {
        self.base.shared()
    }

    fn state(&self) -> &WindowState {
        &self.shared().procedure
    }

    /// Registers `handler`, replacing any handler for the same message id.
    pub fn add_handler(&self, handler: MessageHandler) {
        self.shared().add_handler(handler);
    }

    /// Registers `callback` for the id of the sample `message`.
    pub fn add_handler_for<F>(&self, message: &Message, callback: F)
    where
        F: Fn(NativeHandle, &Message) + 'static,
    {
        self.add_handler(MessageHandler::for_message(message, callback));
    }

    pub fn remove_handler(&self, message_id: u32) -> bool {
        self.shared().remove_handler(message_id)
    }

    pub fn has_handler(&self, message_id: u32) -> bool {
        self.state().handlers.borrow().contains_key(&message_id)
    }

    pub fn add_on_left_mouse_handler<F>(&self, callback: F)
    where
        F: Fn(Point) + 'static,
    {
        self.add_handler(MessageHandler::new(ids::LEFT_BUTTON_DOWN, move |_, message| {
            callback(message.cursor_position())
        }));
    }

    pub fn add_on_right_mouse_handler<F>(&self, callback: F)
    where
        F: Fn(Point) + 'static,
    {
        self.add_handler(MessageHandler::new(ids::RIGHT_BUTTON_DOWN, move |_, message| {
            callback(message.cursor_position())
        }));
    }

    /// Installs a draw listener on the window's canvas; it runs on every default paint.
    pub fn add_on_draw_handler<F>(&self, on_draw: F)
    where
        F: Fn(&PaintSession) + 'static,
    {
        self.state().canvas.borrow_mut().add_on_draw_listener(on_draw);
    }

    pub fn remove_on_draw_handler(&self) {
        self.state().canvas.borrow_mut().remove_on_draw_listener();
    }

    /*
     * Takes ownership of `object` under its id and returns a view for further
     * configuration. Holding the returned `RefMut` while messages are
     * dispatched would block lookups from handlers; drop it promptly.
     */
    pub fn add_object(&self, object: GuiObject) -> PlatformResult<RefMut<'_, GuiObject>> {
        let id = self.shared().insert_object(object)?;
        self.find_mut(id).ok_or_else(|| {
            PlatformError::OperationFailed(format!(
                "object {} was removed while being added",
                id.raw()
            ))
        })
    }

    pub fn add_label(
        &self,
        id: impl Into<ObjectId>,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> PlatformResult<RefMut<'_, GuiObject>> {
        self.add_object(GuiObject::label(id, text, Geometry::new(x, y, width, height)))
    }

    pub fn add_edit_text(
        &self,
        id: impl Into<ObjectId>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> PlatformResult<RefMut<'_, GuiObject>> {
        self.add_edit_text_with(id, "", x, y, width, height)
    }

    pub fn add_edit_text_with(
        &self,
        id: impl Into<ObjectId>,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> PlatformResult<RefMut<'_, GuiObject>> {
        self.add_object(GuiObject::edit_text(id, text, Geometry::new(x, y, width, height)))
    }

    pub fn add_number_input(
        &self,
        id: impl Into<ObjectId>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> PlatformResult<RefMut<'_, GuiObject>> {
        self.add_object(GuiObject::number_input(id, Geometry::new(x, y, width, height)))
    }

    pub fn add_button(
        &self,
        id: impl Into<ObjectId>,
        title: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> PlatformResult<RefMut<'_, GuiObject>> {
        self.add_object(GuiObject::button(id, title, Geometry::new(x, y, width, height)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_button_with_click<F>(
        &self,
        id: impl Into<ObjectId>,
        title: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        on_click: F,
    ) -> PlatformResult<RefMut<'_, GuiObject>>
    where
        F: Fn() + 'static,
    {
        self.add_object(GuiObject::button_with_click(
            id,
            title,
            Geometry::new(x, y, width, height),
            on_click,
        ))
    }

    /// Detaches and returns the object, destroying its native control. The
    /// returned object is Unattached and can be added to any window.
    pub fn remove(&self, id: impl Into<ObjectId>) -> Option<GuiObject> {
        self.shared().remove_object(id.into())
    }

    /// Like `remove`, dropping the object.
    pub fn destroy_object(&self, id: impl Into<ObjectId>) -> bool {
        self.shared().destroy_object(id.into())
    }

    pub fn find(&self, id: impl Into<ObjectId>) -> Option<Ref<'_, GuiObject>> {
        let id = id.into();
        Ref::filter_map(self.state().objects.borrow(), |objects| objects.get(&id)).ok()
    }

    pub fn find_mut(&self, id: impl Into<ObjectId>) -> Option<RefMut<'_, GuiObject>> {
        let id = id.into();
        RefMut::filter_map(self.state().objects.borrow_mut(), |objects| {
            objects.get_mut(&id)
        })
        .ok()
    }

    pub fn contains(&self, id: impl Into<ObjectId>) -> bool {
        self.state().objects.borrow().contains_key(&id.into())
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.borrow().len()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.state().objects.borrow().keys().copied().collect()
    }

    /// Runs the click callback of the object with `id`; false if there is none.
    pub fn perform_click(&self, id: impl Into<ObjectId>) -> bool {
        self.shared().perform_click(id.into())
    }

    /// Realizes every attached object that has no native control yet.
    pub fn create_objects(&self) -> PlatformResult<()> {
        let parent = self.native_handle().ok_or_else(|| {
            PlatformError::InvalidHandle(format!(
                "window {:?} must be created before its objects",
                self.key()
            ))
        })?;
        self.state()
            .create_objects(self.base.platform().as_ref(), parent)
    }

    pub fn text_of(&self, id: impl Into<ObjectId>) -> Option<String> {
        self.shared().object_text(id.into())
    }

    pub fn set_text_of(&self, id: impl Into<ObjectId>, text: &str) -> PlatformResult<bool> {
        self.shared().set_object_text(id.into(), text)
    }

    pub fn redraw(&self) {
        self.shared().redraw();
    }

    pub fn destroy(&self) -> PlatformResult<()> {
        self.shared().destroy()
    }

    pub fn confirm(&self, text: &str, caption: &str) -> bool {
        self.shared().confirm(text, caption)
    }
}

/*
 * Non-owning reference to a `Window` for use inside handlers and click
 * callbacks. Every operation is a no-op (or `None`/false) once the window
 * has been dropped.
 */
#[derive(Clone)]
pub struct WindowRef {
    inner: Weak<WindowShared<WindowState>>,
}

impl WindowRef {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.inner.upgrade().and_then(|shared| shared.native_handle())
    }

    pub fn add_handler(&self, handler: MessageHandler) {
        if let Some(shared) = self.inner.upgrade() {
            shared.add_handler(handler);
        }
    }

    pub fn perform_click(&self, id: impl Into<ObjectId>) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|shared| shared.perform_click(id.into()))
    }

    pub fn with_object<R>(
        &self,
        id: impl Into<ObjectId>,
        f: impl FnOnce(&GuiObject) -> R,
    ) -> Option<R> {
        let shared = self.inner.upgrade()?;
        let objects = shared.procedure.objects.borrow();
        objects.get(&id.into()).map(f)
    }

    /*
     * The object registry stays mutably borrowed while `f` runs. `f` may edit
     * the object's fields but must not make native calls that send messages
     * back to this window, nor reach the registry through another `WindowRef`.
     * Use `text_of`/`set_text_of` for native text.
     */
    pub fn with_object_mut<R>(
        &self,
        id: impl Into<ObjectId>,
        f: impl FnOnce(&mut GuiObject) -> R,
    ) -> Option<R> {
        let shared = self.inner.upgrade()?;
        let mut objects = shared.procedure.objects.borrow_mut();
        objects.get_mut(&id.into()).map(f)
    }

    pub fn text_of(&self, id: impl Into<ObjectId>) -> Option<String> {
        self.inner.upgrade()?.object_text(id.into())
    }

    pub fn number_of(&self, id: impl Into<ObjectId>) -> Option<u64> {
        let shared = self.inner.upgrade()?;
        let objects = shared.procedure.objects.borrow();
        objects.get(&id.into())?.number(shared.platform.as_ref())
    }

    pub fn set_text_of(&self, id: impl Into<ObjectId>, text: &str) -> PlatformResult<bool> {
        match self.inner.upgrade() {
            Some(shared) => shared.set_object_text(id.into(), text),
            None => Ok(false),
        }
    }

    pub fn redraw(&self) {
        if let Some(shared) = self.inner.upgrade() {
            shared.redraw();
        }
    }

    pub fn destroy(&self) -> PlatformResult<()> {
        match self.inner.upgrade() {
            Some(shared) => shared.destroy(),
            None => Ok(()),
        }
    }

    pub fn confirm(&self, text: &str, caption: &str) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|shared| shared.confirm(text, caption))
    }
}
