/*
 * Generic window core: class descriptor, per-type class naming, native window
 * creation and the message loop. `BaseWindow<P>` is parameterised over the
 * window procedure `P`, which receives every message the dispatch arena routes
 * to this instance.
 *
 * The instance state shared with the arena lives in `WindowShared<P>` behind an
 * `Rc`; the arena holds a `Weak` to it and `BaseWindow` unregisters it on drop.
 */
use crate::dispatch::{self, Routable};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::message::Message;
use crate::platform::{
    Background, ClassStyle, CreateRequest, GraphicsToken, LResult, Platform, Retrieved,
    SystemCursor, SystemIcon, WindowClass,
};
use crate::types::{
    ExtendedStyle, Geometry, NativeHandle, ShowCommand, WindowConfig, WindowKey, WindowStyle,
};

use std::any::TypeId;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use log::{debug, error, warn};

/// What a window procedure sees of the window a message was routed to.
pub struct DispatchContext<'a> {
    key: WindowKey,
    handle: NativeHandle,
    platform: &'a dyn Platform,
}

impl<'a> DispatchContext<'a> {
    pub(crate) fn new(key: WindowKey, handle: NativeHandle, platform: &'a dyn Platform) -> Self {
        Self {
            key,
            handle,
            platform,
        }
    }

    pub fn key(&self) -> WindowKey {
        self.key
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn platform(&self) -> &'a dyn Platform {
        self.platform
    }

    pub fn default_procedure(&self, message: &Message) -> LResult {
        self.platform.default_procedure(self.handle, message)
    }
}

/*
 * Per-type message handling. Implementations take `&self`: messages can
 * arrive re-entrantly (a handler that destroys its window receives the
 * destroy sequence before it returns), so state belongs in cells that are
 * borrowed only briefly.
 */
pub trait WindowProcedure: 'static {
    fn handle_message(&self, cx: &DispatchContext<'_>, message: Message) -> LResult;

    /// Runs once the native window exists, before `create` returns. An error
    /// is returned from `create`, and the next `create` runs this again.
    fn on_created(&self, _cx: &DispatchContext<'_>) -> PlatformResult<()> {
        Ok(())
    }

    /// Runs after the native window has been torn down (`WM_NCDESTROY`).
    fn on_destroyed(&self) {}
}

pub(crate) struct WindowShared<P> {
    pub(crate) key: WindowKey,
    pub(crate) platform: Rc<dyn Platform>,
    pub(crate) handle: Cell<Option<NativeHandle>>,
    pub(crate) procedure: P,
}

impl<P> WindowShared<P> {
    pub(crate) fn native_handle(&self) -> Option<NativeHandle> {
        self.handle.get()
    }
}

impl<P: WindowProcedure> Routable for WindowShared<P> {
    fn route(&self, handle: NativeHandle, message: Message) -> LResult {
        if self.handle.get() != Some(handle) {
            debug!("WindowCore: {:?} recorded native handle {handle}", self.key);
            self.handle.set(Some(handle));
        }
        let cx = DispatchContext::new(self.key, handle, self.platform.as_ref());
        self.procedure.handle_message(&cx, message)
    }

    fn release_handle(&self, handle: NativeHandle) {
        if self.handle.get() == Some(handle) {
            self.handle.set(None);
            self.procedure.on_destroyed();
        }
    }
}

/*
 * Returns the class name of window procedure type `P`: 8 lowercase hex
 * digits drawn from a process-wide counter the first time a type asks, and
 * the same token for that type for the rest of the process.
 */
pub(crate) fn class_name_for<P: 'static>() -> String {
    static NAMES: OnceLock<Mutex<HashMap<TypeId, String>>> = OnceLock::new();
    static NEXT_CLASS: AtomicU32 = AtomicU32::new(1);

    let mut names = NAMES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    names
        .entry(TypeId::of::<P>())
        .or_insert_with(|| format!("{:08x}", NEXT_CLASS.fetch_add(1, Ordering::Relaxed)))
        .clone()
}

pub struct BaseWindow<P: WindowProcedure> {
    shared: Rc<WindowShared<P>>,
    class: WindowClass,
    title: String,
    geometry: Geometry,
    style: WindowStyle,
    ex_style: ExtendedStyle,
    graphics: Option<GraphicsToken>,
    setup_pending: bool,
}

impl<P: WindowProcedure> BaseWindow<P> {
    /*
     * Starts the drawing library, prepares the class descriptor with default
     * settings and registers the instance in the dispatch arena. Nothing is
     * created natively until `create`.
     */
    pub fn new(platform: Rc<dyn Platform>, procedure: P, config: WindowConfig) -> Self {
        let graphics = match platform.graphics_startup() {
            Ok(token) => Some(token),
            Err(err) => {
                warn!("WindowCore: graphics startup failed, drawing disabled: {err}");
                None
            }
        };

        let key = dispatch::allocate_key();
        let shared = Rc::new(WindowShared {
            key,
            platform,
            handle: Cell::new(None),
            procedure,
        });
        let weak: Weak<dyn Routable> = Rc::downgrade(&shared) as Weak<dyn Routable>;
        dispatch::register_instance(key, weak);

        Self {
            shared,
            class: WindowClass::with_defaults(class_name_for::<P>()),
            title: config.title,
            geometry: config.geometry,
            style: config.style,
            ex_style: config.ex_style,
            graphics,
            setup_pending: false,
        }
    }

    /*
     * Registers the class (idempotent in the platform) and creates the native
     * window, passing this instance's key as the creation parameter. Child
     * setup in `WindowProcedure::on_created` runs before returning.
     *
     * If the native window cannot be created the window stays unrealized. If
     * it exists but `on_created` fails, the window stays realized and the
     * error is returned; the next `create` runs `on_created` again.
     */
    pub fn create(&mut self) -> PlatformResult<()> {
        if let Some(handle) = self.native_handle() {
            if !self.setup_pending {
                debug!("WindowCore: {:?} already created as {handle}", self.key());
                return Ok(());
            }
            debug!("WindowCore: {:?} retrying setup of {handle}", self.key());
            return self.run_setup(handle);
        }

        let platform = Rc::clone(&self.shared.platform);
        platform.register_class(&self.class)?;

        let request = CreateRequest {
            class_name: self.class.class_name.clone(),
            title: self.title.clone(),
            style: self.style,
            ex_style: self.ex_style,
            geometry: self.geometry,
            parent: None,
            control_id: None,
            creation_key: Some(self.key()),
        };
        let handle = platform.create_window(&request).map_err(|err| {
            error!("WindowCore: creating window '{}' failed: {err}", self.title);
            err
        })?;

        // The creation notification normally binds the handle already.
        if dispatch::key_for_handle(handle) != Some(self.key()) {
            dispatch::bind_handle(handle, self.key());
        }
        self.shared.handle.set(Some(handle));
        debug!(
            "WindowCore: created '{}' ({:?}) with handle {handle}",
            self.title,
            self.key()
        );

        self.setup_pending = true;
        self.run_setup(handle)
    }

    fn run_setup(&mut self, handle: NativeHandle) -> PlatformResult<()> {
        let platform = Rc::clone(&self.shared.platform);
        let cx = DispatchContext::new(self.key(), handle, platform.as_ref());
        let outcome = self.shared.procedure.on_created(&cx);
        if let Err(err) = &outcome {
            warn!(
                "WindowCore: setup of {:?} failed, will retry on next create: {err}",
                self.key()
            );
        }
        self.setup_pending = outcome.is_err();
        outcome
    }

    /*
     * Shows the window, forces the first paint and pumps the thread's queue
     * until the quit message arrives. Returns the quit payload. The drawing
     * library is shut down when the loop ends.
     */
    pub fn show(&mut self, command: ShowCommand) -> PlatformResult<usize> {
        let handle = self.native_handle().ok_or_else(|| {
            PlatformError::InvalidHandle(format!(
                "window '{}' must be created before it is shown",
                self.title
            ))
        })?;

        let platform = Rc::clone(&self.shared.platform);
        platform.show_window(handle, command);
        platform.update_window(handle);

        let outcome = loop {
            match platform.next_message() {
                Ok(Retrieved::Message(queued)) => platform.dispatch_message(&queued),
                Ok(Retrieved::Quit(code)) => {
                    debug!("WindowCore: quit received with code {code}");
                    break Ok(code);
                }
                Err(err) => {
                    error!("WindowCore: message retrieval failed: {err}");
                    break Err(err);
                }
            }
        };

        if let Some(token) = self.graphics.take() {
            platform.graphics_shutdown(token);
        }
        outcome
    }

    pub fn key(&self) -> WindowKey {
        self.shared.key
    }

    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.shared.native_handle()
    }

    pub fn is_created(&self) -> bool {
        self.native_handle().is_some()
    }

    pub fn procedure(&self) -> &P {
        &self.shared.procedure
    }

    pub fn platform(&self) -> &Rc<dyn Platform> {
        &self.shared.platform
    }

    pub(crate) fn shared(&self) -> &Rc<WindowShared<P>> {
        &self.shared
    }

    pub fn window_class(&self) -> &WindowClass {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class.class_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Updates the stored title and, once realized, the native caption.
    pub fn set_title(&mut self, title: impl Into<String>) -> PlatformResult<()> {
        self.title = title.into();
        if let Some(handle) = self.native_handle() {
            self.shared.platform.set_window_text(handle, &self.title)?;
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Takes effect on the next `create`.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn style(&self) -> WindowStyle {
        self.style
    }

    pub fn set_style(&mut self, style: WindowStyle) {
        self.style = style;
    }

    pub fn set_ex_style(&mut self, ex_style: ExtendedStyle) {
        self.ex_style = ex_style;
    }

    pub fn set_icon(&mut self, icon: Option<SystemIcon>) {
        self.class.icon = icon;
    }

    pub fn set_small_icon(&mut self, icon: Option<SystemIcon>) {
        self.class.small_icon = icon;
    }

    pub fn set_cursor(&mut self, cursor: Option<SystemCursor>) {
        self.class.cursor = cursor;
    }

    pub fn set_background(&mut self, background: Background) {
        self.class.background = background;
    }

    pub fn set_menu_name(&mut self, menu_name: Option<String>) {
        self.class.menu_name = menu_name;
    }

    pub fn set_class_style(&mut self, style: ClassStyle) {
        self.class.style = style;
    }

    pub fn set_window_extra_bytes(&mut self, bytes: i32) {
        self.class.window_extra_bytes = bytes;
    }

    pub fn set_class_extra_bytes(&mut self, bytes: i32) {
        self.class.class_extra_bytes = bytes;
    }
}

impl<P: WindowProcedure> Drop for BaseWindow<P> {
    fn drop(&mut self) {
        dispatch::unregister_instance(self.key());
        if let Some(token) = self.graphics.take() {
            self.shared.platform.graphics_shutdown(token);
        }
        debug!("WindowCore: {:?} dropped", self.key());
    }
}
