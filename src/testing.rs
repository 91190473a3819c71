/*
 * In-memory `Platform` for unit tests. It hands out fresh handles, keeps the
 * text of every live window, records each call worth asserting on, and
 * routes creation and destruction notifications for windows created with a
 * creation key the same way `CreateWindowExW`/`DestroyWindow` do: through
 * `dispatch::route_message`, synchronously.
 */
use crate::dispatch::route_message;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::message::Message;
use crate::platform::{
    Background, CreateRequest, GraphicsToken, LResult, PaintSession, Platform, QueuedMessage,
    Retrieved, WindowClass,
};
use crate::types::{NativeHandle, Rect, ShowCommand};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicIsize, Ordering};

// Shared by every instance so handles never collide inside one thread's arena.
static NEXT_HANDLE: AtomicIsize = AtomicIsize::new(0x1_0000);

const PAINT_DEVICE_CONTEXT: isize = 0x0DC0;

pub(crate) struct RecordingPlatform {
    live: RefCell<HashSet<NativeHandle>>,
    routed: RefCell<HashSet<NativeHandle>>,
    texts: RefCell<HashMap<NativeHandle, String>>,
    requests: RefCell<Vec<CreateRequest>>,
    classes: RefCell<Vec<WindowClass>>,
    fail_next_create: Cell<bool>,
    destroyed: RefCell<Vec<NativeHandle>>,
    default_calls: Cell<usize>,
    quits: RefCell<Vec<i32>>,
    queue: RefCell<VecDeque<Retrieved>>,
    shown: RefCell<Vec<(NativeHandle, ShowCommand)>>,
    updated: RefCell<Vec<NativeHandle>>,
    invalidated: RefCell<Vec<(NativeHandle, bool)>>,
    paints_begun: Cell<usize>,
    paints_ended: Cell<usize>,
    fills: RefCell<Vec<Background>>,
    graphics_startups: Cell<usize>,
    graphics_shutdowns: Cell<usize>,
    confirm_answer: Cell<bool>,
    prompts: RefCell<Vec<(Option<NativeHandle>, String, String)>>,
}

impl RecordingPlatform {
    pub(crate) fn new() -> Self {
        Self {
            live: RefCell::new(HashSet::new()),
            routed: RefCell::new(HashSet::new()),
            texts: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            classes: RefCell::new(Vec::new()),
            fail_next_create: Cell::new(false),
            destroyed: RefCell::new(Vec::new()),
            default_calls: Cell::new(0),
            quits: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            shown: RefCell::new(Vec::new()),
            updated: RefCell::new(Vec::new()),
            invalidated: RefCell::new(Vec::new()),
            paints_begun: Cell::new(0),
            paints_ended: Cell::new(0),
            fills: RefCell::new(Vec::new()),
            graphics_startups: Cell::new(0),
            graphics_shutdowns: Cell::new(0),
            confirm_answer: Cell::new(true),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn fail_next_create(&self) {
        self.fail_next_create.set(true);
    }

    pub(crate) fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Queues `message` for `handle`; `show` dispatches it.
    pub(crate) fn post(&self, handle: NativeHandle, message: Message) {
        self.queue
            .borrow_mut()
            .push_back(Retrieved::Message(QueuedMessage::new(Some(handle), message)));
    }

    /// Queues a quit entry without recording a `post_quit` call.
    pub(crate) fn post_quit_code(&self, code: usize) {
        self.queue.borrow_mut().push_back(Retrieved::Quit(code));
    }

    pub(crate) fn created_requests(&self) -> Vec<CreateRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn registered_classes(&self) -> Vec<WindowClass> {
        self.classes.borrow().clone()
    }

    pub(crate) fn destroyed(&self) -> Vec<NativeHandle> {
        self.destroyed.borrow().clone()
    }

    pub(crate) fn is_live(&self, handle: NativeHandle) -> bool {
        self.live.borrow().contains(&handle)
    }

    pub(crate) fn default_procedure_calls(&self) -> usize {
        self.default_calls.get()
    }

    pub(crate) fn quit_codes(&self) -> Vec<i32> {
        self.quits.borrow().clone()
    }

    pub(crate) fn shown(&self) -> Vec<(NativeHandle, ShowCommand)> {
        self.shown.borrow().clone()
    }

    pub(crate) fn updated(&self) -> Vec<NativeHandle> {
        self.updated.borrow().clone()
    }

    pub(crate) fn invalidated(&self) -> Vec<(NativeHandle, bool)> {
        self.invalidated.borrow().clone()
    }

    pub(crate) fn text_of(&self, handle: NativeHandle) -> Option<String> {
        self.texts.borrow().get(&handle).cloned()
    }

    pub(crate) fn paints_begun(&self) -> usize {
        self.paints_begun.get()
    }

    pub(crate) fn paints_ended(&self) -> usize {
        self.paints_ended.get()
    }

    pub(crate) fn fills(&self) -> Vec<Background> {
        self.fills.borrow().clone()
    }

    pub(crate) fn graphics_startups(&self) -> usize {
        self.graphics_startups.get()
    }

    pub(crate) fn graphics_shutdowns(&self) -> usize {
        self.graphics_shutdowns.get()
    }

    pub(crate) fn prompts(&self) -> Vec<(Option<NativeHandle>, String, String)> {
        self.prompts.borrow().clone()
    }
}

impl Platform for RecordingPlatform {
    fn register_class(&self, class: &WindowClass) -> PlatformResult<()> {
        let mut classes = self.classes.borrow_mut();
        if !classes.iter().any(|known| known.class_name == class.class_name) {
            classes.push(class.clone());
        }
        Ok(())
    }

    fn create_window(&self, request: &CreateRequest) -> PlatformResult<NativeHandle> {
        if self.fail_next_create.replace(false) {
            return Err(PlatformError::OperationFailed(format!(
                "creation of '{}' rejected",
                request.class_name
            )));
        }

        let handle = NativeHandle::from_raw(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        self.requests.borrow_mut().push(request.clone());
        self.live.borrow_mut().insert(handle);
        self.texts.borrow_mut().insert(handle, request.title.clone());

        if let Some(key) = request.creation_key {
            self.routed.borrow_mut().insert(handle);
            route_message(self, handle, Message::on_nc_create(), Some(key));
            route_message(self, handle, Message::on_create(), None);
        }
        Ok(handle)
    }

    fn destroy_window(&self, handle: NativeHandle) -> PlatformResult<()> {
        if !self.live.borrow_mut().remove(&handle) {
            return Err(PlatformError::InvalidHandle(format!(
                "{handle} is not a live window"
            )));
        }
        self.texts.borrow_mut().remove(&handle);
        self.destroyed.borrow_mut().push(handle);

        let routed = self.routed.borrow_mut().remove(&handle);
        if routed {
            route_message(self, handle, Message::on_destroy(), None);
            route_message(self, handle, Message::on_nc_destroy(), None);
        }
        Ok(())
    }

    fn default_procedure(&self, _handle: NativeHandle, _message: &Message) -> LResult {
        self.default_calls.set(self.default_calls.get() + 1);
        0
    }

    fn post_quit(&self, exit_code: i32) {
        self.quits.borrow_mut().push(exit_code);
        self.queue
            .borrow_mut()
            .push_back(Retrieved::Quit(exit_code as usize));
    }

    fn show_window(&self, handle: NativeHandle, command: ShowCommand) {
        self.shown.borrow_mut().push((handle, command));
    }

    fn update_window(&self, handle: NativeHandle) {
        self.updated.borrow_mut().push(handle);
    }

    fn invalidate(&self, handle: NativeHandle, erase: bool) {
        self.invalidated.borrow_mut().push((handle, erase));
    }

    fn next_message(&self) -> PlatformResult<Retrieved> {
        let next = self.queue.borrow_mut().pop_front();
        next.ok_or_else(|| PlatformError::OperationFailed("message queue is empty".to_string()))
    }

    fn dispatch_message(&self, queued: &QueuedMessage) {
        if let Some(handle) = queued.handle {
            route_message(self, handle, queued.message, None);
        }
    }

    fn window_text(&self, handle: NativeHandle, buffer: &mut [u16]) -> usize {
        let texts = self.texts.borrow();
        let Some(text) = texts.get(&handle) else {
            return 0;
        };
        let utf16: Vec<u16> = text.encode_utf16().collect();
        let count = utf16.len().min(buffer.len().saturating_sub(1));
        buffer[..count].copy_from_slice(&utf16[..count]);
        if count < buffer.len() {
            buffer[count] = 0;
        }
        count
    }

    fn set_window_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        if !self.is_live(handle) {
            return Err(PlatformError::InvalidHandle(format!(
                "{handle} is not a live window"
            )));
        }
        self.texts.borrow_mut().insert(handle, text.to_string());
        Ok(())
    }

    fn begin_paint(&self, _handle: NativeHandle) -> PlatformResult<PaintSession> {
        self.paints_begun.set(self.paints_begun.get() + 1);
        Ok(PaintSession::new(PAINT_DEVICE_CONTEXT, Rect::default(), true))
    }

    fn fill_background(&self, _session: &PaintSession, background: Background) {
        self.fills.borrow_mut().push(background);
    }

    fn end_paint(&self, _handle: NativeHandle, _session: PaintSession) {
        self.paints_ended.set(self.paints_ended.get() + 1);
    }

    fn graphics_startup(&self) -> PlatformResult<GraphicsToken> {
        self.graphics_startups.set(self.graphics_startups.get() + 1);
        Ok(GraphicsToken::from_raw(self.graphics_startups.get()))
    }

    fn graphics_shutdown(&self, _token: GraphicsToken) {
        self.graphics_shutdowns.set(self.graphics_shutdowns.get() + 1);
    }

    fn confirm(&self, owner: Option<NativeHandle>, text: &str, caption: &str) -> bool {
        self.prompts
            .borrow_mut()
            .push((owner, text.to_string(), caption.to_string()));
        self.confirm_answer.get()
    }
}
