/*
 * Win32 implementation of `Platform`. Every class registered here uses
 * `window_proc_trampoline` as its window procedure; the trampoline recovers
 * the creation key from `CREATESTRUCTW` on `WM_NCCREATE` and hands each
 * message to `dispatch::route_message`.
 *
 * Handles cross the boundary as raw integers: `HWND` and `HDC` are converted
 * to and from `NativeHandle` and `PaintSession::device_context` here and
 * nowhere else.
 */
use crate::controls::styling_handler::color_to_colorref;
use crate::dispatch::route_message;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::message::Message;
use crate::platform::{
    Background, CreateRequest, GraphicsToken, LResult, PaintSession, Platform, QueuedMessage,
    Retrieved, SystemCursor, SystemIcon, WindowClass,
};
use crate::types::{NativeHandle, Point, Rect, ShowCommand, WindowKey};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::null_mut;

use windows::Win32::{
    Foundation::{COLORREF, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
    Graphics::{
        Gdi::{
            BeginPaint, COLOR_BTNFACE, COLOR_WINDOW, CreateSolidBrush, DeleteObject, EndPaint,
            FillRect, GetSysColorBrush, HBRUSH, HDC, InvalidateRect, PAINTSTRUCT, UpdateWindow,
        },
        GdiPlus::{GdiplusShutdown, GdiplusStartup, GdiplusStartupInput},
    },
    System::LibraryLoader::GetModuleHandleW,
    UI::WindowsAndMessaging::{
        CREATESTRUCTW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
        GetClassInfoExW, GetMessageW, GetWindowTextW, HCURSOR, HICON, HMENU, IDC_ARROW, IDC_CROSS,
        IDC_HAND, IDC_IBEAM, IDC_WAIT, IDI_APPLICATION, IDI_ERROR, IDI_INFORMATION, IDI_QUESTION,
        IDI_WARNING, IDOK, LoadCursorW, LoadIconW, MB_ICONQUESTION, MB_OKCANCEL, MSG, MessageBoxW,
        PostQuitMessage, RegisterClassExW, SHOW_WINDOW_CMD, SetWindowTextW, ShowWindow,
        TranslateMessage, WINDOW_EX_STYLE, WINDOW_STYLE, WM_NCCREATE, WNDCLASS_STYLES, WNDCLASSEXW,
    },
};
use windows::core::{HSTRING, PCWSTR};

use log::{debug, error, trace, warn};

fn hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.raw() as *mut c_void)
}

fn native(hwnd: HWND) -> NativeHandle {
    NativeHandle::from_raw(hwnd.0 as isize)
}

fn last_error(call: &str) -> PlatformError {
    let error = unsafe { GetLastError() };
    PlatformError::OperationFailed(format!("{call} failed: {error:?}"))
}

fn instance() -> PlatformResult<HINSTANCE> {
    let module = unsafe { GetModuleHandleW(None) }?;
    Ok(module.into())
}

fn load_icon(icon: Option<SystemIcon>) -> PlatformResult<HICON> {
    let Some(icon) = icon else {
        return Ok(HICON::default());
    };
    let id = match icon {
        SystemIcon::Application => IDI_APPLICATION,
        SystemIcon::Information => IDI_INFORMATION,
        SystemIcon::Warning => IDI_WARNING,
        SystemIcon::Error => IDI_ERROR,
        SystemIcon::Question => IDI_QUESTION,
    };
    Ok(unsafe { LoadIconW(None, id) }?)
}

fn load_cursor(cursor: Option<SystemCursor>) -> PlatformResult<HCURSOR> {
    let Some(cursor) = cursor else {
        return Ok(HCURSOR::default());
    };
    let id = match cursor {
        SystemCursor::Arrow => IDC_ARROW,
        SystemCursor::IBeam => IDC_IBEAM,
        SystemCursor::Hand => IDC_HAND,
        SystemCursor::Cross => IDC_CROSS,
        SystemCursor::Wait => IDC_WAIT,
    };
    Ok(unsafe { LoadCursorW(None, id) }?)
}

/*
 * Class background brush. System colors use the `COLOR_* + 1` convention;
 * a solid brush lives as long as the class, which is the process.
 */
fn class_brush(background: Background) -> HBRUSH {
    match background {
        Background::SystemWindow => HBRUSH((COLOR_WINDOW.0 + 1) as usize as *mut c_void),
        Background::SystemButtonFace => HBRUSH((COLOR_BTNFACE.0 + 1) as usize as *mut c_void),
        Background::Solid(color) => unsafe {
            CreateSolidBrush(COLORREF(color_to_colorref(&color)))
        },
        Background::None => HBRUSH::default(),
    }
}

thread_local! {
    /* Platform the trampoline routes through; windows live on one thread. */
    static ROUTER: Win32Platform = Win32Platform::new();
}

/*
 * Window procedure of every class registered through `Win32Platform`.
 * Messages that arrive while the thread is tearing down its locals skip the
 * router and go straight to the default procedure.
 */
unsafe extern "system" fn window_proc_trampoline(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let creation_key = if msg == WM_NCCREATE && lparam.0 != 0 {
        let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        match create_struct.lpCreateParams as usize as u64 {
            0 => None,
            raw => Some(WindowKey::from_raw(raw)),
        }
    } else {
        None
    };

    let message = Message::new(msg, wparam.0, lparam.0);
    match ROUTER.try_with(|router| route_message(router, native(hwnd), message, creation_key)) {
        Ok(result) => LRESULT(result),
        Err(_) => {
            warn!("Win32: message {msg:#06x} for {hwnd:?} arrived during thread teardown");
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
    }
}

#[derive(Default)]
pub struct Win32Platform {
    open_paints: RefCell<HashMap<isize, PAINTSTRUCT>>,
}

impl Win32Platform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for Win32Platform {
    fn register_class(&self, class: &WindowClass) -> PlatformResult<()> {
        let h_instance = instance()?;
        let class_name = HSTRING::from(class.class_name.as_str());
        let menu_name = class.menu_name.as_deref().map(HSTRING::from);

        unsafe {
            let mut existing = WNDCLASSEXW::default();
            if GetClassInfoExW(Some(h_instance), &class_name, &mut existing).is_ok() {
                debug!("Win32: window class '{}' already registered", class.class_name);
                return Ok(());
            }

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: WNDCLASS_STYLES(class.style.bits()),
                lpfnWndProc: Some(window_proc_trampoline),
                cbClsExtra: class.class_extra_bytes,
                cbWndExtra: class.window_extra_bytes,
                hInstance: h_instance,
                hIcon: load_icon(class.icon)?,
                hCursor: load_cursor(class.cursor)?,
                hbrBackground: class_brush(class.background),
                lpszMenuName: menu_name
                    .as_ref()
                    .map_or(PCWSTR::null(), |name| PCWSTR(name.as_ptr())),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                hIconSm: load_icon(class.small_icon)?,
            };

            if RegisterClassExW(&wc) == 0 {
                let error = GetLastError();
                error!("Win32: RegisterClassExW for '{}' failed: {error:?}", class.class_name);
                return Err(PlatformError::InitializationFailed(format!(
                    "RegisterClassExW failed: {error:?}"
                )));
            }
        }
        debug!("Win32: window class '{}' registered", class.class_name);
        Ok(())
    }

    fn create_window(&self, request: &CreateRequest) -> PlatformResult<NativeHandle> {
        let h_instance = instance()?;
        let menu = request
            .control_id
            .map(|id| HMENU(id.raw() as usize as *mut c_void));
        let creation_param = request
            .creation_key
            .map(|key| key.raw() as usize as *const c_void);

        let created = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(request.ex_style.bits()),
                &HSTRING::from(request.class_name.as_str()),
                &HSTRING::from(request.title.as_str()),
                WINDOW_STYLE(request.style.bits()),
                request.geometry.x,
                request.geometry.y,
                request.geometry.width,
                request.geometry.height,
                request.parent.map(hwnd),
                menu,
                Some(h_instance),
                creation_param,
            )
        }?;
        trace!("Win32: created '{}' as {}", request.class_name, native(created));
        Ok(native(created))
    }

    fn destroy_window(&self, handle: NativeHandle) -> PlatformResult<()> {
        unsafe { DestroyWindow(hwnd(handle)) }?;
        Ok(())
    }

    fn default_procedure(&self, handle: NativeHandle, message: &Message) -> LResult {
        let result = unsafe {
            DefWindowProcW(
                hwnd(handle),
                message.id(),
                WPARAM(message.wparam()),
                LPARAM(message.lparam()),
            )
        };
        result.0
    }

    fn post_quit(&self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }

    fn show_window(&self, handle: NativeHandle, command: ShowCommand) {
        let _ = unsafe { ShowWindow(hwnd(handle), SHOW_WINDOW_CMD(command.as_raw())) };
    }

    fn update_window(&self, handle: NativeHandle) {
        let _ = unsafe { UpdateWindow(hwnd(handle)) };
    }

    fn invalidate(&self, handle: NativeHandle, erase: bool) {
        let _ = unsafe { InvalidateRect(Some(hwnd(handle)), None, erase) };
    }

    fn next_message(&self) -> PlatformResult<Retrieved> {
        let mut msg = MSG::default();
        let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match status.0 {
            -1 => Err(last_error("GetMessageW")),
            0 => Ok(Retrieved::Quit(msg.wParam.0)),
            _ => Ok(Retrieved::Message(QueuedMessage {
                handle: (!msg.hwnd.is_invalid()).then(|| native(msg.hwnd)),
                message: Message::new(msg.message, msg.wParam.0, msg.lParam.0),
                time: msg.time,
                point: Point::new(msg.pt.x, msg.pt.y),
            })),
        }
    }

    fn dispatch_message(&self, queued: &QueuedMessage) {
        let msg = MSG {
            hwnd: queued.handle.map(hwnd).unwrap_or_default(),
            message: queued.message.id(),
            wParam: WPARAM(queued.message.wparam()),
            lParam: LPARAM(queued.message.lparam()),
            time: queued.time,
            pt: windows::Win32::Foundation::POINT {
                x: queued.point.x,
                y: queued.point.y,
            },
        };
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    fn window_text(&self, handle: NativeHandle, buffer: &mut [u16]) -> usize {
        let copied = unsafe { GetWindowTextW(hwnd(handle), buffer) };
        copied.max(0) as usize
    }

    fn set_window_text(&self, handle: NativeHandle, text: &str) -> PlatformResult<()> {
        unsafe { SetWindowTextW(hwnd(handle), &HSTRING::from(text)) }?;
        Ok(())
    }

    fn begin_paint(&self, handle: NativeHandle) -> PlatformResult<PaintSession> {
        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(hwnd(handle), &mut ps) };
        if hdc.is_invalid() {
            return Err(PlatformError::InvalidHandle(format!(
                "BeginPaint returned no device context for {handle}"
            )));
        }
        let update_rect = Rect {
            left: ps.rcPaint.left,
            top: ps.rcPaint.top,
            right: ps.rcPaint.right,
            bottom: ps.rcPaint.bottom,
        };
        let session = PaintSession::new(hdc.0 as isize, update_rect, ps.fErase.as_bool());
        self.open_paints.borrow_mut().insert(handle.raw(), ps);
        Ok(session)
    }

    fn fill_background(&self, session: &PaintSession, background: Background) {
        let hdc = HDC(session.device_context() as *mut c_void);
        let area = session.update_rect();
        let rect = RECT {
            left: area.left,
            top: area.top,
            right: area.right,
            bottom: area.bottom,
        };
        unsafe {
            match background {
                Background::SystemWindow => {
                    FillRect(hdc, &rect, GetSysColorBrush(COLOR_WINDOW));
                }
                Background::SystemButtonFace => {
                    FillRect(hdc, &rect, GetSysColorBrush(COLOR_BTNFACE));
                }
                Background::Solid(color) => {
                    let brush = CreateSolidBrush(COLORREF(color_to_colorref(&color)));
                    FillRect(hdc, &rect, brush);
                    let _ = DeleteObject(brush.into());
                }
                Background::None => {}
            }
        }
    }

    fn end_paint(&self, handle: NativeHandle, _session: PaintSession) {
        match self.open_paints.borrow_mut().remove(&handle.raw()) {
            Some(ps) => {
                let _ = unsafe { EndPaint(hwnd(handle), &ps) };
            }
            None => warn!("Win32: end_paint for {handle} without a matching begin_paint"),
        }
    }

    fn graphics_startup(&self) -> PlatformResult<GraphicsToken> {
        let input = GdiplusStartupInput {
            GdiplusVersion: 1,
            ..Default::default()
        };
        let mut token = 0usize;
        let status = unsafe { GdiplusStartup(&mut token, &input, null_mut()) };
        if status.0 != 0 {
            return Err(PlatformError::InitializationFailed(format!(
                "GdiplusStartup failed with status {}",
                status.0
            )));
        }
        debug!("Win32: GDI+ started");
        Ok(GraphicsToken::from_raw(token))
    }

    fn graphics_shutdown(&self, token: GraphicsToken) {
        unsafe { GdiplusShutdown(token.raw()) };
        debug!("Win32: GDI+ shut down");
    }

    fn confirm(&self, owner: Option<NativeHandle>, text: &str, caption: &str) -> bool {
        let answer = unsafe {
            MessageBoxW(
                owner.map(hwnd),
                &HSTRING::from(text),
                &HSTRING::from(caption),
                MB_OKCANCEL | MB_ICONQUESTION,
            )
        };
        answer == IDOK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ids;
    use crate::types::Geometry;
    use windows::Win32::UI::WindowsAndMessaging::{
        CW_USEDEFAULT, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_DESTROY, WM_LBUTTONDOWN, WM_NCCREATE,
        WM_NCDESTROY, WM_PAINT, WM_RBUTTONDOWN,
    };

    #[test]
    fn message_ids_match_win32_constants() {
        assert_eq!(ids::CREATE, WM_CREATE);
        assert_eq!(ids::DESTROY, WM_DESTROY);
        assert_eq!(ids::PAINT, WM_PAINT);
        assert_eq!(ids::CLOSE, WM_CLOSE);
        assert_eq!(ids::NC_CREATE, WM_NCCREATE);
        assert_eq!(ids::NC_DESTROY, WM_NCDESTROY);
        assert_eq!(ids::COMMAND, WM_COMMAND);
        assert_eq!(ids::LEFT_BUTTON_DOWN, WM_LBUTTONDOWN);
        assert_eq!(ids::RIGHT_BUTTON_DOWN, WM_RBUTTONDOWN);
        assert_eq!(Geometry::USE_DEFAULT, CW_USEDEFAULT);
    }

    #[test]
    fn trampoline_reuses_one_router_per_thread() {
        ROUTER.with(|outer| {
            ROUTER.with(|inner| assert!(std::ptr::eq(outer, inner)));
        });
        let here = ROUTER.with(|router| router as *const Win32Platform as usize);
        let elsewhere = std::thread::spawn(|| {
            ROUTER.with(|router| router as *const Win32Platform as usize)
        })
        .join()
        .expect("router thread");
        assert_ne!(here, elsewhere);
    }

    #[test]
    fn handle_conversion_is_lossless() {
        let handle = NativeHandle::from_raw(0x0012_3450);
        assert_eq!(native(hwnd(handle)), handle);
    }
}
