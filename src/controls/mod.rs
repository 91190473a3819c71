pub(crate) mod button_handler;
pub(crate) mod gui_object;
pub(crate) mod input_handler;
pub(crate) mod label_handler;
pub(crate) mod paint_router;
// Only the Win32 backend packs colors.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) mod styling_handler;
