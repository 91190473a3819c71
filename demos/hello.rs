/*
 * Minimal window: default background paint and a close prompt.
 */
#[cfg(target_os = "windows")]
fn main() -> Result<(), mingl::PlatformError> {
    use mingl::{Message, ShowCommand, Window, WindowConfig};

    env_logger::init();

    let mut window = Window::new(WindowConfig::new("title"));
    let win = window.downgrade();
    window.add_handler_for(&Message::on_close(), move |_, _| {
        if win.confirm("Really quit?", "My application") {
            if let Err(err) = win.destroy() {
                log::error!("hello: destroying the window failed: {err}");
            }
        }
    });

    window.create()?;
    let code = window.show(ShowCommand::Default)?;
    std::process::exit(code as i32);
}

#[cfg(not(target_os = "windows"))]
fn main() {
    eprintln!("This demo requires Windows.");
}
