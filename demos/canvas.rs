/*
 * Left click adds a vertex to a polyline, right click switches its color.
 */
#[cfg(target_os = "windows")]
fn main() -> Result<(), mingl::PlatformError> {
    use mingl::gdiplus::Graphics;
    use mingl::{Color, Geometry, Point, ShowCommand, Window, WindowConfig};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const PALETTE: [Color; 4] = [
        Color::BLACK,
        Color::rgb(200, 30, 30),
        Color::rgb(30, 140, 60),
        Color::rgb(40, 70, 200),
    ];

    env_logger::init();

    let config = WindowConfig::new("Platno").with_geometry(Geometry::new(100, 100, 600, 600));
    let mut window = Window::new(config);

    let points: Rc<RefCell<Vec<Point>>> = Rc::new(RefCell::new(Vec::new()));
    let color_index = Rc::new(Cell::new(0usize));

    let (clicked, win) = (Rc::clone(&points), window.downgrade());
    window.add_on_left_mouse_handler(move |point| {
        clicked.borrow_mut().push(point);
        win.redraw();
    });

    let (index, win) = (Rc::clone(&color_index), window.downgrade());
    window.add_on_right_mouse_handler(move |_| {
        index.set((index.get() + 1) % PALETTE.len());
        win.redraw();
    });

    let (drawn, index) = (Rc::clone(&points), Rc::clone(&color_index));
    window.add_on_draw_handler(move |session| {
        let outcome = Graphics::from_paint(session).and_then(|graphics| {
            graphics.set_antialias()?;
            graphics.draw_lines(PALETTE[index.get()], 2.0, &drawn.borrow())
        });
        if let Err(err) = outcome {
            log::warn!("canvas: drawing failed: {err}");
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
