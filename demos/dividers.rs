/*
 * Lists the divisors of the number typed into the input field.
 */
#[cfg(target_os = "windows")]
fn divisors(number: u64) -> String {
    (1..=number)
        .filter(|candidate| number % candidate == 0)
        .map(|divisor| divisor.to_string())
        .collect::<Vec<_>>()
        .join("\r\n")
}

#[cfg(target_os = "windows")]
fn main() -> Result<(), mingl::PlatformError> {
    use mingl::{Geometry, GuiObject, ShowCommand, Window, WindowConfig};

    env_logger::init();

    let config =
        WindowConfig::new("Delitele cisla").with_geometry(Geometry::new(100, 100, 300, 200));
    let mut window = Window::new(config);

    window.add_label(1, "Zadaj cislo: ", 10, 10, 110, 20)?;

    let mut input = GuiObject::number_input(2, Geometry::new(130, 10, 50, 20));
    input.add_border().align_center();
    window.add_object(input)?;

    window
        .add_edit_text(3, 10, 40, 250, 100)?
        .add_border()
        .read_only()
        .enable_multi_line()
        .enable_vertical_scroll();

    let win = window.downgrade();
    window.add_button_with_click(4, "Vypocitaj", 190, 10, 70, 20, move || {
        let text = match win.number_of(2) {
            Some(number) if number > 0 => divisors(number),
            _ => "Zadaj kladne cele cislo".to_string(),
        };
        if let Err(err) = win.set_text_of(3, &text) {
            log::error!("dividers: updating the result failed: {err}");
        }
    })?;

    window.create()?;
    let code = window.show(ShowCommand::Default)?;
    std::process::exit(code as i32);
}

#[cfg(not(target_os = "windows"))]
fn main() {
    eprintln!("This demo requires Windows.");
}
