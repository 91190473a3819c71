/*
 * Push buttons: construction and the click capability. A click runs the
 * callback registered with the button, whether it comes from the native
 * `WM_COMMAND`/`BN_CLICKED` notification or from `Window::perform_click`.
 */
use super::gui_object::{ClickCallback, ControlKind, GuiObject};
use crate::types::{Geometry, ObjectId, WindowStyle};

use std::rc::Rc;

pub(crate) const BS_PUSHBUTTON: WindowStyle = WindowStyle::from_bits(0x0000_0000);

impl GuiObject {
    pub fn button(id: impl Into<ObjectId>, title: impl Into<String>, geometry: Geometry) -> Self {
        Self::with_kind(
            ControlKind::Button,
            "BUTTON".to_string(),
            id.into(),
            title.into(),
            geometry,
            WindowStyle::VISIBLE | WindowStyle::TAB_STOP | BS_PUSHBUTTON,
        )
    }

    pub fn button_with_click<F>(
        id: impl Into<ObjectId>,
        title: impl Into<String>,
        geometry: Geometry,
        on_click: F,
    ) -> Self
    where
        F: Fn() + 'static,
    {
        let mut button = Self::button(id, title, geometry);
        button.set_on_click(on_click);
        button
    }

    /// Replaces the click callback. Any object kind may carry one.
    pub fn set_on_click<F>(&mut self, on_click: F) -> &mut Self
    where
        F: Fn() + 'static,
    {
        self.on_click = Some(Rc::new(on_click));
        self
    }

    pub fn clear_on_click(&mut self) {
        self.on_click = None;
    }

    pub fn is_clickable(&self) -> bool {
        self.on_click.is_some()
    }

    /*
     * Shared handle to the click callback, so it can be invoked after the
     * borrow on the owning arena has been released.
     */
    pub(crate) fn click_callback(&self) -> Option<ClickCallback> {
        self.on_click.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn button_uses_native_button_class_and_visible_style() {
        let button = GuiObject::button(4, "Vypocitaj", Geometry::new(190, 10, 80, 24));

        assert_eq!(button.class_name(), "BUTTON");
        assert_eq!(button.kind(), ControlKind::Button);
        assert!(button.style().contains(WindowStyle::VISIBLE));
        assert!(!button.is_clickable());
    }

    #[test]
    fn click_callback_is_shared_and_replaceable() {
        // Arrange
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let mut button = GuiObject::button_with_click(1, "ok", Geometry::new(0, 0, 1, 1), move || {
            counter.set(counter.get() + 1)
        });
        // Act
        if let Some(callback) = button.click_callback() {
            callback();
        }
        button.clear_on_click();
        // Assert
        assert_eq!(clicks.get(), 1);
        assert!(button.click_callback().is_none());
    }
}
