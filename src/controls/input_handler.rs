/*
 * Edit controls: plain text inputs and numeric inputs, plus the style
 * helpers that configure them before realization (border, read-only,
 * multi-line, scrolling, alignment).
 */
use super::gui_object::{ControlKind, GuiObject};
use crate::platform::Platform;
use crate::types::{ExtendedStyle, Geometry, ObjectId, WindowStyle};

use log::warn;

pub(crate) const ES_CENTER: WindowStyle = WindowStyle::from_bits(0x0001);
pub(crate) const ES_MULTILINE: WindowStyle = WindowStyle::from_bits(0x0004);
pub(crate) const ES_AUTOVSCROLL: WindowStyle = WindowStyle::from_bits(0x0040);
pub(crate) const ES_AUTOHSCROLL: WindowStyle = WindowStyle::from_bits(0x0080);
pub(crate) const ES_READONLY: WindowStyle = WindowStyle::from_bits(0x0800);
pub(crate) const ES_NUMBER: WindowStyle = WindowStyle::from_bits(0x2000);

impl GuiObject {
    pub fn edit_text(id: impl Into<ObjectId>, text: impl Into<String>, geometry: Geometry) -> Self {
        Self::with_kind(
            ControlKind::EditText,
            "EDIT".to_string(),
            id.into(),
            text.into(),
            geometry,
            WindowStyle::VISIBLE | WindowStyle::TAB_STOP | ES_AUTOHSCROLL,
        )
    }

    /// Edit control that only accepts digits.
    pub fn number_input(id: impl Into<ObjectId>, geometry: Geometry) -> Self {
        Self::with_kind(
            ControlKind::NumberInput,
            "EDIT".to_string(),
            id.into(),
            String::new(),
            geometry,
            WindowStyle::VISIBLE | WindowStyle::TAB_STOP | ES_AUTOHSCROLL | ES_NUMBER,
        )
    }

    pub fn add_border(&mut self) -> &mut Self {
        self.add_ex_style(ExtendedStyle::CLIENT_EDGE);
        self
    }

    pub fn read_only(&mut self) -> &mut Self {
        self.edit_style(ES_READONLY, "read_only")
    }

    pub fn enable_multi_line(&mut self) -> &mut Self {
        self.edit_style(ES_MULTILINE, "enable_multi_line")
    }

    pub fn enable_vertical_scroll(&mut self) -> &mut Self {
        self.add_style(WindowStyle::VSCROLL);
        self.edit_style(ES_AUTOVSCROLL, "enable_vertical_scroll")
    }

    pub fn align_center(&mut self) -> &mut Self {
        self.edit_style(ES_CENTER, "align_center")
    }

    /*
     * Numeric value of the control's text. Surrounding whitespace is ignored;
     * empty or non-numeric text yields `None`.
     */
    pub fn number(&self, platform: &dyn Platform) -> Option<u64> {
        parse_number(&self.text(platform, None))
    }

    fn edit_style(&mut self, style: WindowStyle, operation: &str) -> &mut Self {
        if !self.kind().is_edit() {
            warn!(
                "InputHandler: {operation} applied to non-edit object {} ({:?})",
                self.id().raw(),
                self.kind()
            );
        }
        self.add_style(style);
        self
    }
}

fn parse_number(text: &str) -> Option<u64> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPlatform;

    #[test]
    fn output_box_configuration_accumulates_styles() {
        // Arrange
        let mut output = GuiObject::edit_text(3, "", Geometry::new(10, 40, 250, 100));
        // Act
        output
            .add_border()
            .read_only()
            .enable_multi_line()
            .enable_vertical_scroll();
        // Assert
        let style = output.style();
        assert!(style.contains(ES_READONLY));
        assert!(style.contains(ES_MULTILINE));
        assert!(style.contains(ES_AUTOVSCROLL));
        assert!(style.contains(WindowStyle::VSCROLL));
        assert!(output.ex_style().contains(ExtendedStyle::CLIENT_EDGE));
    }

    #[test]
    fn number_input_carries_number_style_and_parses_text() {
        let platform = RecordingPlatform::new();
        let mut input = GuiObject::number_input(2, Geometry::new(130, 10, 50, 20));
        input.align_center();
        assert!(input.style().contains(ES_NUMBER));
        assert!(input.style().contains(ES_CENTER));

        assert_eq!(input.number(&platform), None);
        input.set_name(" 120 ");
        assert_eq!(input.number(&platform), Some(120));
        input.set_name("12a");
        assert_eq!(input.number(&platform), None);
    }
}
