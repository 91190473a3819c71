/*
 * Static text labels.
 */
use super::gui_object::{ControlKind, GuiObject};
use crate::types::{Geometry, ObjectId, WindowStyle};

pub(crate) const SS_LEFT: WindowStyle = WindowStyle::from_bits(0x0000_0000);

impl GuiObject {
    pub fn label(id: impl Into<ObjectId>, text: impl Into<String>, geometry: Geometry) -> Self {
        Self::with_kind(
            ControlKind::Label,
            "STATIC".to_string(),
            id.into(),
            text.into(),
            geometry,
            WindowStyle::VISIBLE | SS_LEFT,
        )
    }
}
