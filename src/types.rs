/*
 * Platform-agnostic value types used across the crate: opaque native handles,
 * logical identifiers, geometry, style bit sets and window configuration.
 * None of these touch the OS, so they compile and test on every platform.
 */
use std::fmt;
use std::ops::BitOr;

/// Opaque identifier the OS assigns to a created window or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(isize);

impl NativeHandle {
    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> isize {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/*
 * Key of a window instance inside the thread-local dispatch arena. Keys start
 * at 1 so that a zero creation parameter never resolves to an instance.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowKey(u64);

impl WindowKey {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Numeric id of a child object; doubles as the control id reported in `WM_COMMAND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(i32);

impl ObjectId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for ObjectId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }
}

/*
 * Position and size of a window or control. Top-level windows default every
 * field to `USE_DEFAULT`, letting the window manager pick.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    /// Same bit pattern as Win32 `CW_USEDEFAULT`.
    pub const USE_DEFAULT: i32 = i32::MIN;

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(
            Self::USE_DEFAULT,
            Self::USE_DEFAULT,
            Self::USE_DEFAULT,
            Self::USE_DEFAULT,
        )
    }
}

/// Window style bits (`WS_*`, plus control specific `BS_*`, `ES_*`, `SS_*` bits in the low word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowStyle(u32);

impl WindowStyle {
    pub const OVERLAPPED_WINDOW: Self = Self(0x00CF_0000);
    pub const CHILD: Self = Self(0x4000_0000);
    pub const VISIBLE: Self = Self(0x1000_0000);
    pub const CLIP_CHILDREN: Self = Self(0x0200_0000);
    pub const BORDER: Self = Self(0x0080_0000);
    pub const VSCROLL: Self = Self(0x0020_0000);
    pub const HSCROLL: Self = Self(0x0010_0000);
    pub const TAB_STOP: Self = Self(0x0001_0000);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /*
     * Clears `other`. Returns false, leaving the set untouched, when none of
     * the requested bits were present.
     */
    pub fn remove(&mut self, other: Self) -> bool {
        let present = self.0 & other.0 != 0;
        self.0 &= !other.0;
        present
    }
}

impl BitOr for WindowStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Extended window style bits (`WS_EX_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExtendedStyle(u32);

impl ExtendedStyle {
    pub const CLIENT_EDGE: Self = Self(0x0000_0200);
    pub const NO_PARENT_NOTIFY: Self = Self(0x0000_0004);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) -> bool {
        let present = self.0 & other.0 != 0;
        self.0 &= !other.0;
        present
    }
}

impl BitOr for ExtendedStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How `show` presents the window; values match `SW_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowCommand {
    Hide,
    Normal,
    Minimized,
    Maximized,
    Show,
    #[default]
    Default,
}

impl ShowCommand {
    pub const fn as_raw(self) -> i32 {
        match self {
            ShowCommand::Hide => 0,
            ShowCommand::Normal => 1,
            ShowCommand::Minimized => 2,
            ShowCommand::Maximized => 3,
            ShowCommand::Show => 5,
            ShowCommand::Default => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }
}

/*
 * Construction parameters for a top-level window. The defaults give an
 * untitled overlapped window placed and sized by the window manager.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub geometry: Geometry,
    pub style: WindowStyle,
    pub ex_style: ExtendedStyle,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_ex_style(mut self, ex_style: ExtendedStyle) -> Self {
        self.ex_style = ex_style;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            geometry: Geometry::default(),
            style: WindowStyle::OVERLAPPED_WINDOW,
            ex_style: ExtendedStyle::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_style_clears_only_present_bits() {
        // Arrange
        let mut style = WindowStyle::CHILD | WindowStyle::VISIBLE;
        // Act
        let removed = style.remove(WindowStyle::VISIBLE);
        // Assert
        assert!(removed);
        assert_eq!(style, WindowStyle::CHILD);
    }

    #[test]
    fn remove_absent_style_is_a_reported_no_op() {
        let mut style = WindowStyle::CHILD;
        assert!(!style.remove(WindowStyle::BORDER));
        assert_eq!(style, WindowStyle::CHILD);
        // A second removal must not toggle the bit back on.
        assert!(!style.remove(WindowStyle::BORDER));
        assert!(!style.contains(WindowStyle::BORDER));
    }

    #[test]
    fn default_geometry_uses_window_manager_placement() {
        let geometry = Geometry::default();
        assert_eq!(geometry.x, Geometry::USE_DEFAULT);
        assert_eq!(geometry.height, Geometry::USE_DEFAULT);
        assert_eq!(Geometry::USE_DEFAULT as u32, 0x8000_0000);
    }

    #[test]
    fn window_config_builder_overrides_defaults() {
        let config = WindowConfig::new("Platno").with_geometry(Geometry::new(100, 100, 600, 600));
        assert_eq!(config.title, "Platno");
        assert_eq!(config.geometry.width, 600);
        assert_eq!(config.style, WindowStyle::OVERLAPPED_WINDOW);
    }
}
