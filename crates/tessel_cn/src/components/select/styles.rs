//! Style overrides handed to the dropdown widget
//!
//! The bundle names theme tokens rather than concrete colors; the renderer
//! looks them up in the active theme.

/// Theme color tokens used by the select
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Surface,
    SurfaceElevated,
    Border,
    BorderHover,
    BorderFocus,
    BorderError,
    TextPrimary,
    TextTertiary,
    Error,
}

/// Style override bundle for the dropdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectStyles {
    /// Control border at rest
    pub control_border: ColorToken,
    /// Control border while hovered
    pub control_border_hover: ColorToken,
    /// Control border while focused or open
    pub control_border_focus: ColorToken,
    pub control_background: ColorToken,
    pub placeholder: ColorToken,
    pub menu_background: ColorToken,
    /// Background of the selected and hovered options
    pub option_active_background: ColorToken,
    /// The menu is drawn in the overlay layer, above clipping ancestors
    pub menu_in_overlay: bool,
}

impl SelectStyles {
    /// Styles for the given error-display state
    ///
    /// An error keeps the error border in every interaction state so the
    /// problem stays visible while the user corrects it.
    pub fn for_state(error: bool) -> Self {
        let base = Self::default();
        if !error {
            return base;
        }
        Self {
            control_border: ColorToken::BorderError,
            control_border_hover: ColorToken::BorderError,
            control_border_focus: ColorToken::Error,
            placeholder: ColorToken::Error,
            ..base
        }
    }

    /// Whether these styles show the error state
    pub fn is_error(&self) -> bool {
        self.control_border == ColorToken::BorderError
    }
}

impl Default for SelectStyles {
    fn default() -> Self {
        Self {
            control_border: ColorToken::Border,
            control_border_hover: ColorToken::BorderHover,
            control_border_focus: ColorToken::BorderFocus,
            control_background: ColorToken::Surface,
            placeholder: ColorToken::TextTertiary,
            menu_background: ColorToken::Surface,
            option_active_background: ColorToken::SurfaceElevated,
            menu_in_overlay: true,
        }
    }
}
