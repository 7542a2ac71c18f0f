//! Named blend modes and the fixed-function blend state they select.

use serde::{Deserialize, Serialize};

/// A blend equation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Source and destination factors for color and alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendState {
    pub const fn new(
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        }
    }
}

/// How a draw pass is composited onto its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Alpha,
    Add,
    Multiply,
    Screen,
    Overlay,
    Custom(BlendState),
    /// Overwrite the target.
    Disabled,
}

impl BlendMode {
    /// Resolves a blend mode name. No name means blending is off; an unknown
    /// name falls back to [`BlendMode::Alpha`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            None | Some("") | Some("disabled") => BlendMode::Disabled,
            Some("alpha") => BlendMode::Alpha,
            Some("add") => BlendMode::Add,
            Some("multiply") => BlendMode::Multiply,
            Some("screen") => BlendMode::Screen,
            Some("overlay") => BlendMode::Overlay,
            Some(other) => {
                tracing::warn!(mode = other, "unknown blend mode, using alpha");
                BlendMode::Alpha
            }
        }
    }

    /// The blend state to enable, or `None` when blending is disabled.
    pub fn state(self) -> Option<BlendState> {
        use BlendFactor::*;
        match self {
            BlendMode::Alpha => Some(BlendState::new(SrcAlpha, OneMinusSrcAlpha, One, One)),
            BlendMode::Add => Some(BlendState::new(One, One, One, One)),
            BlendMode::Multiply => Some(BlendState::new(DstColor, Zero, DstAlpha, Zero)),
            BlendMode::Screen => Some(BlendState::new(OneMinusDstColor, One, OneMinusDstAlpha, One)),
            BlendMode::Overlay => Some(BlendState::new(
                DstColor,
                OneMinusSrcColor,
                DstAlpha,
                OneMinusSrcAlpha,
            )),
            BlendMode::Custom(state) => Some(state),
            BlendMode::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::BlendFactor::*;

    #[test]
    fn alpha_is_source_over() {
        let s = BlendMode::Alpha.state().unwrap();
        assert_eq!(s.src_rgb, SrcAlpha);
        assert_eq!(s.dst_rgb, OneMinusSrcAlpha);
        assert_eq!((s.src_alpha, s.dst_alpha), (One, One));
    }

    #[test]
    fn add_uses_one_everywhere() {
        assert_eq!(BlendMode::Add.state(), Some(BlendState::new(One, One, One, One)));
    }

    #[test]
    fn multiply_and_screen_factors() {
        assert_eq!(
            BlendMode::Multiply.state(),
            Some(BlendState::new(DstColor, Zero, DstAlpha, Zero))
        );
        assert_eq!(
            BlendMode::Screen.state(),
            Some(BlendState::new(OneMinusDstColor, One, OneMinusDstAlpha, One))
        );
    }

    #[test]
    fn custom_passes_factors_through() {
        let state = BlendState::new(One, Zero, One, Zero);
        assert_eq!(BlendMode::Custom(state).state(), Some(state));
    }

    #[test]
    fn missing_or_disabled_name_turns_blending_off() {
        assert_eq!(BlendMode::from_name(None), BlendMode::Disabled);
        assert_eq!(BlendMode::from_name(Some("disabled")), BlendMode::Disabled);
        assert_eq!(BlendMode::Disabled.state(), None);
    }

    #[test]
    fn unknown_name_falls_back_to_alpha() {
        assert_eq!(BlendMode::from_name(Some("dodge")), BlendMode::Alpha);
        assert_eq!(BlendMode::from_name(Some("overlay")), BlendMode::Overlay);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BlendMode::Multiply).unwrap();
        assert_eq!(json, "\"multiply\"");
        let mode: BlendMode = serde_json::from_str(
            r#"{"custom": {"src_rgb": "one", "dst_rgb": "one_minus_src_alpha", "src_alpha": "one", "dst_alpha": "zero"}}"#,
        )
        .unwrap();
        assert_eq!(
            mode.state(),
            Some(BlendState::new(One, OneMinusSrcAlpha, One, Zero))
        );
    }
}
