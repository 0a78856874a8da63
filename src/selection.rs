//! Cross-view selection
//!
//! A chart and the table next to it render the same records. Clicking a
//! point in one must light up the matching row in the other, and hovering
//! must give pointer feedback without disturbing that highlight.
//! [`SelectionCoordinator`] holds the one shared state and owns the one
//! rule for turning it into a style.
//!
//! # Matching
//!
//! - **Highlight** matches by key. The same feedback item can sit at index 3
//!   in one series and index 7 in another once a filter changes, so
//!   identity is the only stable address.
//! - **Hover** matches by position. It follows the geometry currently on
//!   screen, not business identity.
//!
//! # Precedence
//!
//! ```text
//! highlighted  >  hovered  >  default
//! ```
//!
//! An element that is both the highlight and under the pointer is styled
//! as highlighted.
//!
//! There is exactly one highlight and one hover at a time. Each coordinator
//! is an ordinary value, so two dashboards (or two tests) never share one.

use crate::classify::{palette, Color};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    Sentiment,
    PeerFeedback,
    WorkProduct,
    Prompts,
    VideoDemo,
}

impl ViewType {
    pub const ALL: [ViewType; 5] = [
        ViewType::Sentiment,
        ViewType::PeerFeedback,
        ViewType::WorkProduct,
        ViewType::Prompts,
        ViewType::VideoDemo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewType::Sentiment => "sentiment",
            ViewType::PeerFeedback => "peerFeedback",
            ViewType::WorkProduct => "workProduct",
            ViewType::Prompts => "prompts",
            ViewType::VideoDemo => "videoDemo",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], "").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| Error::UnknownView(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub key: String,
    pub view: ViewType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hover {
    pub index: usize,
    pub view: ViewType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub highlighted: Option<Highlight>,
    pub hovered: Option<Hover>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.highlighted.is_none() && self.hovered.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Default,
    Hovered,
    Highlighted,
}

/// Renderer-agnostic style of one point or row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub radius: f32,
    pub border_width: f32,
    pub border_color: Color,
    pub fill_color: Color,
}

/// Radii, borders and colors for each visual state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub radius: f32,
    pub hover_radius: f32,
    pub highlight_radius: f32,
    pub border_width: f32,
    pub hover_border_width: f32,
    pub highlight_border_width: f32,
    pub border_color: Color,
    pub hover_border_color: Color,
    pub highlight_border_color: Color,
    /// Replaces the element's own fill when highlighted; `None` keeps it
    pub highlight_fill: Option<Color>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            hover_radius: 8.0,
            highlight_radius: 10.0,
            border_width: 1.0,
            hover_border_width: 2.0,
            highlight_border_width: 3.0,
            border_color: palette::BORDER_DEFAULT,
            hover_border_color: palette::BORDER_HOVERED,
            highlight_border_color: palette::BORDER_HIGHLIGHTED,
            highlight_fill: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    state: SelectionState,
    style: StyleConfig,
}

impl SelectionCoordinator {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            state: SelectionState::default(),
            style,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn style_config(&self) -> &StyleConfig {
        &self.style
    }

    pub fn has_highlight(&self) -> bool {
        self.state.highlighted.is_some()
    }

    /// A click on an element. Elements without a key (gapped days) are
    /// ignored and leave the current highlight alone. Returns whether the
    /// highlight changed.
    pub fn report_click(&mut self, key: Option<&str>, view: ViewType) -> bool {
        let Some(key) = key else {
            return false;
        };
        let next = Highlight {
            key: key.to_string(),
            view,
        };
        if self.state.highlighted.as_ref() == Some(&next) {
            return false;
        }
        tracing::trace!(key, %view, "highlight");
        self.state.highlighted = Some(next);
        true
    }

    /// Pointer movement: `Some((index, view))` over an element, `None` on
    /// leave
    pub fn report_hover(&mut self, target: Option<(usize, ViewType)>) {
        self.state.hovered = target.map(|(index, view)| Hover { index, view });
    }

    pub fn clear_hover(&mut self) {
        self.state.hovered = None;
    }

    /// Back to nothing selected (navigation away, outside click)
    pub fn clear(&mut self) {
        self.state = SelectionState::default();
    }

    pub fn visual_state(&self, index: usize, key: Option<&str>, view: ViewType) -> VisualState {
        let highlighted = match (&self.state.highlighted, key) {
            (Some(h), Some(k)) => h.view == view && h.key == k,
            _ => false,
        };
        if highlighted {
            return VisualState::Highlighted;
        }

        let hovered = self
            .state
            .hovered
            .is_some_and(|h| h.view == view && h.index == index);
        if hovered {
            VisualState::Hovered
        } else {
            VisualState::Default
        }
    }

    /// Style for the element at `index` carrying `key` in `view`, whose own
    /// fill is `base`
    pub fn style_for(
        &self,
        index: usize,
        key: Option<&str>,
        view: ViewType,
        base: &Color,
    ) -> Style {
        let s = &self.style;
        match self.visual_state(index, key, view) {
            VisualState::Highlighted => Style {
                radius: s.highlight_radius,
                border_width: s.highlight_border_width,
                border_color: s.highlight_border_color.clone(),
                fill_color: s.highlight_fill.clone().unwrap_or_else(|| base.clone()),
            },
            VisualState::Hovered => Style {
                radius: s.hover_radius,
                border_width: s.hover_border_width,
                border_color: s.hover_border_color.clone(),
                fill_color: base.clone(),
            },
            VisualState::Default => Style {
                radius: s.radius,
                border_width: s.border_width,
                border_color: s.border_color.clone(),
                fill_color: base.clone(),
            },
        }
    }
}
