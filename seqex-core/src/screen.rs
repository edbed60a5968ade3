use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gui::{Color, Point, SharedGui};

/// Something that can be drawn through a [`Gui`](crate::Gui).
pub trait Screen: fmt::Debug {
    fn show(&self);
}

/// Colours and proportions shared by the stock screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenStyle {
    pub background_color: Color,
    pub text_color: Color,
    pub font_size: u32,
    pub fixation_cross_color: Color,
    /// Bar thickness as a fraction of the window width.
    pub fixation_cross_width: f32,
    /// Bar length as a fraction of the window width.
    pub fixation_cross_length: f32,
}

impl Default for ScreenStyle {
    fn default() -> Self {
        Self {
            background_color: [128, 128, 128, 255],
            text_color: [0, 0, 0, 255],
            font_size: 48,
            fixation_cross_color: [0, 0, 0, 255],
            fixation_cross_width: 0.005,
            fixation_cross_length: 0.04,
        }
    }
}

pub struct BlankScreen {
    gui: SharedGui,
    background_color: Color,
}

impl BlankScreen {
    pub fn new(gui: SharedGui, style: &ScreenStyle) -> Self {
        Self {
            gui,
            background_color: style.background_color,
        }
    }
}

impl Screen for BlankScreen {
    fn show(&self) {
        self.gui.draw_uniform_background(self.background_color);
    }
}

impl fmt::Debug for BlankScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlankScreen")
            .field("background_color", &self.background_color)
            .finish_non_exhaustive()
    }
}

pub struct TextScreen {
    gui: SharedGui,
    text: String,
    style: ScreenStyle,
}

impl TextScreen {
    pub fn new(gui: SharedGui, text: impl Into<String>, style: ScreenStyle) -> Self {
        Self {
            gui,
            text: text.into(),
            style,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Screen for TextScreen {
    fn show(&self) {
        self.gui.draw_uniform_background(self.style.background_color);
        self.gui
            .draw_text(&self.text, self.style.font_size, self.style.text_color);
    }
}

impl fmt::Debug for TextScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextScreen")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// A cross centred in the window, drawn as one vertical and one horizontal bar.
pub struct FixationCrossScreen {
    gui: SharedGui,
    style: ScreenStyle,
}

impl FixationCrossScreen {
    pub fn new(gui: SharedGui, style: ScreenStyle) -> Self {
        Self { gui, style }
    }
}

impl Screen for FixationCrossScreen {
    fn show(&self) {
        let size = self.gui.window_size();
        let center_x = (size.width / 2) as i32;
        let center_y = (size.height / 2) as i32;

        let width = (size.width as f32 * self.style.fixation_cross_width) as u32;
        let length = (size.width as f32 * self.style.fixation_cross_length) as u32;

        self.gui.draw_uniform_background(self.style.background_color);
        self.gui.draw_rectangle(
            self.style.fixation_cross_color,
            Point::new(
                center_x - (width / 2) as i32,
                center_y - (length / 2) as i32,
            ),
            width,
            length,
        );
        self.gui.draw_rectangle(
            self.style.fixation_cross_color,
            Point::new(
                center_x - (length / 2) as i32,
                center_y - (width / 2) as i32,
            ),
            length,
            width,
        );
    }
}

impl fmt::Debug for FixationCrossScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FixationCrossScreen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::ElementSize;
    use crate::headless::{DrawCommand, HeadlessGui};
    use std::rc::Rc;

    #[test]
    fn test_text_screen_draws_background_then_text() {
        let gui = Rc::new(HeadlessGui::default());
        let style = ScreenStyle::default();
        TextScreen::new(gui.clone(), "Press space", style.clone()).show();

        assert_eq!(
            gui.draw_log(),
            vec![
                DrawCommand::Background(style.background_color),
                DrawCommand::Text {
                    text: "Press space".to_string(),
                    font_size: style.font_size,
                    color: style.text_color,
                },
            ]
        );
    }

    #[test]
    fn test_fixation_cross_is_centred() {
        let gui = Rc::new(HeadlessGui::new(ElementSize {
            width: 1024,
            height: 768,
        }));
        let style = ScreenStyle {
            fixation_cross_width: 0.015625,
            fixation_cross_length: 0.125,
            ..ScreenStyle::default()
        };
        FixationCrossScreen::new(gui.clone(), style.clone()).show();

        let log = gui.draw_log();
        assert_eq!(log.len(), 3);
        assert_eq!(
            log[1],
            DrawCommand::Rectangle {
                color: style.fixation_cross_color,
                top_left: Point::new(504, 320),
                width: 16,
                height: 128,
            }
        );
        assert_eq!(
            log[2],
            DrawCommand::Rectangle {
                color: style.fixation_cross_color,
                top_left: Point::new(448, 376),
                width: 128,
                height: 16,
            }
        );
    }
}
