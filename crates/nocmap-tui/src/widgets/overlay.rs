//! Centered modal frames drawn over the active screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear};

use crate::theme;

/// A `width × height` rectangle centered in `area`, shrunk to fit with a
/// two-cell margin.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

/// Clear `popup`, draw a titled rounded border, and return the inner area.
pub fn render_frame(frame: &mut Frame, popup: Rect, title: &str, border: Color) -> Rect {
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(area, 60, 20), Rect::new(20, 10, 60, 20));

        let small = Rect::new(5, 5, 30, 10);
        let popup = centered_rect(small, 60, 20);
        assert_eq!(popup.width, 26);
        assert_eq!(popup.height, 6);
        assert!(popup.x >= small.x && popup.right() <= small.right());
    }
}
