//! Viewer overlay: the page box, status line, indicators and error panel

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::settings::CellSize;
use crate::theme::Base16Palette;
use crate::viewer::{IndicatorKind, Offset, Size, Viewer, ViewerStatus};

/// Where the parts of the viewer go on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerLayout {
    pub frame: Rect,
    /// Area the page is laid out in; its size is the viewer container
    pub page_area: Rect,
    pub status: Rect,
}

impl ViewerLayout {
    /// Modal inset in `area`, or all of it in fullscreen
    pub fn new(area: Rect, fullscreen: bool) -> Self {
        let frame = if fullscreen {
            area
        } else {
            let [_, middle, _] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .areas(area);
            let [_, center, _] = Layout::horizontal([
                Constraint::Length(2),
                Constraint::Min(10),
                Constraint::Length(2),
            ])
            .areas(middle);
            center
        };
        let inner = Block::default().borders(Borders::ALL).inner(frame);
        let [page_area, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        Self {
            frame,
            page_area,
            status,
        }
    }

    /// Container size in gesture units
    pub fn container(&self, cell: CellSize) -> Size {
        Size::new(
            f32::from(self.page_area.width) * cell.width,
            f32::from(self.page_area.height) * cell.height,
        )
    }

    /// Terminal cell to gesture units, relative to the page area
    pub fn to_gesture_units(&self, column: u16, row: u16, cell: CellSize) -> (f32, f32) {
        let x = f32::from(column) - f32::from(self.page_area.x);
        let y = f32::from(row) - f32::from(self.page_area.y);
        ((x + 0.5) * cell.width, (y + 0.5) * cell.height)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.page_area.contains(ratatui::layout::Position::new(column, row))
    }
}

/// Page rectangle in cells, clipped to `area`. The page is centred and then
/// shifted by the pan offset.
pub fn page_rect(area: Rect, content: Size, scale: f32, offset: Offset, cell: CellSize) -> Rect {
    let width = (content.width * scale / cell.width).round() as i32;
    let height = (content.height * scale / cell.height).round() as i32;
    let cx = i32::from(area.x) + i32::from(area.width) / 2 + (offset.x / cell.width).round() as i32;
    let cy =
        i32::from(area.y) + i32::from(area.height) / 2 + (offset.y / cell.height).round() as i32;

    let left = (cx - width / 2).max(i32::from(area.x));
    let top = (cy - height / 2).max(i32::from(area.y));
    let right = (cx - width / 2 + width).min(i32::from(area.right()));
    let bottom = (cy - height / 2 + height).min(i32::from(area.bottom()));
    if right <= left || bottom <= top {
        return Rect::new(area.x, area.y, 0, 0);
    }
    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

pub fn render(
    f: &mut Frame,
    layout: ViewerLayout,
    viewer: &Viewer,
    cell: CellSize,
    palette: &Base16Palette,
    now: Instant,
) {
    let Some(status) = viewer.status() else {
        return;
    };

    f.render_widget(Clear, layout.frame);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", status.name))
        .title_bottom(Line::from(" Esc close · f fullscreen ").right_aligned())
        .border_style(Style::default().fg(palette.base_04))
        .style(Style::default().bg(palette.base_00));
    f.render_widget(block, layout.frame);

    if let Some(error) = &status.error {
        render_error(f, layout.page_area, error, palette);
    } else if status.loading {
        render_centered(f, layout.page_area, "Loading…", palette.base_03);
    } else {
        render_page(f, layout.page_area, viewer, cell, palette);
    }

    render_status(f, layout.status, &status, viewer.is_fullscreen(), palette);
    render_indicators(f, layout.page_area, viewer, &status, palette, now);
}

fn render_centered(f: &mut Frame, area: Rect, text: &str, color: ratatui::style::Color) {
    let y = area.y + area.height / 2;
    let line = Rect::new(area.x, y, area.width, 1.min(area.height));
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color)),
        line,
    );
}

fn render_error(
    f: &mut Frame,
    area: Rect,
    error: &crate::viewer::ViewerError,
    palette: &Base16Palette,
) {
    let text = vec![
        Line::from(Span::styled(
            error.headline(),
            Style::default()
                .fg(palette.base_08)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(palette.base_05),
        )),
    ];
    let height = 3.min(area.height);
    let panel = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height) / 2,
        area.width,
        height,
    );
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        panel,
    );
}

fn render_page(f: &mut Frame, area: Rect, viewer: &Viewer, cell: CellSize, palette: &Base16Palette) {
    let Some(session) = viewer.session() else {
        return;
    };
    let Some(surface) = viewer.surface() else {
        render_centered(f, area, "Rendering…", palette.base_03);
        return;
    };

    let content = session.bounds().base_content();
    let rect = page_rect(area, content, session.scale(), session.offset(), cell);
    if rect.width == 0 || rect.height == 0 {
        return;
    }

    let page = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.base_03))
        .style(Style::default().bg(palette.base_01));
    let inner = page.inner(rect);
    f.render_widget(page, rect);

    let lines: Vec<Line> = if surface.lines.is_empty() {
        let size = surface.natural_size;
        let label = if size.is_empty() {
            "vector image".to_string()
        } else {
            format!("{} × {} px", size.width as u32, size.height as u32)
        };
        vec![Line::from(Span::styled(label, Style::default().fg(palette.base_03)))]
    } else {
        surface
            .lines
            .iter()
            .map(|l| Line::from(Span::styled(l.as_str(), Style::default().fg(palette.base_06))))
            .collect()
    };
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_status(
    f: &mut Frame,
    area: Rect,
    status: &ViewerStatus,
    fullscreen: bool,
    palette: &Base16Palette,
) {
    let mut spans = vec![
        Span::styled(
            format!(" Page {} ", status.page_label()),
            Style::default().fg(palette.base_07),
        ),
        Span::styled(
            format!(" {}% ", status.scale_percent),
            Style::default().fg(palette.base_05),
        ),
    ];
    if fullscreen {
        spans.push(Span::styled(" fullscreen ", Style::default().fg(palette.base_03)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.base_01)),
        area,
    );
}

fn render_indicators(
    f: &mut Frame,
    area: Rect,
    viewer: &Viewer,
    status: &ViewerStatus,
    palette: &Base16Palette,
    now: Instant,
) {
    let style = Style::default()
        .fg(palette.base_00)
        .bg(palette.base_0a)
        .add_modifier(Modifier::BOLD);
    let indicators = viewer.indicators();

    if indicators.is_visible(IndicatorKind::Page, now) {
        let text = format!(" {} ", status.page_label());
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let rect = Rect::new(x, area.y, width, 1.min(area.height));
        f.render_widget(Paragraph::new(text).style(style), rect);
    }
    if indicators.is_visible(IndicatorKind::Zoom, now) {
        let text = format!(" {}% ", status.scale_percent);
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.right().saturating_sub(width);
        let rect = Rect::new(x, area.y, width, 1.min(area.height));
        f.render_widget(Paragraph::new(text).style(style), rect);
    }
}
