use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::catalog::{FileEntry, format_file_size};
use crate::theme::Base16Palette;
use crate::viewer::DocumentKind;

/// Listing of the files under the current selection
pub struct FileGrid {
    /// On-disk size per row, read when the contents change
    sizes: Vec<Option<u64>>,
    pub list_state: ListState,
}

impl Default for FileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl FileGrid {
    pub fn new() -> Self {
        Self {
            sizes: Vec::new(),
            list_state: ListState::default(),
        }
    }

    /// New contents; the cursor goes back to the top
    pub fn reset(&mut self, files: &[&FileEntry]) {
        self.sizes = files.iter().map(|file| file.size_bytes()).collect();
        self.list_state = ListState::default();
        if !files.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected().filter(|i| *i < self.sizes.len())
    }

    pub fn move_selection_down(&mut self) {
        if let Some(i) = self.selected() {
            if i + 1 < self.sizes.len() {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    pub fn move_selection_up(&mut self) {
        if let Some(i) = self.selected() {
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn row_at(&self, area: Rect, y: u16) -> Option<usize> {
        let top = area.y + 1;
        if y < top || y >= area.bottom().saturating_sub(1) {
            return None;
        }
        let index = (y - top) as usize + self.list_state.offset();
        (index < self.sizes.len()).then_some(index)
    }

    pub fn select_index(&mut self, index: usize) {
        if index < self.sizes.len() {
            self.list_state.select(Some(index));
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        is_focused: bool,
        palette: &Base16Palette,
        files: &[&FileEntry],
    ) {
        let (text_color, border_color) = palette.get_panel_colors(is_focused);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Files ")
            .border_style(Style::default().fg(border_color));

        if files.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No files to display",
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Pick a category or subcategory to see its files",
                    Style::default().fg(palette.base_03),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block);
            f.render_widget(empty, area);
            return;
        }

        let (selection_bg, selection_fg) = palette.get_selection_colors(is_focused);
        let items: Vec<ListItem> = files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let (badge, color) = match file.kind() {
                    DocumentKind::Image => ("IMG", palette.base_0b),
                    DocumentKind::Document => ("PDF", palette.base_0d),
                };
                let size = self
                    .sizes
                    .get(i)
                    .copied()
                    .flatten()
                    .map(format_file_size)
                    .unwrap_or_else(|| "unavailable".to_string());
                ListItem::new(Line::from(vec![
                    Span::styled(format!("[{badge}] "), Style::default().fg(color)),
                    Span::styled(file.name.clone(), Style::default().fg(text_color)),
                    Span::styled(format!("  {size}"), Style::default().fg(palette.base_03)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg))
            .highlight_symbol("» ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Selection};
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::Path;

    const LISTING: &str = r#"
categories:
  - id: forms
    name: Forms
    subcategories:
      - id: all
        name: All
        files:
          - { id: a, name: Intake, url: intake.pdf }
          - { id: b, name: Consent, url: consent.pdf }
          - { id: c, name: Label, url: label.png }
"#;

    fn catalog(root: &Path) -> Catalog {
        Catalog::parse(LISTING, root).unwrap()
    }

    #[test]
    fn reset_selects_first_entry() {
        let catalog = catalog(Path::new("/srv/forms"));
        let mut grid = FileGrid::new();
        assert_eq!(grid.selected(), None);
        grid.reset(&catalog.files(Selection::category(0)));
        assert_eq!(grid.selected(), Some(0));
        grid.move_selection_down();
        grid.move_selection_down();
        grid.move_selection_down();
        assert_eq!(grid.selected(), Some(2));
        grid.reset(&[]);
        assert_eq!(grid.selected(), None);
    }

    #[test]
    fn row_hit_testing_skips_borders() {
        let catalog = catalog(Path::new("/srv/forms"));
        let files = catalog.files(Selection::category(0));
        let mut grid = FileGrid::new();
        grid.reset(&files[..2]);
        let area = Rect::new(10, 2, 30, 10);
        assert_eq!(grid.row_at(area, 2), None);
        assert_eq!(grid.row_at(area, 3), Some(0));
        assert_eq!(grid.row_at(area, 4), Some(1));
        assert_eq!(grid.row_at(area, 5), None);
    }

    #[test]
    fn sizes_are_read_once_per_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intake.pdf"), vec![0u8; 2048]).unwrap();
        let catalog = catalog(dir.path());
        let files = catalog.files(Selection::category(0));
        let mut grid = FileGrid::new();
        grid.reset(&files);

        // Redraws keep the size read at reset time
        std::fs::remove_file(dir.path().join("intake.pdf")).unwrap();
        let palette = crate::theme::current_theme();
        let mut terminal = Terminal::new(TestBackend::new(50, 6)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                grid.render(f, area, true, palette, &files);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..50).map(|x| buffer[(x, y)].symbol()).collect() };
        assert!(row(1).contains("Intake  2 KB"), "{}", row(1));
        assert!(row(2).contains("Consent  unavailable"), "{}", row(2));

        grid.reset(&files);
        terminal
            .draw(|f| {
                let area = f.area();
                grid.render(f, area, true, palette, &files);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row1: String = (0..50).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(row1.contains("Intake  unavailable"), "{row1}");
    }
}
