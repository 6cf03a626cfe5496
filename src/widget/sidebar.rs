use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::catalog::{Catalog, HOME_LABEL, Selection};
use crate::theme::Base16Palette;

/// One row of the sidebar tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarRow {
    Home,
    Category(usize),
    Subcategory(usize, usize),
}

impl SidebarRow {
    pub fn selection(self) -> Selection {
        match self {
            SidebarRow::Home => Selection::HOME,
            SidebarRow::Category(c) => Selection::category(c),
            SidebarRow::Subcategory(c, s) => Selection::subcategory(c, s),
        }
    }
}

pub struct Sidebar {
    rows: Vec<SidebarRow>,
    pub list_state: ListState,
}

impl Sidebar {
    pub fn new(catalog: &Catalog) -> Self {
        let mut rows = vec![SidebarRow::Home];
        for (c, category) in catalog.categories.iter().enumerate() {
            rows.push(SidebarRow::Category(c));
            rows.extend((0..category.subcategories.len()).map(|s| SidebarRow::Subcategory(c, s)));
        }
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { rows, list_state }
    }

    pub fn rows(&self) -> &[SidebarRow] {
        &self.rows
    }

    pub fn selected_row(&self) -> SidebarRow {
        self.list_state
            .selected()
            .and_then(|i| self.rows.get(i).copied())
            .unwrap_or(SidebarRow::Home)
    }

    pub fn move_selection_down(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        if i + 1 < self.rows.len() {
            self.list_state.select(Some(i + 1));
        }
    }

    pub fn move_selection_up(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    /// Move the cursor onto the row for `selection`
    pub fn sync_to(&mut self, selection: Selection) {
        if let Some(i) = self.rows.iter().position(|r| r.selection() == selection) {
            self.list_state.select(Some(i));
        }
    }

    /// Row under a click at terminal row `y`, given where the list was drawn
    pub fn row_at(&self, area: Rect, y: u16) -> Option<usize> {
        let top = area.y + 1;
        if y < top || y >= area.bottom().saturating_sub(1) {
            return None;
        }
        let index = (y - top) as usize + self.list_state.offset();
        (index < self.rows.len()).then_some(index)
    }

    pub fn select_index(&mut self, index: usize) {
        if index < self.rows.len() {
            self.list_state.select(Some(index));
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        is_focused: bool,
        palette: &Base16Palette,
        catalog: &Catalog,
        current: Selection,
    ) {
        let (text_color, border_color) = palette.get_panel_colors(is_focused);
        let (selection_bg, selection_fg) = palette.get_selection_colors(is_focused);

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let (indent, label) = match *row {
                    SidebarRow::Home => ("", HOME_LABEL),
                    SidebarRow::Category(c) => ("", catalog.categories[c].name.as_str()),
                    SidebarRow::Subcategory(c, s) => {
                        ("  ", catalog.categories[c].subcategories[s].name.as_str())
                    }
                };
                let mut style = Style::default().fg(text_color);
                if row.selection() == current {
                    style = style.add_modifier(Modifier::BOLD);
                }
                ListItem::new(Line::from(vec![
                    Span::raw(indent),
                    Span::styled(label.to_string(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Catalog ")
                    .border_style(Style::default().fg(border_color)),
            )
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg));

        f.render_stateful_widget(list, area, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn catalog() -> Catalog {
        Catalog::parse(
            r#"
categories:
  - id: a
    name: A
    subcategories:
      - { id: a1, name: A1 }
      - { id: a2, name: A2 }
  - id: b
    name: B
"#,
            Path::new("."),
        )
        .unwrap()
    }

    #[test]
    fn rows_flatten_the_tree() {
        let sidebar = Sidebar::new(&catalog());
        assert_eq!(
            sidebar.rows(),
            &[
                SidebarRow::Home,
                SidebarRow::Category(0),
                SidebarRow::Subcategory(0, 0),
                SidebarRow::Subcategory(0, 1),
                SidebarRow::Category(1),
            ]
        );
    }

    #[test]
    fn movement_stays_in_range() {
        let mut sidebar = Sidebar::new(&catalog());
        sidebar.move_selection_up();
        assert_eq!(sidebar.selected_row(), SidebarRow::Home);
        for _ in 0..10 {
            sidebar.move_selection_down();
        }
        assert_eq!(sidebar.selected_row(), SidebarRow::Category(1));

        sidebar.sync_to(Selection::subcategory(0, 1));
        assert_eq!(sidebar.selected_row(), SidebarRow::Subcategory(0, 1));
    }
}
