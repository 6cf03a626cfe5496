//! The shell: sidebar, breadcrumb, file grid and the viewer overlay

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::catalog::{Catalog, Selection};
use crate::event_source::{Event, EventSource, KeyCode, KeyModifiers};
use crate::settings::{CellSize, Settings};
use crate::theme::current_theme;
use crate::viewer::{Command, DocumentBackend, Platform, TouchEvent, TouchPoint, Viewer};
use crate::widget::file_grid::FileGrid;
use crate::widget::sidebar::Sidebar;
use crate::widget::viewer_modal::{self, ViewerLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusedPanel {
    Sidebar,
    Files,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Screen areas from the last draw, used for mouse hit testing
#[derive(Clone, Copy, Debug, Default)]
struct ShellAreas {
    sidebar: Rect,
    files: Rect,
    viewer: Option<ViewerLayout>,
}

pub struct App {
    catalog: Catalog,
    selection: Selection,
    sidebar: Sidebar,
    grid: FileGrid,
    pub viewer: Viewer,
    pub focused_panel: FocusedPanel,
    cell: CellSize,
    areas: ShellAreas,
    /// Touch id of the mouse drag being replayed as a finger
    touch: Option<u64>,
    next_touch_id: u64,
}

impl App {
    pub fn new(
        catalog: Catalog,
        settings: &Settings,
        backend: Arc<dyn DocumentBackend>,
        platform: Box<dyn Platform>,
    ) -> Self {
        let selection = catalog.initial_selection();
        let mut sidebar = Sidebar::new(&catalog);
        sidebar.sync_to(selection);
        let mut grid = FileGrid::new();
        grid.reset(&catalog.files(selection));

        Self {
            catalog,
            selection,
            sidebar,
            grid,
            viewer: Viewer::new(settings.viewer.clone(), backend, platform),
            focused_panel: FocusedPanel::Sidebar,
            cell: settings.cell_size,
            areas: ShellAreas::default(),
            touch: None,
            next_touch_id: 1,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn breadcrumb(&self) -> Vec<&str> {
        self.catalog.breadcrumb(self.selection)
    }

    pub fn select(&mut self, selection: Selection) {
        if self.selection == selection {
            return;
        }
        debug!("Selected {:?}", self.catalog.breadcrumb(selection));
        self.selection = selection;
        self.sidebar.sync_to(selection);
        self.grid.reset(&self.catalog.files(selection));
    }

    /// Open the file under the grid cursor in the viewer
    pub fn open_selected_file(&mut self) {
        let Some(index) = self.grid.selected() else {
            return;
        };
        let files = self.catalog.files(self.selection);
        let Some(file) = files.get(index) else {
            return;
        };
        let document = file.document();
        self.touch = None;
        self.viewer.open(document);
    }

    pub fn close_viewer(&mut self) {
        self.touch = None;
        self.viewer.close();
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Option<AppAction> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(*key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse(*mouse, now);
                None
            }
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppAction::Quit);
        }
        if key.code == KeyCode::Char('q') {
            return Some(AppAction::Quit);
        }
        if self.viewer.is_open() {
            self.handle_viewer_key(key, now);
            return None;
        }

        match self.focused_panel {
            FocusedPanel::Sidebar => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.sidebar.move_selection_down(),
                KeyCode::Char('k') | KeyCode::Up => self.sidebar.move_selection_up(),
                KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                    self.select(self.sidebar.selected_row().selection());
                    if self.grid.selected().is_some() {
                        self.focused_panel = FocusedPanel::Files;
                    }
                }
                KeyCode::Tab => self.focused_panel = FocusedPanel::Files,
                KeyCode::Char('H') | KeyCode::Home => self.select(Selection::HOME),
                _ => {}
            },
            FocusedPanel::Files => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.grid.move_selection_down(),
                KeyCode::Char('k') | KeyCode::Up => self.grid.move_selection_up(),
                KeyCode::Enter => self.open_selected_file(),
                KeyCode::Tab | KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
                    self.focused_panel = FocusedPanel::Sidebar;
                }
                KeyCode::Char('H') | KeyCode::Home => {
                    self.select(Selection::HOME);
                    self.focused_panel = FocusedPanel::Sidebar;
                }
                _ => {}
            },
        }
        None
    }

    fn handle_viewer_key(&mut self, key: KeyEvent, now: Instant) {
        let command = match key.code {
            KeyCode::Esc => {
                self.close_viewer();
                return;
            }
            KeyCode::Char('f') => {
                if let Err(e) = self.viewer.toggle_fullscreen() {
                    warn!("Fullscreen toggle failed: {e}");
                }
                return;
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => Command::PrevPage,
            KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => Command::NextPage,
            KeyCode::Home | KeyCode::Char('g') => Command::GoToPage(1),
            KeyCode::End | KeyCode::Char('G') => Command::GoToPage(usize::MAX),
            KeyCode::Char('+') | KeyCode::Char('=') => Command::ZoomIn,
            KeyCode::Char('-') => Command::ZoomOut,
            KeyCode::Char('0') => Command::ResetZoom,
            _ => return,
        };
        self.viewer.apply(command, now);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.viewer.is_open() {
            self.handle_viewer_mouse(mouse, now);
            return;
        }

        let (column, row) = (mouse.column, mouse.row);
        let in_sidebar = self.areas.sidebar.contains((column, row).into());
        let in_files = self.areas.files.contains((column, row).into());
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if in_sidebar => {
                self.focused_panel = FocusedPanel::Sidebar;
                if let Some(index) = self.sidebar.row_at(self.areas.sidebar, row) {
                    self.sidebar.select_index(index);
                    self.select(self.sidebar.selected_row().selection());
                }
            }
            MouseEventKind::Down(MouseButton::Left) if in_files => {
                self.focused_panel = FocusedPanel::Files;
                if let Some(index) = self.grid.row_at(self.areas.files, row) {
                    // Clicking the highlighted file opens it
                    if self.grid.selected() == Some(index) {
                        self.open_selected_file();
                    } else {
                        self.grid.select_index(index);
                    }
                }
            }
            MouseEventKind::ScrollDown if in_sidebar => self.sidebar.move_selection_down(),
            MouseEventKind::ScrollUp if in_sidebar => self.sidebar.move_selection_up(),
            MouseEventKind::ScrollDown if in_files => self.grid.move_selection_down(),
            MouseEventKind::ScrollUp if in_files => self.grid.move_selection_up(),
            _ => {}
        }
    }

    /// Mouse in the viewer: the left button acts as one finger, the wheel
    /// turns pages, Ctrl+wheel zooms
    fn handle_viewer_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let Some(layout) = self.areas.viewer else {
            return;
        };
        let (x, y) = layout.to_gesture_units(mouse.column, mouse.row, self.cell);
        let zoom = mouse.modifiers.contains(KeyModifiers::CONTROL);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if layout.contains(mouse.column, mouse.row) => {
                let id = self.next_touch_id;
                self.next_touch_id += 1;
                self.touch = Some(id);
                self.viewer
                    .handle_touch(&TouchEvent::start(vec![TouchPoint::new(id, x, y)], now));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(id) = self.touch {
                    self.viewer
                        .handle_touch(&TouchEvent::moved(vec![TouchPoint::new(id, x, y)], now));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(id) = self.touch.take() {
                    let lifted = TouchPoint::new(id, x, y);
                    self.viewer
                        .handle_touch(&TouchEvent::end(vec![], vec![lifted], now));
                }
            }
            MouseEventKind::ScrollUp if zoom => {
                self.viewer.apply(Command::ZoomIn, now);
            }
            MouseEventKind::ScrollDown if zoom => {
                self.viewer.apply(Command::ZoomOut, now);
            }
            MouseEventKind::ScrollUp => {
                self.viewer.apply(Command::PrevPage, now);
            }
            MouseEventKind::ScrollDown => {
                self.viewer.apply(Command::NextPage, now);
            }
            _ => {}
        }
    }

    /// Periodic work: loader responses and indicator expiry
    pub fn tick(&mut self, now: Instant) -> bool {
        self.viewer.tick(now)
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let palette = current_theme();
        let area = f.area();

        let [crumbs_area, main_area, help_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        let [sidebar_area, files_area] =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .areas(main_area);
        self.areas.sidebar = sidebar_area;
        self.areas.files = files_area;

        let mut crumbs = Vec::new();
        for (i, part) in self.breadcrumb().into_iter().enumerate() {
            if i > 0 {
                crumbs.push(Span::styled(" › ", Style::default().fg(palette.base_03)));
            }
            crumbs.push(Span::styled(part.to_string(), Style::default().fg(palette.base_05)));
        }
        if let Some(last) = crumbs.last_mut() {
            last.style = last.style.add_modifier(Modifier::BOLD).fg(palette.base_07);
        }
        f.render_widget(
            Paragraph::new(Line::from(crumbs)).style(Style::default().bg(palette.base_01)),
            crumbs_area,
        );

        self.sidebar.render(
            f,
            sidebar_area,
            self.focused_panel == FocusedPanel::Sidebar && !self.viewer.is_open(),
            palette,
            &self.catalog,
            self.selection,
        );
        let files = self.catalog.files(self.selection);
        self.grid.render(
            f,
            files_area,
            self.focused_panel == FocusedPanel::Files && !self.viewer.is_open(),
            palette,
            &files,
        );

        let help = if self.viewer.is_open() {
            "Esc close  h/l page  +/- zoom  0 reset  f fullscreen  drag to swipe or pan"
        } else {
            "j/k move  Enter open  Tab switch panel  H home  q quit"
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(palette.base_03)),
            help_area,
        );

        if self.viewer.is_open() {
            let layout = ViewerLayout::new(area, self.viewer.is_fullscreen());
            self.viewer.set_container(layout.container(self.cell));
            self.areas.viewer = Some(layout);
            viewer_modal::render(f, layout, &self.viewer, self.cell, palette, Instant::now());
        } else {
            self.areas.viewer = None;
        }
    }

    /// Lay out once without drawing so mouse hit testing works before the
    /// first frame
    pub fn layout_for(&mut self, area: Rect) {
        let [_, main_area, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        let [sidebar, files] =
            Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)])
                .areas(main_area);
        self.areas.sidebar = sidebar;
        self.areas.files = files;
        if self.viewer.is_open() {
            let layout = ViewerLayout::new(area, self.viewer.is_fullscreen());
            self.viewer.set_container(layout.container(self.cell));
            self.areas.viewer = Some(layout);
        }
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut first_render = true;
    info!("Event loop started");

    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            if app.handle_event(&event, Instant::now()) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            info!("Quit requested");
            return Ok(());
        }

        let mut needs_redraw = events_processed > 0 || first_render;
        first_render = false;

        if last_tick.elapsed() >= tick_rate || app.viewer.is_open() {
            needs_redraw |= app.tick(Instant::now());
            last_tick = Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if events_processed == 0 {
            // Wake for the next indicator hide even if no input arrives
            let mut timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);
            if let Some(deadline) = app.viewer.next_deadline() {
                timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
            }
            let _ = event_source.poll(timeout);
        }
    }
}
