pub mod file_grid;
pub mod sidebar;
pub mod viewer_modal;
