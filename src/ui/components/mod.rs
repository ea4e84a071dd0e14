pub mod menu;
pub mod progress_bar;
pub mod prompt_area;
pub mod root_chart;
