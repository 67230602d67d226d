pub mod chart;
pub mod config_form;
pub mod history_dashboard;
pub mod menu;
pub mod progress_bar;
pub mod question_card;
pub mod results_dashboard;
