pub mod filter_bar;
pub mod models;
pub mod query;
pub mod sample;
pub mod store;
pub mod suggestion_panel;
pub mod suggestions;
pub mod task_edit;
pub mod task_list;
pub mod ui;

#[cfg(test)]
mod test_support;
