pub mod aggregate;
pub mod entry_form;
pub mod models;
pub mod range;
pub mod repo;
pub mod view;
