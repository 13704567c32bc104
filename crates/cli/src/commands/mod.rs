pub mod attach;
pub mod draft;
