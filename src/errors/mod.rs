pub mod pretty;

pub use pretty::render_parse_error;
