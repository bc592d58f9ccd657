pub mod validate;

pub use validate::validate_final_file;
