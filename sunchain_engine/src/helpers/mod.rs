mod module_address;

pub use module_address::module_address;
