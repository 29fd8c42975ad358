pub mod factors;
pub mod location;
pub mod table;
pub mod value;
