pub mod tefas;
pub mod util;
