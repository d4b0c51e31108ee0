pub mod linear;
pub mod recurrent;

pub use linear::LinearLayer;
pub use recurrent::RecurrentLayer;
