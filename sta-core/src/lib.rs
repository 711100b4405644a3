pub mod error;
pub mod reading;
pub mod season;
pub mod weather;

pub use error::DatasetError;
pub use reading::Reading;
pub use season::Season;
