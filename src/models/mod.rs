pub mod audit;
pub mod booking;
pub mod housekeeping;
pub mod order;
pub mod payment;
pub mod room;
pub mod staff;

pub use audit::*;
pub use booking::*;
pub use housekeeping::*;
pub use order::*;
pub use payment::*;
pub use room::*;
pub use staff::*;
