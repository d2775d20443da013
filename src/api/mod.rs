mod transactions;
pub mod view;

pub use transactions::router;
pub use view::*;
