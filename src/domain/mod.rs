mod member;
mod money;
mod transaction;

pub use member::*;
pub use money::*;
pub use transaction::*;
