pub mod member;
pub mod access_token;
pub mod payment;

pub use member::*;
pub use access_token::*;
pub use payment::*;
