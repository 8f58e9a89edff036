mod bible;
mod category;
mod content;
mod user;

pub use bible::*;
pub use category::*;
pub use content::*;
pub use user::*;
