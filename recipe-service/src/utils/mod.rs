pub mod email;
pub mod password;
pub mod validation;

pub use email::normalize_email;
pub use password::{hash_password, password_matches, Password};
pub use validation::{ResourceId, ValidatedJson};
