pub mod health;
pub use self::health::health;

pub mod redirect;
pub use self::redirect::redirect;
