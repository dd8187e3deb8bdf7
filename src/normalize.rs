pub mod phone;
pub mod street;

pub use self::phone::update_phone_number;
pub use self::street::update_street_name;

/// Tag key whose value goes through [`update_phone_number`].
pub const PHONE_KEY: &str = "phone";
/// Tag key whose value goes through [`update_street_name`].
pub const STREET_KEY: &str = "addr:street";
