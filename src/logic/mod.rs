mod cardholder;
mod subkeys;
pub mod validation;

pub use cardholder::encode_cardholder_name;
pub use subkeys::{decode_availability, encode};
pub use validation::{
    validate_admin_pin, validate_nonempty_list, validate_secret, validate_text_field,
};
