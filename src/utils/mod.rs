pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    file_extension_from_url, image_id_from_url, is_pinterest_image, to_original_url,
    to_original_url_opt,
};
