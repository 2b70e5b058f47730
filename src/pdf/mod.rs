//! PDF object helpers
//!
//! Low-level lopdf plumbing shared by the signature compositor and the
//! document reassembler: page boxes, page resources and image XObjects.

mod image;
mod page;

pub use image::{add_image_xobject, add_rgb_xobject, flate_encode};
pub use page::{append_page_content, page_box, page_ids, register_xobject, PageBox};
